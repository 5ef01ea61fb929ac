// src/curate/mod.rs
//! The article curation pipeline: ingestion, selection & ranking, digest
//! composition, and history grouping, behind one `Curator` facade exposing
//! exactly the operations the HTTP layer dispatches to.

pub mod digest;
pub mod history;
pub mod ingest;
pub mod select;

pub use digest::{DigestComposer, SelectionDigest};
pub use history::HistoryGrouper;
pub use ingest::IngestionOrchestrator;
pub use select::SelectionEngine;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::model::{ArticleRecord, Candidate, IngestionReport};
use crate::oracle::{
    DynPrimarySourceOracle, DynRelevanceOracle, DynSummaryOracle, DynThreadOracle,
};
use crate::store::DynArticleStore;

#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Trailing selection window for the scheduled digest.
    pub window_hours: i64,
    /// Minimum qualifying records before a scheduled digest runs.
    pub min_digest_articles: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            min_digest_articles: 3,
        }
    }
}

/// Outcome of the scheduled `summary` operation. A precondition miss is a
/// distinct non-error outcome; an oracle failure is a failure with nothing
/// marked used.
#[derive(Debug, Clone)]
pub enum SummaryOutcome {
    Created {
        digest: String,
        articles_used: usize,
    },
    Skipped {
        unused: usize,
        minimum: usize,
    },
    Failed {
        unused: usize,
    },
}

/// Outcome of an ad-hoc digest from an explicit id selection.
#[derive(Debug, Clone)]
pub enum CustomOutcome {
    /// None of the requested ids resolved — a failure, since the caller
    /// explicitly asked for them.
    NoIdsResolved,
    /// Articles resolved but the thread oracle failed.
    Failed,
    Created {
        digest: String,
        articles: Vec<ArticleRecord>,
    },
}

pub struct Curator {
    orchestrator: IngestionOrchestrator,
    selection: SelectionEngine,
    composer: DigestComposer,
    history: HistoryGrouper,
    store: DynArticleStore,
    cfg: CuratorConfig,
}

impl Curator {
    pub fn new(
        relevance: DynRelevanceOracle,
        summarizer: DynSummaryOracle,
        thread: DynThreadOracle,
        primary_source: DynPrimarySourceOracle,
        store: DynArticleStore,
        cfg: CuratorConfig,
    ) -> Self {
        Self {
            orchestrator: IngestionOrchestrator::new(
                relevance,
                summarizer,
                primary_source,
                store.clone(),
            ),
            selection: SelectionEngine::new(store.clone()),
            composer: DigestComposer::new(thread, store.clone()),
            history: HistoryGrouper::new(store.clone()),
            store,
            cfg,
        }
    }

    /// Ingest a freshly fetched batch. The dedup set is seeded once per run;
    /// a failed seed read falls back to an empty set, so the batch still
    /// runs at the risk of re-curating.
    pub async fn collect(&self, candidates: Vec<Candidate>, feeds_checked: usize) -> IngestionReport {
        let mut known = match self.store.known_fingerprints().await {
            Ok(set) => set,
            Err(e) => {
                warn!(error = %e, "fingerprint seed read failed; starting empty");
                HashSet::new()
            }
        };
        info!(
            candidates = candidates.len(),
            known = known.len(),
            "ingestion run starting"
        );
        self.orchestrator
            .ingest(candidates, &mut known, feeds_checked)
            .await
    }

    /// Scheduled digest: select inside the window, gate on the minimum,
    /// compose, and only then mark the consumed records used.
    pub async fn summary(&self) -> SummaryOutcome {
        let ranked = self.selection.select_unused(self.cfg.window_hours).await;
        if ranked.len() < self.cfg.min_digest_articles {
            info!(
                unused = ranked.len(),
                minimum = self.cfg.min_digest_articles,
                "digest skipped: not enough unused articles"
            );
            return SummaryOutcome::Skipped {
                unused: ranked.len(),
                minimum: self.cfg.min_digest_articles,
            };
        }

        match self.composer.compose(&ranked).await {
            Some(text) => {
                let ids: Vec<String> = ranked.iter().map(|r| r.id.clone()).collect();
                self.composer.mark_used(&ids).await;
                SummaryOutcome::Created {
                    digest: text,
                    articles_used: ranked.len(),
                }
            }
            None => SummaryOutcome::Failed {
                unused: ranked.len(),
            },
        }
    }

    /// Retrospective 6-hour-bucket view of used records.
    pub async fn history(&self, days: i64) -> BTreeMap<DateTime<Utc>, Vec<ArticleRecord>> {
        self.history.group(days).await
    }

    /// Ad-hoc digest from an explicit selection; no minimum applies and
    /// nothing is marked used.
    pub async fn custom(&self, ids: &[String]) -> CustomOutcome {
        match self.composer.compose_from_selection(ids).await {
            None => CustomOutcome::NoIdsResolved,
            Some(SelectionDigest {
                text: None, ..
            }) => CustomOutcome::Failed,
            Some(SelectionDigest {
                text: Some(digest),
                articles,
            }) => CustomOutcome::Created { digest, articles },
        }
    }

    /// Read-only recent listing for inspection.
    pub async fn list_recent(&self, limit: usize) -> Vec<ArticleRecord> {
        match self.store.recent(limit).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "recent query failed; empty listing");
                Vec::new()
            }
        }
    }
}
