// src/curate/digest.rs
//! Digest composition: turn a ranked list of records into one threaded
//! write-up via the thread oracle, then mark the consumed records as used.
//! Marking-used is strictly downstream of digest success.

use tracing::{debug, error, warn};

use crate::model::ArticleRecord;
use crate::oracle::parse::stars;
use crate::oracle::DynThreadOracle;
use crate::store::DynArticleStore;

/// One prompt block per record, in the order the caller ranked them.
pub fn article_block(record: &ArticleRecord) -> String {
    format!(
        "[{source}] {title}\nSummary: {summary}\nImportance: {score} ({stars})\nReference: {url}\nPrimary source: {primary}",
        source = record.source_name,
        title = record.title,
        summary = record.summary,
        score = record.importance_score,
        stars = stars(record.importance_score),
        url = record.url,
        primary = record.primary_source.as_deref().unwrap_or("none"),
    )
}

pub struct DigestComposer {
    thread_oracle: DynThreadOracle,
    store: DynArticleStore,
}

impl DigestComposer {
    pub fn new(thread_oracle: DynThreadOracle, store: DynArticleStore) -> Self {
        Self {
            thread_oracle,
            store,
        }
    }

    /// Compose the threaded digest. The records arrive already sorted; the
    /// oracle is instructed to preserve that order, not re-rank. Oracle
    /// failure yields `None` and the caller must not mark anything used.
    pub async fn compose(&self, records: &[ArticleRecord]) -> Option<String> {
        let blocks: Vec<String> = records.iter().map(article_block).collect();
        match self.thread_oracle.compose_thread(&blocks.join("\n\n")).await {
            Ok(text) => Some(text),
            Err(e) => {
                error!(error = ?e, articles = records.len(), "thread oracle failed");
                None
            }
        }
    }

    /// Flip `used_in_digest` for each id independently; one failed update is
    /// logged and does not block the rest. Returns how many succeeded.
    pub async fn mark_used(&self, ids: &[String]) -> usize {
        let mut marked = 0;
        for id in ids {
            match self.store.mark_used(id).await {
                Ok(()) => marked += 1,
                Err(e) => warn!(error = %e, id = %id, "mark_used failed"),
            }
        }
        debug!(marked, requested = ids.len(), "records marked used");
        marked
    }

    /// Ad-hoc digest from an explicit id selection: missing ids are silently
    /// skipped, the found set is sorted by importance only (no timestamp
    /// tie-break, matching history), and the 3-item minimum does not apply.
    /// Returns `None` when zero ids resolved; `Some` with `text=None` when
    /// articles resolved but the oracle failed.
    pub async fn compose_from_selection(&self, ids: &[String]) -> Option<SelectionDigest> {
        let mut found = Vec::new();
        for id in ids {
            match self.store.get(id).await {
                Ok(Some(record)) => found.push(record),
                Ok(None) => debug!(id = %id, "selected id not found; skipped"),
                Err(e) => warn!(error = %e, id = %id, "selected id fetch failed; skipped"),
            }
        }
        if found.is_empty() {
            return None;
        }

        found.sort_by(|a, b| b.importance_score.cmp(&a.importance_score));
        let text = self.compose(&found).await;
        Some(SelectionDigest {
            text,
            articles: found,
        })
    }
}

/// Outcome of `compose_from_selection`: the resolved articles always, the
/// digest text only when the oracle succeeded.
#[derive(Debug, Clone)]
pub struct SelectionDigest {
    pub text: Option<String>,
    pub articles: Vec<ArticleRecord>,
}
