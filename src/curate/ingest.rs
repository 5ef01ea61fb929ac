// src/curate/ingest.rs
//! Ingestion orchestration: fingerprint dedup, the three oracle calls in
//! sequence, and persistence. Strictly sequential per candidate so external
//! call volume stays predictable; no failure of a single candidate may block
//! its siblings.

use std::collections::HashSet;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::fingerprint::Fingerprint;
use crate::model::{Candidate, IngestionReport, NewArticle};
use crate::oracle::parse::DEFAULT_IMPORTANCE;
use crate::oracle::{
    ArticleSummary, DynPrimarySourceOracle, DynRelevanceOracle, DynSummaryOracle,
};
use crate::store::DynArticleStore;

/// Content clipped before each oracle call, keeping judgments bounded and
/// cheap. Char counts, so multibyte content never splits mid-character.
pub const RELEVANCE_CONTENT_CHARS: usize = 1500;
pub const SUMMARY_CONTENT_CHARS: usize = 3000;
pub const PRIMARY_SOURCE_CONTENT_CHARS: usize = 2000;

/// Visible stand-in summary when the summarization call itself fails.
pub const FAILURE_SUMMARY: &str = "Summary generation failed.";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("curate_candidates_total", "Candidates handed to ingestion.");
        describe_counter!(
            "curate_duplicates_total",
            "Candidates skipped by fingerprint dedup."
        );
        describe_counter!(
            "curate_irrelevant_total",
            "Candidates rejected by the relevance oracle."
        );
        describe_counter!("curate_accepted_total", "Articles persisted to the store.");
        describe_counter!(
            "curate_oracle_errors_total",
            "Oracle calls that errored and were absorbed."
        );
        describe_counter!(
            "curate_store_errors_total",
            "Store writes that failed during ingestion."
        );
    });
}

fn clip_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

pub struct IngestionOrchestrator {
    relevance: DynRelevanceOracle,
    summarizer: DynSummaryOracle,
    primary_source: DynPrimarySourceOracle,
    store: DynArticleStore,
}

impl IngestionOrchestrator {
    pub fn new(
        relevance: DynRelevanceOracle,
        summarizer: DynSummaryOracle,
        primary_source: DynPrimarySourceOracle,
        store: DynArticleStore,
    ) -> Self {
        Self {
            relevance,
            summarizer,
            primary_source,
            store,
        }
    }

    /// Process one batch in input order. `known` is seeded once per run from
    /// the store; fingerprints of freshly persisted records are added so
    /// later candidates in the same batch cannot duplicate them.
    pub async fn ingest(
        &self,
        candidates: Vec<Candidate>,
        known: &mut HashSet<Fingerprint>,
        feeds_checked: usize,
    ) -> IngestionReport {
        ensure_metrics_described();

        let mut accepted = Vec::new();

        for candidate in candidates {
            counter!("curate_candidates_total").increment(1);

            let fingerprint = Fingerprint::of(&candidate.url, &candidate.title);
            if known.contains(&fingerprint) {
                debug!(title = %candidate.title, "duplicate candidate skipped");
                counter!("curate_duplicates_total").increment(1);
                continue;
            }

            // Fail-closed: any oracle error or ambiguous answer means "not
            // relevant"; the candidate is dropped without a store write.
            let relevant = match self
                .relevance
                .classify(
                    &candidate.title,
                    &clip_chars(&candidate.raw_content, RELEVANCE_CONTENT_CHARS),
                )
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = ?e, title = %candidate.title, "relevance oracle error");
                    counter!("curate_oracle_errors_total").increment(1);
                    false
                }
            };
            if !relevant {
                info!(title = %candidate.title, "off-topic candidate skipped");
                counter!("curate_irrelevant_total").increment(1);
                continue;
            }

            let ArticleSummary {
                summary,
                importance,
            } = match self
                .summarizer
                .summarize(
                    &candidate.title,
                    &clip_chars(&candidate.raw_content, SUMMARY_CONTENT_CHARS),
                    candidate.source_lang,
                )
                .await
            {
                Ok(s) => s,
                Err(e) => {
                    error!(error = ?e, title = %candidate.title, "summarization failed");
                    counter!("curate_oracle_errors_total").increment(1);
                    ArticleSummary {
                        summary: FAILURE_SUMMARY.to_string(),
                        importance: DEFAULT_IMPORTANCE,
                    }
                }
            };

            let primary_source = match self
                .primary_source
                .extract(
                    &candidate.title,
                    &clip_chars(&candidate.raw_content, PRIMARY_SOURCE_CONTENT_CHARS),
                )
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = ?e, title = %candidate.title, "primary source extraction failed");
                    counter!("curate_oracle_errors_total").increment(1);
                    None
                }
            };

            let article = NewArticle {
                title: candidate.title.clone(),
                url: candidate.url.clone(),
                summary,
                source_name: candidate.source_name.clone(),
                source_lang: candidate.source_lang,
                fingerprint: fingerprint.clone(),
                primary_source,
                importance_score: importance.clamp(1, 5),
            };

            match self.store.insert(article).await {
                Ok(record) => {
                    info!(title = %record.title, source = %record.source_name, "article curated");
                    counter!("curate_accepted_total").increment(1);
                    known.insert(fingerprint);
                    accepted.push(record);
                }
                Err(e) => {
                    // One store failure is not fatal to the batch.
                    error!(error = %e, title = %candidate.title, "store insert failed");
                    counter!("curate_store_errors_total").increment(1);
                }
            }
        }

        IngestionReport {
            accepted_count: accepted.len(),
            accepted,
            feeds_checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_chars_is_char_boundary_safe() {
        let s = "あいうえお";
        assert_eq!(clip_chars(s, 3), "あいう");
        assert_eq!(clip_chars(s, 10), s);
        assert_eq!(clip_chars("", 5), "");
    }
}
