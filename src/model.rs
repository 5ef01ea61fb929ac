// src/model.rs
//! Shared data model for the curation pipeline: raw feed candidates and the
//! durable article records the store owns once they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Language of a feed source, carried through to the summarization oracle so
/// it knows whether it is reading the article in translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLang {
    Ja,
    En,
}

impl std::fmt::Display for SourceLang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLang::Ja => write!(f, "ja"),
            SourceLang::En => write!(f, "en"),
        }
    }
}

/// A raw, not-yet-persisted item pulled from an external feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub raw_content: String,
    pub source_name: String,
    pub source_lang: SourceLang,
}

/// Insert payload for the store. The store assigns `id` and both timestamps.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub source_name: String,
    pub source_lang: SourceLang,
    pub fingerprint: Fingerprint,
    pub primary_source: Option<String>,
    pub importance_score: u8,
}

/// A curated article as the store returns it. Owned exclusively by the store
/// once persisted; the pipeline only ever mutates it through `mark_used`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub source_name: String,
    pub source_lang: SourceLang,
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub primary_source: Option<String>,
    pub importance_score: u8,
    pub used_in_digest: bool,
    // Server-assigned at insert; legacy records in pre-existing data files may
    // lack it, in which case `date` is the fallback for ordering.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl ArticleRecord {
    /// Timestamp used for window filtering and ranking tie-breaks:
    /// `created_at` when present, else `date`, else none.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.date)
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub accepted_count: usize,
    pub accepted: Vec<ArticleRecord>,
    pub feeds_checked: usize,
}
