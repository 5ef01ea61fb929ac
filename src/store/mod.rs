// src/store/mod.rs
//! Article Store boundary. The pipeline only ever talks to `ArticleStore`;
//! the query engine behind it is a collaborator, not part of the core.
//!
//! Two implementations ship with the crate: an in-memory store (test double
//! and dev default) and a JSON-file-backed store for single-node persistence.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::model::{ArticleRecord, NewArticle};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {id}")]
    NotFound { id: String },

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable, queryable record of curated articles and their usage state.
///
/// `insert` assigns `id`, `created_at`, and `date`; `mark_used` is the only
/// mutation the pipeline performs after that. Fingerprint uniqueness is NOT
/// enforced here — dedup is best-effort, driven by the caller's known-set.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert(&self, article: NewArticle) -> StoreResult<ArticleRecord>;

    async fn get(&self, id: &str) -> StoreResult<Option<ArticleRecord>>;

    /// Flip `used_in_digest` to true. Errors with `NotFound` for unknown ids.
    async fn mark_used(&self, id: &str) -> StoreResult<()>;

    /// Every fingerprint currently persisted, for seeding the dedup set.
    async fn known_fingerprints(&self) -> StoreResult<HashSet<Fingerprint>>;

    /// All records with `used_in_digest == false`, in insertion order.
    async fn unused(&self) -> StoreResult<Vec<ArticleRecord>>;

    /// Records with `used_in_digest == true` and `created_at >= cutoff`.
    /// Records lacking `created_at` are excluded: history needs a timestamp
    /// it can trust.
    async fn used_since(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<ArticleRecord>>;

    /// Most recently created records first, up to `limit`.
    async fn recent(&self, limit: usize) -> StoreResult<Vec<ArticleRecord>>;
}

pub type DynArticleStore = Arc<dyn ArticleStore>;

pub(crate) fn materialize(article: NewArticle, now: DateTime<Utc>) -> ArticleRecord {
    ArticleRecord {
        id: uuid::Uuid::new_v4().to_string(),
        title: article.title,
        url: article.url,
        summary: article.summary,
        source_name: article.source_name,
        source_lang: article.source_lang,
        fingerprint: article.fingerprint,
        primary_source: article.primary_source,
        importance_score: article.importance_score,
        used_in_digest: false,
        created_at: Some(now),
        date: Some(now),
    }
}
