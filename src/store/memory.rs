// src/store/memory.rs
//! In-memory article store behind a `Mutex`-guarded vector. The default for
//! tests and local development; drops everything on process exit.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{materialize, ArticleStore, StoreError, StoreResult};
use crate::fingerprint::Fingerprint;
use crate::model::{ArticleRecord, NewArticle};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Vec<ArticleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with pre-existing records, e.g. legacy rows lacking timestamps.
    pub fn with_records(records: Vec<ArticleRecord>) -> Self {
        Self {
            inner: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<ArticleRecord> {
        self.inner.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert(&self, article: NewArticle) -> StoreResult<ArticleRecord> {
        let record = materialize(article, Utc::now());
        let mut v = self.inner.lock().expect("store mutex poisoned");
        v.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<ArticleRecord>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        Ok(v.iter().find(|r| r.id == id).cloned())
    }

    async fn mark_used(&self, id: &str) -> StoreResult<()> {
        let mut v = self.inner.lock().expect("store mutex poisoned");
        match v.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.used_in_digest = true;
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    async fn known_fingerprints(&self) -> StoreResult<HashSet<Fingerprint>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        Ok(v.iter().map(|r| r.fingerprint.clone()).collect())
    }

    async fn unused(&self) -> StoreResult<Vec<ArticleRecord>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        Ok(v.iter().filter(|r| !r.used_in_digest).cloned().collect())
    }

    async fn used_since(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<ArticleRecord>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        Ok(v.iter()
            .filter(|r| r.used_in_digest)
            .filter(|r| matches!(r.created_at, Some(t) if t >= cutoff))
            .cloned()
            .collect())
    }

    async fn recent(&self, limit: usize) -> StoreResult<Vec<ArticleRecord>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        let mut out: Vec<ArticleRecord> = v.clone();
        // Newest first; records without created_at sink to the end.
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceLang;

    fn article(title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            summary: "s".into(),
            source_name: "Example".into(),
            source_lang: SourceLang::En,
            fingerprint: Fingerprint::of(&format!("https://example.com/{title}"), title),
            primary_source: None,
            importance_score: 3,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let r = store.insert(article("a")).await.unwrap();
        assert!(!r.id.is_empty());
        assert!(r.created_at.is_some());
        assert!(r.date.is_some());
        assert!(!r.used_in_digest);
    }

    #[tokio::test]
    async fn mark_used_flips_flag_and_reports_unknown_id() {
        let store = MemoryStore::new();
        let r = store.insert(article("a")).await.unwrap();

        store.mark_used(&r.id).await.unwrap();
        assert!(store.unused().await.unwrap().is_empty());

        let err = store.mark_used("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn used_since_excludes_records_without_created_at() {
        let legacy = ArticleRecord {
            id: "legacy".into(),
            title: "old".into(),
            url: "https://example.com/old".into(),
            summary: "s".into(),
            source_name: "Example".into(),
            source_lang: SourceLang::En,
            fingerprint: Fingerprint::of("https://example.com/old", "old"),
            primary_source: None,
            importance_score: 3,
            used_in_digest: true,
            created_at: None,
            date: None,
        };
        let store = MemoryStore::with_records(vec![legacy]);

        let cutoff = Utc::now() - chrono::Duration::days(7);
        assert!(store.used_since(cutoff).await.unwrap().is_empty());
    }
}
