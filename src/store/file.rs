// src/store/file.rs
//! JSON-file-backed article store for single-node runtime persistence.
//!
//! The whole record set lives in one JSON array. Every mutation rewrites the
//! file through a tmp-file + rename so a crash mid-write never leaves a
//! half-written store behind.

use std::collections::HashSet;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{materialize, ArticleStore, StoreError, StoreResult};
use crate::fingerprint::Fingerprint;
use crate::model::{ArticleRecord, NewArticle};

pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Vec<ArticleRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing records. A missing file
    /// starts empty; an unreadable one is an error so data is never silently
    /// clobbered.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let records = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            inner: Mutex::new(records),
        })
    }

    fn persist(&self, records: &[ArticleRecord]) -> StoreResult<()> {
        write_atomic(&self.path, records)
    }
}

fn write_atomic(path: &Path, records: &[ArticleRecord]) -> StoreResult<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(records)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

#[async_trait]
impl ArticleStore for JsonFileStore {
    async fn insert(&self, article: NewArticle) -> StoreResult<ArticleRecord> {
        let record = materialize(article, Utc::now());
        let mut v = self.inner.lock().expect("store mutex poisoned");
        v.push(record.clone());
        if let Err(e) = self.persist(&v) {
            // Roll back the in-memory copy so memory and disk stay in step.
            v.pop();
            return Err(e);
        }
        Ok(record)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<ArticleRecord>> {
        let v = self.inner.lock().expect("store mutex poisoned");
        Ok(v.iter().find(|r| r.id == id).cloned())
    }

    async fn mark_used(&self, id: &str) -> StoreResult<()> {
        let mut v = self.inner.lock().expect("store mutex poisoned");
        let Some(r) = v.iter_mut().find(|r| r.id == id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        let before = r.used_in_digest;
        r.used_in_digest = true;
        if let Err(e) = self.persist(&v) {
            if let Some(r) = v.iter_mut().find(|r| r.id == id) {
                r.used_in_digest = before;
            }
            warn!(error = %e, id, "mark_used persist failed");
            return Err(e);
        }
        Ok(())
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
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit);
        Ok(out)
    }
}
