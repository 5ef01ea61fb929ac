// src/notify/mod.rs
//! Outbound chat notifications. Send failures are the caller's to absorb;
//! a missing webhook disables the notifier without error.

pub mod slack;

pub use slack::SlackNotifier;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::ArticleRecord;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Per-article notification after a collection run.
    async fn notify_articles(&self, articles: &[ArticleRecord]) -> Result<()>;

    /// The finished digest thread, ready to copy out.
    async fn notify_digest(&self, digest: &str, article_count: usize) -> Result<()>;
}

pub type DynNotifier = Arc<dyn Notifier>;
