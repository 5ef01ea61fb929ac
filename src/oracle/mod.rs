// src/oracle/mod.rs
//! Text-oracle boundary: classification, summarization, thread composition,
//! and primary-source extraction. One OpenAI-backed client implements all
//! four; a deterministic mock stands in for tests and local runs.
//!
//! Error policy is the caller's: every absorbing fallback (fail-closed
//! relevance, synthesized failure summary, absent primary source, null
//! digest) lives in the pipeline, so implementations here just propagate.

pub mod openai;
pub mod parse;

pub use openai::OpenAiOracle;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::model::SourceLang;

/// Structured output of the summarization oracle after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub summary: String,
    pub importance: u8,
}

/// Classifies whether an item is on-topic news.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    async fn classify(&self, title: &str, content: &str) -> Result<bool>;
}

/// Produces a short summary and a 1-5 importance score.
#[async_trait]
pub trait SummaryOracle: Send + Sync {
    async fn summarize(
        &self,
        title: &str,
        content: &str,
        lang: SourceLang,
    ) -> Result<ArticleSummary>;
}

/// Composes the threaded digest text from pre-built per-article blocks.
#[async_trait]
pub trait ThreadOracle: Send + Sync {
    async fn compose_thread(&self, items: &str) -> Result<String>;
}

/// Extracts an authoritative follow-up link, or none.
#[async_trait]
pub trait PrimarySourceOracle: Send + Sync {
    async fn extract(&self, title: &str, content: &str) -> Result<Option<String>>;
}

pub type DynRelevanceOracle = Arc<dyn RelevanceOracle>;
pub type DynSummaryOracle = Arc<dyn SummaryOracle>;
pub type DynThreadOracle = Arc<dyn ThreadOracle>;
pub type DynPrimarySourceOracle = Arc<dyn PrimarySourceOracle>;

/// Deterministic oracle for tests and local runs without an API key.
///
/// Behavior is scripted per title; everything not scripted gets a fixed
/// positive default. Call counters let tests assert how often the expensive
/// external calls would have happened.
#[derive(Default)]
pub struct MockOracle {
    irrelevant_titles: HashSet<String>,
    failing_summary_titles: HashSet<String>,
    summaries: HashMap<String, ArticleSummary>,
    primary_source: Option<String>,
    thread_fails: bool,
    thread_calls: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// `classify` answers false for this title.
    pub fn with_irrelevant_title(mut self, title: &str) -> Self {
        self.irrelevant_titles.insert(title.to_string());
        self
    }

    /// `summarize` errors for this title.
    pub fn with_failing_summary(mut self, title: &str) -> Self {
        self.failing_summary_titles.insert(title.to_string());
        self
    }

    pub fn with_summary(mut self, title: &str, summary: &str, importance: u8) -> Self {
        self.summaries.insert(
            title.to_string(),
            ArticleSummary {
                summary: summary.to_string(),
                importance,
            },
        );
        self
    }

    pub fn with_primary_source(mut self, url: &str) -> Self {
        self.primary_source = Some(url.to_string());
        self
    }

    /// `compose_thread` errors on every call.
    pub fn with_failing_thread(mut self) -> Self {
        self.thread_fails = true;
        self
    }

    pub fn thread_calls(&self) -> usize {
        self.thread_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceOracle for MockOracle {
    async fn classify(&self, title: &str, _content: &str) -> Result<bool> {
        Ok(!self.irrelevant_titles.contains(title))
    }
}

#[async_trait]
impl SummaryOracle for MockOracle {
    async fn summarize(
        &self,
        title: &str,
        _content: &str,
        _lang: SourceLang,
    ) -> Result<ArticleSummary> {
        if self.failing_summary_titles.contains(title) {
            return Err(anyhow!("mock summarization failure"));
        }
        Ok(self.summaries.get(title).cloned().unwrap_or(ArticleSummary {
            summary: format!("Mock summary of {title}"),
            importance: 3,
        }))
    }
}

#[async_trait]
impl ThreadOracle for MockOracle {
    async fn compose_thread(&self, items: &str) -> Result<String> {
        self.thread_calls.fetch_add(1, Ordering::SeqCst);
        if self.thread_fails {
            return Err(anyhow!("mock thread failure"));
        }
        Ok(format!("Mock thread over:\n{items}"))
    }
}

#[async_trait]
impl PrimarySourceOracle for MockOracle {
    async fn extract(&self, _title: &str, _content: &str) -> Result<Option<String>> {
        Ok(self.primary_source.clone())
    }
}
