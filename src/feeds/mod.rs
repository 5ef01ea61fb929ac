// src/feeds/mod.rs
//! Feed collaborator boundary: the registry of RSS sources and the fetch
//! loop that turns feed entries into `Candidate`s for the pipeline.

pub mod config;
pub mod rss;

pub use config::{load_feeds_default, load_feeds_from, FeedSpec};
pub use rss::RssFeedProvider;

use anyhow::Result;
use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::model::Candidate;

/// Newest entries considered per feed and run.
pub const MAX_ENTRIES_PER_FEED: usize = 3;

#[async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>>;
    fn name(&self) -> &str;
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_entries_total", "Entries parsed from feeds.");
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
    });
}

/// Normalize entry content: HTML entity decode, tag strip, whitespace
/// collapse. Oracles see prose, not markup.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Pull the newest entries from every registered feed. A feed that fails to
/// fetch or parse is logged and skipped; it never blocks the others.
pub async fn collect_candidates(providers: &[Box<dyn FeedProvider>]) -> Vec<Candidate> {
    ensure_metrics_described();

    let mut out = Vec::new();
    for provider in providers {
        match provider.fetch_latest().await {
            Ok(candidates) => {
                counter!("feed_entries_total").increment(candidates.len() as u64);
                info!(
                    feed = provider.name(),
                    entries = candidates.len(),
                    "feed fetched"
                );
                out.extend(candidates.into_iter().take(MAX_ENTRIES_PER_FEED));
            }
            Err(e) => {
                warn!(error = ?e, feed = provider.name(), "feed error");
                counter!("feed_errors_total").increment(1);
            }
        }
    }
    out
}

/// Build one RSS provider per registry entry.
pub fn providers_from_specs(specs: Vec<FeedSpec>) -> Vec<Box<dyn FeedProvider>> {
    specs
        .into_iter()
        .map(|spec| Box::new(RssFeedProvider::new(spec)) as Box<dyn FeedProvider>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "<p>Hello,&nbsp;&nbsp; <b>world</b></p>";
        assert_eq!(normalize_text(s), "Hello, world");
    }

    #[test]
    fn normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  a \n\n  b\t c  "), "a b c");
    }
}
