// src/feeds/config.rs
//! Feed registry loading. TOML, one `[[feeds]]` table per source:
//!
//! ```toml
//! [[feeds]]
//! name = "TechCrunch"
//! url = "https://techcrunch.com/feed/"
//! lang = "en"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::SourceLang;

const ENV_PATH: &str = "FEEDS_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/feeds.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
    pub lang: SourceLang,
}

/// Load the registry from an explicit path.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSpec>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed registry from {}", path.display()))?;
    parse_feeds(&content)
}

/// Load the registry using env var + fallback:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
pub fn load_feeds_default() -> Result<Vec<FeedSpec>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        }
        return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_feeds_from(&default);
    }
    Ok(Vec::new())
}

fn parse_feeds(s: &str) -> Result<Vec<FeedSpec>> {
    #[derive(Deserialize)]
    struct Registry {
        feeds: Vec<FeedSpec>,
    }
    let reg: Registry = toml::from_str(s).context("parsing feed registry toml")?;
    let feeds: Vec<FeedSpec> = reg
        .feeds
        .into_iter()
        .filter(|f| !f.name.trim().is_empty() && !f.url.trim().is_empty())
        .collect();
    Ok(feeds)
}
