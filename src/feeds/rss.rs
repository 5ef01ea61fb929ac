// src/feeds/rss.rs
//! Generic RSS 2.0 provider: one instance per registry entry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{normalize_text, FeedProvider, FeedSpec};
use crate::model::Candidate;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

pub struct RssFeedProvider {
    spec: FeedSpec,
    client: reqwest::Client,
}

impl RssFeedProvider {
    pub fn new(spec: FeedSpec) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("ai-news-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { spec, client }
    }

    pub(crate) fn parse_candidates(spec: &FeedSpec, xml: &str) -> Result<Vec<Candidate>> {
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = quick_xml::de::from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", spec.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let (Some(title), Some(link)) = (it.title, it.link) else {
                continue;
            };
            let title = normalize_text(&title);
            if title.is_empty() || link.trim().is_empty() {
                continue;
            }
            out.push(Candidate {
                title,
                url: link.trim().to_string(),
                raw_content: normalize_text(it.description.as_deref().unwrap_or_default()),
                source_name: spec.name.clone(),
                source_lang: spec.lang,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        let body = self
            .client
            .get(&self.spec.url)
            .send()
            .await
            .with_context(|| format!("fetching feed {}", self.spec.name))?
            .error_for_status()
            .with_context(|| format!("feed {} non-2xx", self.spec.name))?
            .text()
            .await
            .with_context(|| format!("reading feed body for {}", self.spec.name))?;
        Self::parse_candidates(&self.spec, &body)
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
