// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;

use super::Notifier;
use crate::model::ArticleRecord;

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            client: Client::new(),
        }
    }

    /// Optional builder for tests/tools
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }

    async fn post_blocks(&self, blocks: serde_json::Value, fallback: &str) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let body = json!({ "text": fallback, "blocks": blocks });
        self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn notify_articles(&self, articles: &[ArticleRecord]) -> Result<()> {
        if articles.is_empty() {
            return Ok(());
        }

        let mut blocks = vec![
            json!({
                "type": "header",
                "text": { "type": "plain_text", "text": format!("🤖 {} curated articles", articles.len()) }
            }),
            json!({ "type": "divider" }),
        ];
        for article in articles {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*<{}|{}>*\n📍 {}\n💡 {}",
                        article.url,
                        article.title,
                        article.source_name,
                        clip(&article.summary, 100)
                    )
                }
            }));
        }

        self.post_blocks(
            serde_json::Value::Array(blocks),
            &format!("{} curated articles", articles.len()),
        )
        .await
    }

    async fn notify_digest(&self, digest: &str, article_count: usize) -> Result<()> {
        let blocks = json!([
            {
                "type": "header",
                "text": { "type": "plain_text", "text": format!("🐦 News thread ({article_count} articles)") }
            },
            { "type": "divider" },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("```{digest}```") }
            },
            {
                "type": "context",
                "elements": [
                    { "type": "mrkdwn", "text": "💡 Copy the main post + detail thread straight into your feed" }
                ]
            }
        ]);

        self.post_blocks(blocks, &format!("News thread ({article_count} articles)"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_notifier_is_a_noop() {
        let notifier = SlackNotifier {
            webhook_url: None,
            client: Client::new(),
        };
        notifier.notify_articles(&[]).await.unwrap();
        notifier.notify_digest("text", 3).await.unwrap();
    }

    #[test]
    fn clip_appends_ellipsis_only_when_needed() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 5), "abcde...");
    }
}
