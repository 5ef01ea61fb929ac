// src/oracle/openai.rs
//! OpenAI Chat Completions client implementing all four oracle contracts.
//! Requires `OPENAI_API_KEY`; without it every call errors and the pipeline's
//! fail-closed defaults take over.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::parse::parse_summary_response;
use super::{
    ArticleSummary, PrimarySourceOracle, RelevanceOracle, SummaryOracle, ThreadOracle,
};
use crate::model::SourceLang;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const RELEVANCE_SYSTEM_PROMPT: &str = "\
You are a classifier for current AI, machine learning, and technology news. \
Decide whether the article is a piece of *recent news* about AI, machine \
learning, LLMs, robotics, automation, data science, or MLOps.\n\
Include: product launches, company announcements, technical breakthroughs, \
acquisitions and partnerships, regulation and policy, research results.\n\
Exclude: glossary entries, how-to articles, tutorials, explainers of basic \
concepts, retrospectives.\n\
Answer with \"YES\" or \"NO\" only.";

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a summarization and rating specialist for AI and technology news.\n\
{lang_note}Do the following:\n\
1. Summarize the article clearly in 3-5 sentences.\n\
2. Rate its importance for AI practitioners and newcomers on a 1-5 scale.\n\
Importance rubric:\n\
5: industry-changing breakthrough or major announcement from a large player\n\
4: notable new technology or significant company move\n\
3: interesting development, moderate impact\n\
2: small update, limited impact\n\
1: minor news, reference only\n\
Output format:\n\
Summary: [summary text]\n\
Importance: [number 1-5]";

const PRIMARY_SOURCE_SYSTEM_PROMPT: &str = "\
Extract the primary-source link from the article, by priority:\n\
1. Official announcements and press releases\n\
2. Company sites and blogs\n\
3. GitHub and technical documentation\n\
4. Official social-media posts\n\
5. Research papers and academic sites\n\
Exclude aggregator and news-site links. If nothing qualifies, answer \
\"none\".";

const THREAD_SYSTEM_PROMPT: &str = "\
You are an AI news curation specialist. Turn the articles below into a \
social-media thread with two parts. Keep the articles in the order given; \
they are already ranked by importance.\n\
Main post:\n\
- a catchy, professional one-or-two-line introduction\n\
- a numbered list of the items in the given order, concise headlines only\n\
- a closing line stating how many stories the thread covers\n\
Detail thread, one post per item:\n\
- number, headline, and the importance rendered as stars (e.g. ★★★★☆)\n\
- a two-or-three-sentence explanation a newcomer can follow\n\
- the reference URL, verbatim\n\
- the primary-source link, verbatim, when one is listed\n\
Each detail post must stand alone, and every reference URL must appear.";

pub struct OpenAiOracle {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    /// `model_override`: pass Some("gpt-4o") to override; defaults to gpt-4o-mini.
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    /// Reads `OPENAI_API_KEY` and `OPENAI_MODEL`. An empty key is allowed;
    /// calls will then error and the pipeline falls back fail-closed.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let model = std::env::var("OPENAI_MODEL").ok();
        Self::new(api_key, model.as_deref())
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?
            .error_for_status()
            .context("openai non-2xx")?;

        let body: Resp = resp.json().await.context("openai response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            bail!("openai returned no content");
        }
        Ok(content)
    }
}

#[async_trait]
impl RelevanceOracle for OpenAiOracle {
    async fn classify(&self, title: &str, content: &str) -> Result<bool> {
        let user = format!("Title: {title}\n\nContent: {content}");
        let answer = self
            .chat(RELEVANCE_SYSTEM_PROMPT, &user, 10, 0.1)
            .await?;
        // Only an explicit positive counts; anything else is "not relevant".
        Ok(answer.trim().to_ascii_uppercase() == "YES")
    }
}

#[async_trait]
impl SummaryOracle for OpenAiOracle {
    async fn summarize(
        &self,
        title: &str,
        content: &str,
        lang: SourceLang,
    ) -> Result<ArticleSummary> {
        let lang_note = match lang {
            SourceLang::Ja => "The article is written in Japanese. ",
            SourceLang::En => "",
        };
        let system = SUMMARY_SYSTEM_PROMPT.replace("{lang_note}", lang_note);
        let user = format!("Article title: {title}\n\nArticle content: {content}");
        let raw = self.chat(&system, &user, 500, 0.3).await?;
        Ok(parse_summary_response(&raw))
    }
}

#[async_trait]
impl PrimarySourceOracle for OpenAiOracle {
    async fn extract(&self, title: &str, content: &str) -> Result<Option<String>> {
        let user = format!("Title: {title}\n\nArticle content: {content}");
        let answer = self
            .chat(PRIMARY_SOURCE_SYSTEM_PROMPT, &user, 200, 0.1)
            .await?;
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            Ok(Some(answer.to_string()))
        }
    }
}

#[async_trait]
impl ThreadOracle for OpenAiOracle {
    async fn compose_thread(&self, items: &str) -> Result<String> {
        let user = format!("Create the thread from these articles:\n\n{items}");
        self.chat(THREAD_SYSTEM_PROMPT, &user, 2500, 0.4).await
    }
}
