// src/config.rs
//! Environment-driven app configuration. `.env` is loaded by `main` before
//! this runs; invalid numeric values fall back to defaults with a warning.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::curate::CuratorConfig;

pub const ENV_WINDOW_HOURS: &str = "DIGEST_WINDOW_HOURS";
pub const ENV_MIN_ARTICLES: &str = "DIGEST_MIN_ARTICLES";
pub const ENV_STORE_PATH: &str = "ARTICLE_STORE_PATH";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_WINDOW_HOURS: i64 = 24;
pub const DEFAULT_MIN_ARTICLES: usize = 3;
pub const DEFAULT_STORE_PATH: &str = "data/articles.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_hours: i64,
    pub min_digest_articles: usize,
    pub store_path: PathBuf,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            window_hours: env_parse(ENV_WINDOW_HOURS, DEFAULT_WINDOW_HOURS),
            min_digest_articles: env_parse(ENV_MIN_ARTICLES, DEFAULT_MIN_ARTICLES),
            store_path: std::env::var(ENV_STORE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
            port: env_parse(ENV_PORT, DEFAULT_PORT),
        }
    }

    pub fn curator(&self) -> CuratorConfig {
        CuratorConfig {
            window_hours: self.window_hours,
            min_digest_articles: self.min_digest_articles,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            min_digest_articles: DEFAULT_MIN_ARTICLES,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            port: DEFAULT_PORT,
        }
    }
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(var = name, value = %raw, "invalid value; using default");
                default
            }
        },
        Err(_) => default,
    }
}
