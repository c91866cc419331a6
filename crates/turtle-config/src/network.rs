use std::env;

use serde::{Deserialize, Serialize};

fn default_corpus_url() -> String {
    "https://www.fiveforks.com/wordle".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_game_host() -> String {
    "nytimes.com".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    100
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// Page listing every previous answer
    #[serde(default = "default_corpus_url")]
    pub corpus_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Pages whose URL does not contain this are not game pages
    #[serde(default = "default_game_host")]
    pub game_host: String,
    /// Wait between re-establishing the page receiver and retrying a directive
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            corpus_url: default_corpus_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            game_host: default_game_host(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        let corpus_url = env::var("CORPUS_URL").unwrap_or(defaults.corpus_url);

        let timeout_seconds = env::var("FETCH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_seconds);

        let game_host = env::var("GAME_HOST").unwrap_or(defaults.game_host);

        Self {
            corpus_url,
            timeout_seconds,
            game_host,
            ..defaults
        }
    }

    pub fn is_game_page(&self, url: &str) -> bool {
        url.contains(&self.game_host)
    }
}
