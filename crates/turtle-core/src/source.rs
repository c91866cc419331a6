use std::time::Duration;

use async_trait::async_trait;
use turtle_config::network::NetworkConfig;

use crate::error::WordListError;

/// Where the raw corpus page comes from
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Fetch the page body. One attempt, no retries.
    async fn fetch(&self) -> Result<String, WordListError>;
}

/// Fetches the corpus page over HTTP
#[derive(Clone)]
pub struct HttpCorpusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCorpusSource {
    pub fn new(config: &NetworkConfig) -> Result<Self, WordListError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.corpus_url.clone(),
        })
    }
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    async fn fetch(&self) -> Result<String, WordListError> {
        tracing::info!(url = %self.url, "Fetching word list");

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(WordListError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        tracing::debug!("Fetched {} bytes of corpus HTML", html.len());

        Ok(html)
    }
}
