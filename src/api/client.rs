use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SummaryMode;

const USER_AGENT: &str = concat!("tweet-takeaways/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Reply shape shared by both endpoints. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub scraped_text: Option<String>,
    #[serde(default)]
    pub used_huggingface: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, mode: SummaryMode) -> String {
        format!("{}/summarize{}", self.base_url, mode.path_suffix())
    }

    /// Send one summarization request. `text` is only carried on the
    /// Hugging Face endpoint.
    pub async fn summarize(
        &self,
        url: &str,
        mode: SummaryMode,
        text: Option<&str>,
    ) -> Result<SummarizeResponse> {
        let request = SummarizeRequest {
            url,
            text: match mode {
                SummaryMode::Primary => None,
                SummaryMode::Secondary => text,
            },
        };

        let endpoint = self.endpoint(mode);
        tracing::debug!("POST {} (text: {})", endpoint, request.text.is_some());

        let response = self.client.post(&endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("HTTP {}: {}", status, error_text)));
        }

        // Decode from bytes so a malformed body reports as a JSON error
        let bytes = response.bytes().await?;
        let summary: SummarizeResponse = serde_json::from_slice(&bytes)?;

        Ok(summary)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Health check failed: HTTP {}", response.status()).into());
        }

        Ok(response.json().await?)
    }
}
