use crate::error::TransportError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Produces a reply for a single prompt.
///
/// Implementations hold no per-conversation state: every call is independent
/// and is attempted exactly once.
#[async_trait]
pub trait ResponseClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError>;
}

/// Body sent to the generation endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Body expected back from the generation endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    generated_text: String,
}

/// HTTP client for the `POST {"prompt"} -> {"generatedText"}` endpoint
#[derive(Clone)]
pub struct HttpResponseClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpResponseClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResponseClient for HttpResponseClient {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&GenerateRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "endpoint responded with status {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TransportError::new(format!("malformed response body: {}", e)))?;

        debug!(reply_len = body.generated_text.len(), "generation request completed");
        Ok(body.generated_text)
    }
}
