use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::{OracleConfig, RetryConfig};
use crate::error::{HyperError, Result};
use crate::types::{Content, GenerateRequest, GenerateResponse, Part, Role};

use super::{Oracle, OracleFuture};

/// HTTP client for the `generateContent` endpoint.
///
/// Works against the provider directly (with an API key) or against
/// `oracle-proxy`, which holds the key itself.
#[derive(Debug, Clone)]
pub struct OracleClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    retry: RetryConfig,
}

impl OracleClient {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{base}/v1beta/models/{model}:generateContent[?key=...]`
    pub fn endpoint(&self, model: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        ))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    /// POST a request, retrying transient failures with exponential backoff.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let url = self.endpoint(model)?;
        let mut attempt = 0;
        loop {
            match self.post_once(&url, request).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        model,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "oracle call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, url: &Url, request: &GenerateRequest) -> Result<GenerateResponse> {
        let resp = self.client.post(url.clone()).json(request).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(HyperError::Http {
                status,
                message: body,
            });
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), "oracle response");
        Ok(serde_json::from_str(&body)?)
    }

    async fn ask(&self, system_instruction: &str, contents: Vec<Content>) -> Result<Option<String>> {
        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            }),
        };
        Ok(self.generate_content(&self.model, &request).await?.text())
    }
}

impl Oracle for OracleClient {
    fn complete<'a>(&'a self, system_instruction: &'a str, prompt: &'a str) -> OracleFuture<'a> {
        Box::pin(self.ask(system_instruction, vec![Content::text(Role::User, prompt)]))
    }

    fn converse<'a>(
        &'a self,
        system_instruction: &'a str,
        history: &'a [Content],
    ) -> OracleFuture<'a> {
        Box::pin(self.ask(system_instruction, history.to_vec()))
    }
}
