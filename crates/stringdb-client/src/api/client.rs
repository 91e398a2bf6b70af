//! HTTP client for the STRING web service
//!
//! One `reqwest::Client` is built per `ApiClient` with the session timeout and
//! User-Agent. Requests are form-encoded POSTs (or plain GETs) and are retried
//! a fixed number of times on connect/timeout errors and on 429/5xx answers.

use crate::api::{endpoints, tsv::TsvTable};
use crate::config::Config;
use crate::error::{ClientError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Pause before the first retry; later retries wait proportionally longer.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Form body for a POST request. Later inserts overwrite earlier ones.
pub type Form = BTreeMap<&'static str, String>;

/// API client bound to one STRING release address
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    discovery_url: String,
    caller_identity: String,
    retries: u32,
    retry_backoff: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.caller_identity.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            discovery_url: config.discovery_url.trim_end_matches('/').to_string(),
            caller_identity: config.caller_identity.clone(),
            retries: config.retries,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        })
    }

    /// Same client pointed at another release address
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    pub fn caller_identity(&self) -> &str {
        &self.caller_identity
    }

    /// GET a JSON document from an absolute URL
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(url, |c| c.get(url)).await?;
        Ok(response.json().await?)
    }

    /// GET a streaming response from an absolute URL (bulk downloads)
    pub async fn get_stream(&self, url: &str) -> Result<Response> {
        self.send(url, |c| c.get(url)).await
    }

    /// POST a form to `/api/json/<method>`
    pub async fn post_json<T: DeserializeOwned>(&self, method: &str, form: &Form) -> Result<T> {
        let url = endpoints::json_url(&self.base_url, method);
        let response = self.send(&url, |c| c.post(&url).form(form)).await?;
        Ok(response.json().await?)
    }

    /// POST a form to `/api/tsv/<method>` and parse the table
    pub async fn post_tsv(&self, method: &str, form: &Form) -> Result<TsvTable> {
        let url = endpoints::tsv_url(&self.base_url, method);
        let text = self.post_text_to(&url, form).await?;
        TsvTable::parse(&text)
    }

    /// POST a form to an absolute URL and return the body as text
    pub async fn post_text_to(&self, url: &str, form: &Form) -> Result<String> {
        let response = self.send(url, |c| c.post(url).form(form)).await?;
        Ok(response.text().await?)
    }

    /// POST a form to an absolute URL and return the raw body
    pub async fn post_bytes_to(&self, url: &str, form: &Form) -> Result<Vec<u8>> {
        let response = self.send(url, |c| c.post(url).form(form)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(url, attempt, "Sending request");

            match build(&self.client).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if is_retryable(response.status()) && attempt <= self.retries => {
                    warn!(url, attempt, status = %response.status(), "Request failed, retrying");
                },
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(ClientError::Api {
                        status,
                        url: url.to_string(),
                        body: truncate(&body, 200),
                    });
                },
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt <= self.retries => {
                    warn!(url, attempt, error = %e, "Request failed, retrying");
                },
                Err(e) => return Err(e.into()),
            }

            tokio::time::sleep(self.retry_backoff * attempt).await;
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
