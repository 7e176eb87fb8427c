//! Completion API client.
//!
//! [`CompletionClient`] turns a system/user prompt pair into report text:
//! it builds the payload and headers from configuration, hands the request
//! to a [`Transport`], then extracts and cleans the answer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::normalize::normalize_to_text;
use super::path::{candidate_paths, extract_first_available};
use super::payload::{build_default_payload, replace_placeholders, Sampling};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::ThinkFilter;

/// Maximum number of body characters quoted in a non-JSON error.
const SNIPPET_LEN: usize = 500;

/// A fully prepared POST request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Endpoint URL.
    pub url: String,
    /// Headers in insertion order; later entries replace earlier ones.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Value,
    /// Request timeout.
    pub timeout: Duration,
}

/// Delivers an [`ApiRequest`] and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for non-success statuses and
    /// [`Error::ApiRequest`] when the request cannot be delivered.
    async fn send(&self, request: &ApiRequest) -> Result<String>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<String> {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(request.timeout)
            .body(serde_json::to_vec(&request.body)?);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::api_request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::api_request(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                detail: body,
            });
        }
        Ok(body)
    }
}

/// Client settings, resolved from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Endpoint URL.
    pub url: String,
    /// API key, if any.
    pub key: Option<String>,
    /// Model name; empty when unset.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Configured response paths (fallbacks are added later).
    pub response_paths: Vec<String>,
    /// Header carrying the key.
    pub auth_header: String,
    /// Scheme placed before the key; empty sends the raw key.
    pub auth_scheme: String,
    /// Additional headers.
    pub extra_headers: Vec<(String, String)>,
    /// Request template, replacing the default payload.
    pub request_template: Option<Value>,
    /// Remove reasoning output from answers.
    pub strip_think: bool,
    /// Sampling for the default payload.
    pub sampling: Sampling,
}

impl ClientSettings {
    /// Resolve settings from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] without an API URL and
    /// [`Error::Template`] if the template or extra headers are not valid
    /// JSON objects.
    pub fn from_config(config: &Config) -> Result<Self> {
        let request_template = config
            .api
            .request_template_json
            .as_deref()
            .map(|json| {
                serde_json::from_str::<Value>(json)
                    .map_err(|e| Error::template("REPORT_API_REQUEST_TEMPLATE_JSON", e.to_string()))
            })
            .transpose()?;

        let extra_headers = match config.api.extra_headers_json.as_deref() {
            Some(json) => parse_headers(json)?,
            None => Vec::new(),
        };

        Ok(Self {
            url: config.api_url()?.to_string(),
            key: config.api.key.clone(),
            model: config.api.model.clone().unwrap_or_default(),
            timeout: config.timeout(),
            response_paths: config.response_paths(),
            auth_header: config.api.auth_header.clone(),
            auth_scheme: config.api.auth_scheme.trim().to_string(),
            extra_headers,
            request_template,
            strip_think: config.generation.strip_think,
            sampling: Sampling {
                temperature: config.generation.temperature,
                top_p: config.generation.top_p,
            },
        })
    }
}

fn parse_headers(json: &str) -> Result<Vec<(String, String)>> {
    const NAME: &str = "REPORT_API_EXTRA_HEADERS_JSON";
    let value: Value = serde_json::from_str(json).map_err(|e| Error::template(NAME, e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(Error::template(NAME, "expected a JSON object"));
    };
    Ok(map
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}

/// Sends prompts to the completion API and returns cleaned report text.
#[derive(Debug)]
pub struct CompletionClient<T: Transport> {
    settings: ClientSettings,
    transport: T,
    think: ThinkFilter,
}

impl CompletionClient<HttpTransport> {
    /// Create a client using the HTTP transport.
    ///
    /// # Errors
    ///
    /// See [`ClientSettings::from_config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(ClientSettings::from_config(config)?, HttpTransport::new()))
    }
}

impl<T: Transport> CompletionClient<T> {
    /// Create a client with an explicit transport.
    #[must_use]
    pub fn new(settings: ClientSettings, transport: T) -> Self {
        Self {
            settings,
            transport,
            think: ThinkFilter::new(),
        }
    }

    /// Client settings.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for a prompt pair without sending it.
    #[must_use]
    pub fn build_request(&self, user_prompt: &str, system_prompt: &str) -> ApiRequest {
        let s = &self.settings;

        let body = match &s.request_template {
            Some(template) => {
                let mapping = HashMap::from([
                    ("model", s.model.as_str()),
                    ("system_prompt", system_prompt),
                    ("user_prompt", user_prompt),
                ]);
                replace_placeholders(template, &mapping)
            }
            None => build_default_payload(&s.model, system_prompt, user_prompt, s.sampling),
        };

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(key) = s.key.as_deref() {
            let token = if s.auth_scheme.is_empty() {
                key.to_string()
            } else {
                format!("{} {key}", s.auth_scheme)
            };
            set_header(&mut headers, &s.auth_header, token);
        }
        for (name, value) in &s.extra_headers {
            set_header(&mut headers, name, value.clone());
        }

        ApiRequest {
            url: s.url.clone(),
            headers,
            body,
            timeout: s.timeout,
        }
    }

    /// Send a prompt pair and return the cleaned answer.
    ///
    /// # Errors
    ///
    /// Returns transport errors, [`Error::ApiNonJson`] for non-JSON bodies,
    /// [`Error::ResponseExtract`] when no response path resolves, and
    /// [`Error::EmptyOutput`] when nothing is left after cleaning.
    pub async fn complete(&self, user_prompt: &str, system_prompt: &str) -> Result<String> {
        let request = self.build_request(user_prompt, system_prompt);
        info!(url = %request.url, "Requesting report from completion API");
        debug!(timeout = ?request.timeout, headers = request.headers.len(), "Request prepared");

        let raw = self.transport.send(&request).await?;
        let response: Value = serde_json::from_str(&raw).map_err(|_| Error::ApiNonJson {
            snippet: raw.chars().take(SNIPPET_LEN).collect(),
        })?;

        let paths = candidate_paths(&self.settings.response_paths);
        let found = extract_first_available(&response, &paths)?;
        let mut text = normalize_to_text(found, self.settings.strip_think);
        if self.settings.strip_think {
            text = self.think.strip(&text);
        }

        if text.is_empty() {
            return Err(Error::EmptyOutput);
        }
        debug!(chars = text.len(), "Received report text");
        Ok(text)
    }
}

/// Insert or replace a header, matching names case-insensitively.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(slot) => slot.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}
