//! Generator collaborator
//!
//! Turns a prompt into response text. The pipeline treats the call as one
//! synchronous request; retries are the collaborator's concern.

use crate::config::Config;
use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Produces test code for a prompt
#[cfg_attr(test, mockall::automock)]
pub trait TestGenerator: Send + Sync {
    /// Send `prompt`, return the raw response text
    ///
    /// # Errors
    /// Returns [`GenerateError`] when the backend cannot be reached or
    /// answers with an error
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    completion: String,
}

/// JSON-over-HTTP completion backend
///
/// Posts `{"prompt": ...}` and reads `{"completion": ...}`.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpGenerator {
    /// Create generator for `endpoint`
    ///
    /// # Errors
    /// Returns [`GenerateError::NoEndpoint`] for an empty endpoint, or a
    /// request error when the client cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GenerateError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(GenerateError::NoEndpoint);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Request(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Create generator from configuration
    ///
    /// # Errors
    /// See [`HttpGenerator::new`]
    pub fn from_config(config: &Config) -> Result<Self, GenerateError> {
        Self::new(config.endpoint.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// Configured endpoint
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TestGenerator for HttpGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        tracing::debug!("POST {} ({} bytes)", self.endpoint, prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&CompletionRequest { prompt })
            .send()
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionResponse = response
            .json()
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;
        Ok(body.completion)
    }
}
