//! External research provider seam.
//!
//! The concrete provider service is a collaborator, not part of this system:
//! we consume a "query in, free text out" contract. `HttpResearchProvider`
//! binds that contract to an OpenAI-compatible chat-completions endpoint,
//! which is what the search-augmented providers in this space expose.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::query::ModelTier;

/// One provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub query: String,
    pub system_prompt: Option<String>,
    pub model: ModelTier,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// A research/search provider accepting a query, an optional system prompt
/// and a model selector, returning free-text results.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    async fn research(&self, request: ProviderRequest) -> Result<String, ProviderError>;
}

/// HTTP binding for the provider contract.
pub struct HttpResearchProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    standard_model: String,
    deep_model: String,
}

impl HttpResearchProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        standard_model: impl Into<String>,
        deep_model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            standard_model: standard_model.into(),
            deep_model: deep_model.into(),
        }
    }

    fn model_name(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Deep => &self.deep_model,
        }
    }
}

#[async_trait]
impl ResearchProvider for HttpResearchProvider {
    async fn research(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.query }));

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model_name(request.model),
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ProviderError::Malformed("missing choices[0].message.content".to_string())
            })
    }
}
