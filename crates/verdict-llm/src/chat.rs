//! [`ChatClient`] — chat-completions implementation of [`AnalysisClient`].

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::{ProviderError, client::AnalysisClient};

use crate::{LlmConfig, TierPolicy, credentials::resolve_api_key, sanitize};

/// Longest provider error body kept in an error message.
const ERROR_BODY_LIMIT: usize = 400;

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    [ChatMessage<'a>; 2],
  temperature: f32,
  max_tokens:  u32,
  top_p:       f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

/// Async client for an OpenAI-compatible chat-completions endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ChatClient {
  client:  Client,
  config:  LlmConfig,
  api_key: Option<String>,
  policy:  TierPolicy,
}

impl ChatClient {
  /// Build a client, resolving the API key from configuration, environment
  /// or key files. A missing key is not an error until the first submission.
  pub fn new(config: LlmConfig) -> Result<Self, ProviderError> {
    let api_key = resolve_api_key(config.api_key.as_deref());
    Self::with_key(config, api_key)
  }

  /// Build a client with an explicit key, bypassing the lookup.
  pub fn with_key(config: LlmConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
    let client = Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| ProviderError::Transport(e.to_string()))?;
    let policy = TierPolicy::new(config.tiers.clone(), config.retry_delay());
    Ok(Self { client, config, api_key, policy })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.api_base_url.trim_end_matches('/'))
  }

  /// One request against one model, no retries.
  pub async fn complete_once(
    &self,
    model: &str,
    prompt: &str,
    system: &str,
  ) -> Result<String, ProviderError> {
    let key = self.api_key.as_deref().ok_or(ProviderError::MissingCredentials)?;
    let body = ChatRequest {
      model,
      messages: [
        ChatMessage { role: "system", content: system },
        ChatMessage { role: "user", content: prompt },
      ],
      temperature: self.config.temperature,
      max_tokens: self.config.max_tokens,
      top_p: self.config.top_p,
    };

    debug!(model, prompt_chars = prompt.chars().count(), "submitting completion");
    let resp = self
      .client
      .post(self.url())
      .bearer_auth(key)
      .json(&body)
      .send()
      .await
      .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      return Err(ProviderError::Http {
        status: status.as_u16(),
        body:   text.chars().take(ERROR_BODY_LIMIT).collect(),
      });
    }

    let parsed: ChatResponse = resp
      .json()
      .await
      .map_err(|e| ProviderError::Transport(e.to_string()))?;
    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();
    let cleaned = sanitize(&content);
    if cleaned.trim().is_empty() {
      return Err(ProviderError::EmptyResponse);
    }
    Ok(cleaned.trim().to_string())
  }
}

impl AnalysisClient for ChatClient {
  async fn submit<'a>(&'a self, prompt: &'a str, system: &'a str) -> Result<String, ProviderError> {
    if self.api_key.is_none() {
      return Err(ProviderError::MissingCredentials);
    }
    self
      .policy
      .run(|model| self.complete_once(model, prompt, system))
      .await
  }
}
