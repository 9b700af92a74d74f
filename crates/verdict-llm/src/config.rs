//! Provider configuration.

use std::time::Duration;

use serde::Deserialize;

/// One model and how many times to try it before moving on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelTier {
  pub model:    String,
  pub attempts: usize,
}

impl ModelTier {
  pub fn new(model: impl Into<String>, attempts: usize) -> Self {
    Self { model: model.into(), attempts }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
  pub api_base_url:   String,
  /// Falls back to `GROQ_API_KEY` and key files when unset.
  pub api_key:        Option<String>,
  /// Tried in order; the first successful completion wins.
  pub tiers:          Vec<ModelTier>,
  pub retry_delay_ms: u64,
  pub temperature:    f32,
  pub max_tokens:     u32,
  pub top_p:          f32,
  pub timeout_secs:   u64,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      api_base_url:   "https://api.groq.com/openai/v1".into(),
      api_key:        None,
      tiers:          vec![
        ModelTier::new("meta-llama/llama-4-scout-17b-16e-instruct", 3),
        ModelTier::new("llama-3-8b-8192", 1),
      ],
      retry_delay_ms: 2000,
      temperature:    0.3,
      max_tokens:     1500,
      top_p:          0.8,
      timeout_secs:   60,
    }
  }
}

impl LlmConfig {
  pub fn retry_delay(&self) -> Duration { Duration::from_millis(self.retry_delay_ms) }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}
