//! Layered configuration: optional TOML file, then `VERDICT_*` variables.
//!
//! Nested keys use a double underscore, e.g. `VERDICT_ANALYSIS__API_KEY`
//! or `VERDICT_PIPELINE__MAX_CHARS`.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use verdict_catalog::CatalogConfig;
use verdict_llm::LlmConfig;
use verdict_pipeline::PipelineSettings;

pub const ENV_PREFIX: &str = "VERDICT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub catalog:  CatalogConfig,
  pub analysis: LlmConfig,
  pub pipeline: PipelineSettings,
}

/// Load configuration from `path` (which need not exist) and the
/// environment.
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?;

  settings
    .try_deserialize()
    .context("failed to deserialise configuration")
}
