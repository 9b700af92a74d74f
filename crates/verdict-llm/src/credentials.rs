//! API key lookup.
//!
//! Order: explicit configuration, then the `GROQ_API_KEY` environment
//! variable, then the first non-empty key file.

use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Key files checked when neither configuration nor environment has a key.
pub fn default_key_files() -> Vec<PathBuf> {
  let mut files = Vec::with_capacity(3);
  if let Ok(home) = std::env::var("HOME") {
    files.push(Path::new(&home).join(".groq").join("api_key"));
  }
  files.push(PathBuf::from("./.groq_api_key"));
  files.push(PathBuf::from("./groq_api_key.txt"));
  files
}

/// Resolve the API key from the given sources.
pub fn find_api_key(
  configured: Option<&str>,
  env_value: Option<&str>,
  key_files: &[PathBuf],
) -> Option<String> {
  let non_empty = |s: &str| {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
  };
  configured
    .and_then(non_empty)
    .or_else(|| env_value.and_then(non_empty))
    .or_else(|| {
      key_files.iter().find_map(|path| {
        std::fs::read_to_string(path)
          .ok()
          .and_then(|contents| non_empty(&contents))
      })
    })
}

/// [`find_api_key`] against the process environment and the default files.
pub fn resolve_api_key(configured: Option<&str>) -> Option<String> {
  let env_value = std::env::var(API_KEY_ENV).ok();
  find_api_key(configured, env_value.as_deref(), &default_key_files())
}
