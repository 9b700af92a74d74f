//! Pipeline tuning.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
  /// Reviews kept per product after variation filtering.
  pub review_cap:           usize,
  /// Character budget for the reviews in one prompt.
  pub max_chars:            usize,
  /// Reviews considered by the budgeter.
  pub max_reviews:          usize,
  /// Breadth-over-depth fallback: how many reviews, and how long each.
  pub fallback_reviews:     usize,
  pub fallback_chars:       usize,
  /// Products processed at once in a comparison run.
  pub concurrency:          usize,
  /// Only analyse reviews written for the requested variation.
  pub strict_variation:     bool,
  /// Products with fewer reviews are flagged as low-data in comparisons.
  pub low_review_threshold: usize,
}

impl Default for PipelineSettings {
  fn default() -> Self {
    Self {
      review_cap:           300,
      max_chars:            15_000,
      max_reviews:          100,
      fallback_reviews:     30,
      fallback_chars:       200,
      concurrency:          1,
      strict_variation:     true,
      low_review_threshold: 5,
    }
  }
}
