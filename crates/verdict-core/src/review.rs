//! Reviews and variation filtering.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// One customer review, normalised from whatever shape the catalog used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub text:            String,
  pub pros:            String,
  pub cons:            String,
  /// Identifier of the variation the review was written for. Reviews
  /// without it are unscoped.
  pub owner_variation: Option<String>,
}

impl Review {
  /// Text handed to the budgeter: the body followed by pros/cons lines.
  pub fn render(&self) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);
    let body = self.text.trim();
    if !body.is_empty() {
      parts.push(body.to_string());
    }
    let pros = self.pros.trim();
    if !pros.is_empty() {
      parts.push(format!("Pros: {pros}"));
    }
    let cons = self.cons.trim();
    if !cons.is_empty() {
      parts.push(format!("Cons: {cons}"));
    }
    parts.join("\n")
  }

  /// Whether this review was written for `variation`.
  pub fn belongs_to(&self, variation: &ProductId) -> bool {
    self.owner_variation.as_deref() == Some(variation.as_str())
  }
}

/// Reviews fetched for one root family, in source order. Empty is a valid
/// state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBatch {
  pub reviews: Vec<Review>,
}

impl ReviewBatch {
  pub fn new(reviews: Vec<Review>) -> Self { Self { reviews } }

  pub fn len(&self) -> usize { self.reviews.len() }

  pub fn is_empty(&self) -> bool { self.reviews.is_empty() }

  /// With `strict`, keep only reviews owned by exactly `target`; unscoped
  /// reviews are dropped. Without it, keep everything.
  pub fn filter_by_variation(self, target: &ProductId, strict: bool) -> Self {
    if !strict {
      return self;
    }
    Self {
      reviews: self
        .reviews
        .into_iter()
        .filter(|r| r.belongs_to(target))
        .collect(),
    }
  }

  /// Keep at most `limit` reviews from the front.
  pub fn truncated(mut self, limit: usize) -> Self {
    self.reviews.truncate(limit);
    self
  }

  /// Rendered, non-empty review texts in order.
  pub fn texts(&self) -> Vec<String> {
    self
      .reviews
      .iter()
      .map(Review::render)
      .filter(|t| !t.is_empty())
      .collect()
  }
}
