//! Analysis requests, outcomes and the per-run comparison accumulator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ProductId, product::ProductInfo};

/// Which prompt template a request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
  Single,
  Comparison,
}

/// Everything needed to analyse one product.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
  pub product:       ProductInfo,
  /// Reviews packed under the character budget, one per entry.
  pub budgeted_text: Vec<String>,
  pub kind:          PromptKind,
}

/// Why a product's analysis did not produce usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
  /// No reviews survived fetching and variation filtering.
  NoReviews,
  /// The text-generation provider failed on every tier.
  ProviderFailed,
}

/// Outcome of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisResult {
  Success {
    text: String,
  },
  /// Recoverable: the run carries on and `fallback_text` is shown instead.
  PartialFailure {
    reason:        FailureReason,
    detail:        String,
    fallback_text: String,
  },
  /// Aborts the run it occurs in.
  FatalFailure {
    detail: String,
  },
}

impl AnalysisResult {
  pub fn success(text: impl Into<String>) -> Self { Self::Success { text: text.into() } }

  pub fn is_success(&self) -> bool { matches!(self, Self::Success { .. }) }

  /// Text to show the user for this outcome.
  pub fn display_text(&self) -> &str {
    match self {
      Self::Success { text } => text,
      Self::PartialFailure { fallback_text, .. } => fallback_text,
      Self::FatalFailure { detail } => detail,
    }
  }
}

/// One product's contribution to a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
  pub product:      ProductInfo,
  pub result:       AnalysisResult,
  pub review_count: usize,
}

/// Per-run accumulator of analysed products.
///
/// Entries live in an ordered arena; the map only indexes into it, so
/// iteration order is the order products were first inserted and never
/// depends on hashing.
#[derive(Debug, Clone, Default)]
pub struct ComparisonInput {
  entries: Vec<ComparisonEntry>,
  index:   HashMap<ProductId, usize>,
}

impl ComparisonInput {
  pub fn new() -> Self { Self::default() }

  /// Insert or replace the entry for `entry.product.id`. A replaced entry
  /// keeps its original position.
  pub fn insert(&mut self, entry: ComparisonEntry) {
    match self.index.get(&entry.product.id) {
      Some(&slot) => self.entries[slot] = entry,
      None => {
        self.index.insert(entry.product.id.clone(), self.entries.len());
        self.entries.push(entry);
      }
    }
  }

  pub fn get(&self, id: &ProductId) -> Option<&ComparisonEntry> {
    self.index.get(id).map(|&slot| &self.entries[slot])
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &ComparisonEntry> { self.entries.iter() }

  /// Entries whose analysis succeeded and may anchor a comparison.
  pub fn successful(&self) -> usize {
    self.entries.iter().filter(|e| e.result.is_success()).count()
  }

  pub fn into_entries(self) -> Vec<ComparisonEntry> { self.entries }
}
