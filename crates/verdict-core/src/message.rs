//! Messages a pipeline worker sends to its caller.
//!
//! A run emits any number of `Status` and `ErrorPartial` messages followed by
//! exactly one terminal message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A progress checkpoint. `progress` is in `[0.0, 1.0]` and never decreases
/// within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
  pub progress: f32,
  pub text:     String,
}

/// One product's row in a comparison result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
  pub product_id:   String,
  pub name:         String,
  pub analysis:     String,
  pub review_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunMessage {
  Status(ProgressEvent),
  Result {
    name:         String,
    analysis:     String,
    completed_at: DateTime<Utc>,
  },
  NoReviews {
    name: String,
  },
  MultiResult {
    title:        String,
    items:        Vec<ItemReport>,
    aggregate:    String,
    completed_at: DateTime<Utc>,
  },
  /// Fatal: the run is over.
  Error {
    message: String,
  },
  /// Informational: one item failed, the run continues.
  ErrorPartial {
    message: String,
  },
}

impl RunMessage {
  pub fn status(progress: f32, text: impl Into<String>) -> Self {
    Self::Status(ProgressEvent { progress, text: text.into() })
  }

  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      Self::Result { .. }
        | Self::NoReviews { .. }
        | Self::MultiResult { .. }
        | Self::Error { .. }
    )
  }
}
