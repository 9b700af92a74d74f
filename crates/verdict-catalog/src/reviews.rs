//! Decoding of the feedbacks endpoint.
//!
//! The endpoint answers in one of three shapes for the same request:
//!
//! - `{"feedbacks": [...]}` (possibly with `null` instead of a list),
//! - a bare `[...]`,
//! - an empty `{}` when the family has no reviews.
//!
//! All of them collapse into a [`ReviewBatch`] right here.

use serde::Deserialize;
use serde_json::Value;
use verdict_core::review::{Review, ReviewBatch};

use crate::raw::{RawId, lenient_string, value_to_string};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedbackEnvelope {
  Bare(Vec<Value>),
  Wrapped {
    #[serde(default)]
    feedbacks: Option<Vec<Value>>,
  },
}

#[derive(Debug, Deserialize)]
struct RawFeedback {
  #[serde(default, deserialize_with = "lenient_string")]
  text:              Option<String>,
  #[serde(default, rename = "productValuation")]
  product_valuation: Option<Value>,
  #[serde(default, deserialize_with = "lenient_string")]
  pros:              Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  cons:              Option<String>,
  #[serde(default, rename = "nmId")]
  nm_id:             Option<RawId>,
}

impl From<RawFeedback> for Review {
  fn from(raw: RawFeedback) -> Self {
    let text = raw
      .text
      .filter(|t| !t.trim().is_empty())
      .or_else(|| raw.product_valuation.as_ref().and_then(value_to_string))
      .unwrap_or_default();
    Review {
      text,
      pros: raw.pros.unwrap_or_default(),
      cons: raw.cons.unwrap_or_default(),
      owner_variation: raw.nm_id.map(|id| id.as_string()),
    }
  }
}

/// Normalise an already-parsed feedbacks payload.
///
/// Returns `None` for a payload that matches none of the known shapes;
/// callers treat that as "no reviews". Entries that are not review objects
/// are skipped.
pub(crate) fn normalize(payload: Value) -> Option<ReviewBatch> {
  let records = match FeedbackEnvelope::deserialize(payload).ok()? {
    FeedbackEnvelope::Bare(items) => items,
    FeedbackEnvelope::Wrapped { feedbacks } => feedbacks.unwrap_or_default(),
  };
  let reviews = records
    .into_iter()
    .filter(Value::is_object)
    .filter_map(|record| serde_json::from_value::<RawFeedback>(record).ok())
    .map(Review::from)
    .collect();
  Some(ReviewBatch::new(reviews))
}
