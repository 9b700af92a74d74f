//! Review budgeting: fit rendered reviews under a character limit.
//!
//! Lengths are counted in `char`s, never bytes, so Cyrillic text is
//! budgeted the same as Latin.

use tracing::debug;

use crate::PipelineSettings;

/// A partial review is only worth appending with more room than this.
const MIN_FRAGMENT: usize = 100;

/// Below this many packed reviews the budgeter prefers breadth.
const MIN_PACKED: usize = 3;

const ELLIPSIS: &str = "...";

/// Greedily take whole reviews in order while they fit in `max_chars`.
///
/// The first review that does not fit is cut to the remaining room and
/// appended if that room exceeds [`MIN_FRAGMENT`]; packing stops there
/// either way.
pub fn pack(reviews: &[String], max_chars: usize) -> Vec<String> {
  let mut packed = Vec::new();
  let mut used = 0;

  for review in reviews {
    let len = review.chars().count();
    if used + len <= max_chars {
      packed.push(review.clone());
      used += len;
      continue;
    }
    let room = max_chars - used;
    if room > MIN_FRAGMENT {
      packed.push(review.chars().take(room).collect());
    }
    break;
  }

  packed
}

/// Budget the reviews of one product for a prompt.
///
/// Considers the first `max_reviews` reviews and packs them under
/// `max_chars`. When that leaves fewer than three reviews although at
/// least three exist, falls back to the first `fallback_reviews` reviews,
/// each cut to `fallback_chars` with an ellipsis.
pub fn budget(reviews: &[String], settings: &PipelineSettings) -> Vec<String> {
  let considered = &reviews[..reviews.len().min(settings.max_reviews)];
  let packed = pack(considered, settings.max_chars);

  if packed.len() < MIN_PACKED && reviews.len() >= MIN_PACKED {
    debug!(packed = packed.len(), total = reviews.len(), "reviews too long; shortening each");
    return reviews
      .iter()
      .take(settings.fallback_reviews)
      .map(|r| shorten(r, settings.fallback_chars))
      .collect();
  }

  packed
}

fn shorten(review: &str, limit: usize) -> String {
  if review.chars().count() <= limit {
    return review.to_string();
  }
  let mut short: String = review.chars().take(limit).collect();
  short.push_str(ELLIPSIS);
  short
}
