//! Product identifiers and extraction from user input.
//!
//! Extraction is lenient (it accepts whatever the user pasted and returns a
//! best-effort candidate); validation is strict and happens before any
//! network call.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MIN_DIGITS: usize = 7;
pub const MAX_DIGITS: usize = 15;

static CATALOG_PATH: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"/catalog/([0-9]+)(?:[/?#]|$)").expect("static regex")
});

static STANDALONE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:^|[^0-9])([0-9]{7,15})(?:[^0-9]|$)").expect("static regex")
});

/// Pull a product identifier candidate out of a raw catalog link or a bare
/// identifier.
///
/// Precedence:
/// 1. a trimmed all-digit string is returned verbatim, whatever its length;
/// 2. the digit run of a `/catalog/<digits>` path segment;
/// 3. the first standalone run of 7–15 digits anywhere in the input;
/// 4. otherwise the trimmed input itself, unchanged.
///
/// The result is *not* validated; see [`ProductId::parse`].
pub fn extract(input: &str) -> String {
  let trimmed = input.trim();
  if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return trimmed.to_string();
  }
  if let Some(caps) = CATALOG_PATH.captures(trimmed) {
    return caps[1].to_string();
  }
  if let Some(caps) = STANDALONE_DIGITS.captures(trimmed) {
    return caps[1].to_string();
  }
  trimmed.to_string()
}

/// A validated catalog identifier: 7 to 15 ASCII decimal digits.
///
/// Both variations and root product families are addressed by a
/// `ProductId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
  /// Validate `raw` (after trimming) against the identifier pattern.
  pub fn parse(raw: &str) -> Result<Self> {
    let s = raw.trim();
    let valid = (MIN_DIGITS..=MAX_DIGITS).contains(&s.len())
      && s.bytes().all(|b| b.is_ascii_digit());
    if valid {
      Ok(Self(s.to_string()))
    } else {
      Err(Error::InvalidIdentifier(s.to_string()))
    }
  }

  /// [`extract`] followed by [`ProductId::parse`].
  pub fn from_input(input: &str) -> Result<Self> { Self::parse(&extract(input)) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for ProductId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<String> for ProductId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<ProductId> for String {
  fn from(id: ProductId) -> Self { id.0 }
}
