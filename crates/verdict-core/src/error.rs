//! Error types for `verdict-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "invalid product identifier {0:?}: expected a catalog link or 7 to 15 \
     decimal digits"
  )]
  InvalidIdentifier(String),

  #[error("could not retrieve data for any of the requested products")]
  NoUsableProducts,

  #[error(
    "retrieved data for only {usable} of {requested} products; comparison \
     is not possible"
  )]
  TooFewProducts { usable: usize, requested: usize },

  #[error(
    "insufficient successful analyses for comparison ({successful} of \
     {requested} products analysed)"
  )]
  InsufficientAnalyses { successful: usize, requested: usize },

  #[error("analysis provider unavailable: {0}")]
  Provider(#[from] ProviderError),
}

/// Failure reported by an [`AnalysisClient`](crate::client::AnalysisClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
  #[error("no API key configured for the text-generation provider")]
  MissingCredentials,

  #[error("provider returned {status}: {body}")]
  Http { status: u16, body: String },

  #[error("transport error: {0}")]
  Transport(String),

  #[error("provider returned an empty completion")]
  EmptyResponse,

  #[error("all {attempts} attempts failed; last error: {last}")]
  Exhausted { attempts: usize, last: String },
}

impl ProviderError {
  /// Fatal errors abort the whole run: every further submission would fail
  /// the same way.
  pub fn is_fatal(&self) -> bool { matches!(self, Self::MissingCredentials) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
