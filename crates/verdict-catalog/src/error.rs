//! Error type for `verdict-catalog`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] verdict_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{url} returned {status}")]
  Status { status: u16, url: String },

  #[error("malformed response from {url}: {message}")]
  Decode { url: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
