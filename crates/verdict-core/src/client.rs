//! The `AnalysisClient` trait: an opaque "prompt in, text out" capability.

use std::future::Future;

use crate::ProviderError;

pub trait AnalysisClient: Send + Sync {
  /// Submit `prompt` with a system instruction and return the generated
  /// text. Retries and model fallback are the implementation's concern.
  fn submit<'a>(
    &'a self,
    prompt: &'a str,
    system: &'a str,
  ) -> impl Future<Output = Result<String, ProviderError>> + Send + 'a;
}
