//! Retry-with-fallback policy.
//!
//! A policy is an ordered list of `(model, attempts)` tiers. Each tier is
//! tried up to its attempt count; on exhaustion the next tier takes over. A
//! fatal provider error stops everything immediately.

use std::{future::Future, time::Duration};

use tracing::{info, warn};
use verdict_core::ProviderError;

use crate::ModelTier;

#[derive(Debug, Clone)]
pub struct TierPolicy {
  tiers: Vec<ModelTier>,
  delay: Duration,
}

impl TierPolicy {
  pub fn new(tiers: Vec<ModelTier>, delay: Duration) -> Self { Self { tiers, delay } }

  /// Total attempts the policy allows across all tiers.
  pub fn max_attempts(&self) -> usize { self.tiers.iter().map(|t| t.attempts).sum() }

  /// Drive `attempt` through the tiers until one call succeeds.
  ///
  /// `attempt` receives the model name of the current tier. `delay` is slept
  /// between consecutive attempts, never before the first.
  pub async fn run<'p, F, Fut>(&'p self, mut attempt: F) -> Result<String, ProviderError>
  where
    F: FnMut(&'p str) -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
  {
    let mut made = 0;
    let mut last: Option<ProviderError> = None;

    for tier in &self.tiers {
      for n in 1..=tier.attempts {
        if made > 0 && !self.delay.is_zero() {
          tokio::time::sleep(self.delay).await;
        }
        made += 1;
        match attempt(&tier.model).await {
          Ok(text) => {
            info!(model = %tier.model, attempt = n, "completion received");
            return Ok(text);
          }
          Err(e) if e.is_fatal() => return Err(e),
          Err(e) => {
            warn!(model = %tier.model, attempt = n, error = %e, "completion attempt failed");
            last = Some(e);
          }
        }
      }
    }

    Err(ProviderError::Exhausted {
      attempts: made,
      last:     last.map_or_else(|| "no model tiers configured".to_string(), |e| e.to_string()),
    })
  }
}
