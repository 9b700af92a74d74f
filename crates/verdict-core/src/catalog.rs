//! The `Catalog` trait: where product identity and reviews come from.
//!
//! Implemented by `verdict-catalog` over HTTP and by in-memory fakes in
//! tests. The pipeline depends on this abstraction, not on any transport.

use std::future::Future;

use crate::{ProductId, product::ProductInfo, review::ReviewBatch};

pub trait Catalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve display name, brand, variation label and root family for an
  /// already-validated identifier.
  ///
  /// Never fails: every degraded source falls back, and the worst case is
  /// [`ProductInfo::placeholder`].
  fn resolve<'a>(
    &'a self,
    id: &'a ProductId,
  ) -> impl Future<Output = ProductInfo> + Send + 'a;

  /// Fetch every review stored for the root family `root`.
  ///
  /// An `Err` means the reviews could not be retrieved; callers treat it as
  /// an empty batch, not as a reason to abort.
  fn fetch_reviews<'a>(
    &'a self,
    root: &'a ProductId,
  ) -> impl Future<Output = Result<ReviewBatch, Self::Error>> + Send + 'a;
}
