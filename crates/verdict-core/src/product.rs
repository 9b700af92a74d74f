//! Resolved product identity.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Display name used when neither catalog source yields one.
pub fn placeholder_name(id: &ProductId) -> String { format!("Product {id}") }

/// What the catalog knows about one requested variation.
///
/// Built once per resolution attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
  /// The identifier the user asked about.
  pub id:              ProductId,
  /// The family the variation belongs to; reviews are stored per root.
  /// Equal to `id` when no distinct root could be discovered.
  pub root_id:         ProductId,
  pub display_name:    String,
  pub brand:           Option<String>,
  /// Colour or size label of the requested variation.
  pub variation_label: Option<String>,
}

impl ProductInfo {
  /// The degraded record used when every catalog source failed.
  pub fn placeholder(id: ProductId) -> Self {
    Self {
      display_name: placeholder_name(&id),
      root_id: id.clone(),
      id,
      brand: None,
      variation_label: None,
    }
  }

  /// Name plus variation label, e.g. `Acme / Lamp (Red)`.
  pub fn label(&self) -> String {
    match &self.variation_label {
      Some(v) => format!("{} ({v})", self.display_name),
      None => self.display_name.clone(),
    }
  }
}
