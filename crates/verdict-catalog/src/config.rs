//! Catalog endpoint configuration.

use std::time::Duration;

use serde::Deserialize;

/// Endpoints and limits for [`CatalogClient`](crate::CatalogClient).
///
/// Every field has a default, so an empty `[catalog]` table is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
  /// Origin serving `/catalog/{id}/detail.aspx` pages.
  pub page_base_url:     String,
  /// Card metadata endpoint; queried with `nm={id}`.
  pub card_api_url:      String,
  /// Feedbacks endpoint; queried with `imtId={root}&take={page_size}`.
  pub feedbacks_url:     String,
  pub timeout_secs:      u64,
  /// The detail page is slower than the JSON APIs.
  pub page_timeout_secs: u64,
  pub page_size:         u32,
  pub user_agent:        String,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      page_base_url:     "https://www.wildberries.ru".into(),
      card_api_url:      "https://card.wb.ru/cards/v2/detail".into(),
      feedbacks_url:     "https://feedbacks.wildberries.ru/api/v1/feedbacks".into(),
      timeout_secs:      15,
      page_timeout_secs: 20,
      page_size:         5000,
      user_agent:        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"
        .into(),
    }
  }
}

impl CatalogConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  pub fn page_timeout(&self) -> Duration { Duration::from_secs(self.page_timeout_secs) }
}
