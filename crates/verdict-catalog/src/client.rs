//! [`CatalogClient`] — the reqwest implementation of [`Catalog`].

use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use verdict_core::{
  ProductId,
  catalog::Catalog,
  product::ProductInfo,
  review::ReviewBatch,
};

use crate::{
  CatalogConfig, Error, Result,
  resolve::{CardProduct, CardResponse, extract_title, merge_product_info},
  reviews::normalize,
};

/// Async HTTP client for the catalog endpoints.
///
/// Owns its own connection pool; build one per pipeline run and drop it when
/// the run ends.
#[derive(Clone)]
pub struct CatalogClient {
  client: Client,
  config: CatalogConfig,
}

impl CatalogClient {
  pub fn new(config: CatalogConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout())
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, config })
  }

  fn page_url(&self, id: &ProductId) -> String {
    format!(
      "{}/catalog/{id}/detail.aspx",
      self.config.page_base_url.trim_end_matches('/')
    )
  }

  // ── Resolution ────────────────────────────────────────────────────────────

  /// Validate raw user input and resolve it.
  ///
  /// The only error is a malformed identifier, reported before any request
  /// is made.
  pub async fn resolve_input(&self, raw: &str) -> Result<ProductInfo> {
    let id = ProductId::from_input(raw)?;
    Ok(self.resolve_product(&id).await)
  }

  /// Resolve a validated identifier, degrading source by source.
  pub async fn resolve_product(&self, id: &ProductId) -> ProductInfo {
    let page_title = self.page_title(id).await;
    let card = match self.card_product(id).await {
      Ok(card) => card,
      Err(e) => {
        warn!(sku = %id, error = %e, "card metadata unavailable; treating product as its own root");
        None
      }
    };
    let info = merge_product_info(id, page_title, card);
    debug!(
      sku = %id,
      root = %info.root_id,
      name = %info.display_name,
      variation = info.variation_label.as_deref().unwrap_or(""),
      "resolved product"
    );
    info
  }

  /// Scrape the detail page for a title. Every failure collapses to `None`.
  pub async fn page_title(&self, id: &ProductId) -> Option<String> {
    let url = self.page_url(id);
    let resp = match self
      .client
      .get(&url)
      .timeout(self.config.page_timeout())
      .send()
      .await
    {
      Ok(resp) => resp,
      Err(e) => {
        warn!(sku = %id, error = %e, "detail page request failed");
        return None;
      }
    };

    if !resp.url().path().contains(&format!("/catalog/{id}/")) {
      warn!(sku = %id, final_url = %resp.url(), "detail page redirected to another product");
    }
    if resp.status() != StatusCode::OK {
      warn!(sku = %id, status = resp.status().as_u16(), "detail page returned non-200");
      return None;
    }

    let html = match resp.text().await {
      Ok(html) => html,
      Err(e) => {
        warn!(sku = %id, error = %e, "reading detail page failed");
        return None;
      }
    };
    let title = extract_title(&html);
    if title.is_none() {
      warn!(sku = %id, "no title marker found on detail page");
    }
    title
  }

  /// Fetch the first card record for `id`. `Ok(None)` means the endpoint
  /// answered but carried no product.
  async fn card_product(&self, id: &ProductId) -> Result<Option<CardProduct>> {
    let url = &self.config.card_api_url;
    let resp = self
      .client
      .get(url)
      .query(&[
        ("appType", "1"),
        ("curr", "rub"),
        ("dest", "-1257786"),
        ("spp", "30"),
        ("nm", id.as_str()),
      ])
      .send()
      .await?;

    if resp.status() != StatusCode::OK {
      return Err(Error::Status {
        status: resp.status().as_u16(),
        url:    url.clone(),
      });
    }
    let body = resp.text().await?;
    let card: CardResponse = serde_json::from_str(&body).map_err(|e| Error::Decode {
      url:     url.clone(),
      message: e.to_string(),
    })?;
    let product = card.into_first_product();
    if product.is_none() {
      warn!(sku = %id, "card metadata response carries no product record");
    }
    Ok(product)
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  /// Fetch every review stored for the root family `root`.
  pub async fn fetch_all(&self, root: &ProductId) -> Result<ReviewBatch> {
    let url = &self.config.feedbacks_url;
    let page_size = self.config.page_size.to_string();
    let resp = self
      .client
      .get(url)
      .query(&[("imtId", root.as_str()), ("take", page_size.as_str()), ("skip", "0")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        status: resp.status().as_u16(),
        url:    url.clone(),
      });
    }
    let body = resp.text().await?;
    let payload: serde_json::Value = serde_json::from_str(&body).map_err(|e| Error::Decode {
      url:     url.clone(),
      message: e.to_string(),
    })?;

    let batch = normalize(payload).unwrap_or_else(|| {
      let sample: String = body.chars().take(200).collect();
      warn!(root = %root, sample = %sample, "unexpected feedbacks shape; treating as no reviews");
      ReviewBatch::default()
    });
    info!(root = %root, count = batch.len(), "fetched reviews");
    Ok(batch)
  }
}

impl Catalog for CatalogClient {
  type Error = Error;

  async fn resolve<'a>(&'a self, id: &'a ProductId) -> ProductInfo {
    self.resolve_product(id).await
  }

  async fn fetch_reviews<'a>(&'a self, root: &'a ProductId) -> Result<ReviewBatch> {
    self.fetch_all(root).await
  }
}
