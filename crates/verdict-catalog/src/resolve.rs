//! Product resolution: turning scraped and API data into a [`ProductInfo`].
//!
//! Two sources feed resolution, each independently fallible:
//!
//! 1. the detail page, scraped for a title;
//! 2. the card metadata API, for the root family, canonical name, brand and
//!    the label of the requested variation.
//!
//! The merge rules live here as pure functions so they can be tested without
//! a network.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use verdict_core::{
  ProductId,
  product::{ProductInfo, placeholder_name},
};

use crate::raw::{RawId, lenient_string, lenient_vec};

// ─── Page title ──────────────────────────────────────────────────────────────

/// Structural markers for the product title, tried in order.
static TITLE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
  [
    Regex::new(r#"(?s)<h1\s+class="product-page__title"[^>]*>(.*?)</h1>"#)
      .expect("static regex"),
    Regex::new(r#"(?s)<span\s+data-link="text\{:selectedNomenclature.naming\}"[^>]*>(.*?)</span>"#)
      .expect("static regex"),
  ]
});

static COMMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));

static TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

/// Extract the product title from a detail page. The first marker that
/// yields non-empty text wins.
pub fn extract_title(html: &str) -> Option<String> {
  TITLE_PATTERNS.iter().find_map(|pattern| {
    let fragment = pattern.captures(html)?.get(1)?.as_str();
    let without_comments = COMMENT.replace_all(fragment, "");
    let text = TAG.replace_all(&without_comments, "");
    let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
  })
}

// ─── Card metadata ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CardResponse {
  #[serde(default)]
  data: Option<CardData>,
}

#[derive(Debug, Default, Deserialize)]
struct CardData {
  #[serde(default, deserialize_with = "lenient_vec")]
  products: Vec<CardProduct>,
}

impl CardResponse {
  /// The first product record, if the response carries any.
  pub(crate) fn into_first_product(self) -> Option<CardProduct> {
    self.data?.products.into_iter().next()
  }
}

/// One product record from the card metadata API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardProduct {
  /// Root family identifier.
  #[serde(default)]
  pub(crate) id:      Option<RawId>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub(crate) name:    Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub(crate) brand:   Option<String>,
  #[serde(default, deserialize_with = "lenient_vec")]
  pub(crate) colors:  Vec<Variant>,
  #[serde(default, deserialize_with = "lenient_vec")]
  pub(crate) options: Vec<Variant>,
}

/// A colour/size entry; colour entries may nest their own options.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Variant {
  #[serde(default)]
  id:      Option<RawId>,
  #[serde(default, deserialize_with = "lenient_string")]
  name:    Option<String>,
  #[serde(default, deserialize_with = "lenient_vec")]
  options: Vec<Variant>,
}

impl Variant {
  fn is(&self, sku: &str) -> bool { self.id.as_ref().is_some_and(|id| id.matches(sku)) }

  fn label(&self) -> Option<String> { non_empty(self.name.as_deref()) }
}

fn non_empty(s: Option<&str>) -> Option<String> {
  s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Label of the variation `sku` within `product`.
///
/// With a colour list: the colour entry whose id is `sku` (preferring its own
/// option with the same id), else any nested option with that id, else the
/// first colour entry. Without one: the product-level option with that id.
fn variation_label(product: &CardProduct, sku: &str) -> Option<String> {
  if let Some(first) = product.colors.first() {
    if let Some(entry) = product.colors.iter().find(|c| c.is(sku)) {
      let own_option = entry.options.iter().find(|o| o.is(sku)).and_then(Variant::label);
      if let Some(label) = own_option.or_else(|| entry.label()) {
        return Some(label);
      }
    }
    let nested = product
      .colors
      .iter()
      .flat_map(|c| c.options.iter())
      .find(|o| o.is(sku))
      .and_then(Variant::label);
    return nested.or_else(|| first.label());
  }
  product.options.iter().find(|o| o.is(sku)).and_then(Variant::label)
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Combine the page title and the card record into a [`ProductInfo`].
///
/// Name precedence: page title, then the card name, then a placeholder. A
/// candidate equal to the bare identifier counts as missing. The brand is
/// prefixed unless the name already contains it (case-insensitively). With
/// no card record the product is treated as its own root family.
pub fn merge_product_info(
  id: &ProductId,
  page_title: Option<String>,
  card: Option<CardProduct>,
) -> ProductInfo {
  let usable = |name: Option<String>| {
    name.filter(|n| !n.trim().is_empty() && n.trim() != id.as_str())
  };
  let page_title = usable(page_title);

  let Some(card) = card else {
    return ProductInfo {
      display_name: page_title.unwrap_or_else(|| placeholder_name(id)),
      ..ProductInfo::placeholder(id.clone())
    };
  };

  let root_id = card
    .id
    .as_ref()
    .and_then(|raw| ProductId::parse(&raw.as_string()).ok())
    .unwrap_or_else(|| id.clone());

  let mut display_name = page_title
    .or_else(|| usable(card.name.clone()).map(|n| n.trim().to_string()))
    .unwrap_or_else(|| placeholder_name(id));

  let brand = non_empty(card.brand.as_deref());
  if let Some(brand) = &brand
    && !display_name.to_lowercase().contains(&brand.to_lowercase())
  {
    display_name = format!("{brand} / {display_name}");
  }

  ProductInfo {
    id: id.clone(),
    root_id,
    display_name,
    brand,
    variation_label: variation_label(&card, id.as_str()),
  }
}
