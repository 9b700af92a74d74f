//! HTTP adapter for the product catalog.
//!
//! [`CatalogClient`] implements [`verdict_core::catalog::Catalog`] over the
//! catalog's three public endpoints: the product detail page (scraped for a
//! title), the card metadata API (root family, name, brand, variations) and
//! the feedbacks API (reviews per root family).

mod client;
mod raw;
mod resolve;
mod reviews;

pub mod config;
pub mod error;

pub use client::CatalogClient;
pub use config::CatalogConfig;
pub use error::{Error, Result};
pub use resolve::{CardProduct, extract_title, merge_product_info};
