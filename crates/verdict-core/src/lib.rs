//! Core types and collaborator traits for the verdict review analyser.
//!
//! This crate is deliberately free of HTTP dependencies. The catalog adapter,
//! the text-generation adapter and the pipeline all depend on it; it depends
//! on nothing proprietary.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures where the pipeline needs them.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod catalog;
pub mod client;
pub mod error;
pub mod id;
pub mod message;
pub mod product;
pub mod review;

pub use error::{Error, ProviderError, Result};
pub use id::ProductId;
