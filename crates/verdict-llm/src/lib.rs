//! Text-generation adapter for verdict.
//!
//! [`ChatClient`] speaks the OpenAI-compatible chat-completions protocol
//! (Groq by default) and implements [`verdict_core::client::AnalysisClient`].
//! Retrying and falling back to a smaller model is expressed as an ordered
//! list of [`ModelTier`]s driven by [`TierPolicy`].

mod chat;
mod sanitize;

pub mod config;
pub mod credentials;
pub mod policy;

pub use chat::ChatClient;
pub use config::{LlmConfig, ModelTier};
pub use policy::TierPolicy;
pub use sanitize::sanitize;
