//! The analysis pipeline: fetch → budget → analyse → aggregate.
//!
//! [`Orchestrator`] sequences one run against an injected
//! [`Catalog`](verdict_core::catalog::Catalog) and
//! [`AnalysisClient`](verdict_core::client::AnalysisClient), reporting
//! progress over a [`RunMessage`](verdict_core::message::RunMessage)
//! channel. [`spawn_single`] and [`spawn_multiple`] start a run on its own
//! task and hand back the receiving end.

pub mod budget;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod run;
pub mod settings;

pub use orchestrator::Orchestrator;
pub use run::{RunHandle, spawn_multiple, spawn_single};
pub use settings::PipelineSettings;

#[cfg(test)]
mod tests;
