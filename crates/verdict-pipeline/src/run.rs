//! One worker task per run.
//!
//! The worker owns its [`Orchestrator`] (and with it the catalog and
//! analysis clients); everything is dropped when the run ends, on every
//! path. The caller only holds the receiving end of an unbounded channel,
//! so the worker never waits on it.

use std::future::Future;

use tokio::{
  sync::mpsc::{self, UnboundedReceiver},
  task::JoinHandle,
};
use tracing::{Instrument, info_span};
use uuid::Uuid;
use verdict_core::{catalog::Catalog, client::AnalysisClient, message::RunMessage};

use crate::{Orchestrator, PipelineSettings};

/// The caller's side of a spawned run.
#[derive(Debug)]
pub struct RunHandle {
  pub id:       Uuid,
  pub messages: UnboundedReceiver<RunMessage>,
  pub worker:   JoinHandle<()>,
}

impl RunHandle {
  /// Wait for the next message. `None` once the worker is gone and the
  /// channel is drained.
  pub async fn next(&mut self) -> Option<RunMessage> { self.messages.recv().await }

  /// Non-blocking poll for callers that run their own event loop.
  pub fn try_next(&mut self) -> Option<RunMessage> { self.messages.try_recv().ok() }
}

/// Spawn a single-product run on the current tokio runtime.
pub fn spawn_single<C, A>(
  catalog: C,
  client: A,
  settings: PipelineSettings,
  input: String,
) -> RunHandle
where
  C: Catalog + 'static,
  A: AnalysisClient + 'static,
{
  spawn(catalog, client, settings, move |orchestrator, tx| async move {
    orchestrator.run_single(&input, tx).await
  })
}

/// Spawn a comparison run on the current tokio runtime.
pub fn spawn_multiple<C, A>(
  catalog: C,
  client: A,
  settings: PipelineSettings,
  inputs: Vec<String>,
) -> RunHandle
where
  C: Catalog + 'static,
  A: AnalysisClient + 'static,
{
  spawn(catalog, client, settings, move |orchestrator, tx| async move {
    orchestrator.run_multiple(&inputs, tx).await
  })
}

fn spawn<C, A, F, Fut>(catalog: C, client: A, settings: PipelineSettings, run: F) -> RunHandle
where
  C: Catalog + 'static,
  A: AnalysisClient + 'static,
  F: FnOnce(Orchestrator<C, A>, mpsc::UnboundedSender<RunMessage>) -> Fut,
  Fut: Future<Output = ()> + Send + 'static,
{
  let id = Uuid::new_v4();
  let (tx, messages) = mpsc::unbounded_channel();
  let orchestrator = Orchestrator::new(catalog, client, settings);
  let worker = tokio::spawn(run(orchestrator, tx).instrument(info_span!("run", run_id = %id)));
  RunHandle { id, messages, worker }
}
