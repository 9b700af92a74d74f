//! Progress reporting for one run.
//!
//! The [`Reporter`] owns the sending half of the run's channel. It clamps
//! every progress fraction to the highest value already sent, so the
//! caller sees a non-decreasing sequence no matter how the pipeline
//! interleaves its checkpoints, and it consumes itself on the terminal
//! message so nothing can be sent after it.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use verdict_core::message::RunMessage;

// ─── Stage ────────────────────────────────────────────────────────────────────

/// Where a run currently is. Indexed stages refer to the position of the
/// product in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  ResolvingProduct(usize),
  FetchingReviews(usize),
  Budgeting(usize),
  AwaitingAnalysis(usize),
  Aggregating,
  AwaitingComparison,
  Done,
  Failed,
}

// ─── Sink ─────────────────────────────────────────────────────────────────────

/// Where per-item steps report to: straight to the channel, or into a
/// [`Buffer`] that is replayed later in item order.
pub trait Sink: Send {
  fn enter(&mut self, stage: Stage);

  fn status(&mut self, progress: f32, text: String);

  /// An informational failure of one item; the run carries on.
  fn partial(&mut self, message: String);
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
  Enter(Stage),
  Status(f32, String),
  Partial(String),
}

/// Events of one item, held back until the item's turn comes.
#[derive(Debug, Default)]
pub struct Buffer {
  events: Vec<Event>,
}

impl Buffer {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.events.len() }

  pub fn is_empty(&self) -> bool { self.events.is_empty() }

  /// Send every held event through `reporter`, in the order recorded.
  pub fn replay(self, reporter: &mut Reporter) {
    for event in self.events {
      match event {
        Event::Enter(stage) => reporter.enter(stage),
        Event::Status(p, text) => reporter.status(p, text),
        Event::Partial(message) => reporter.partial(message),
      }
    }
  }
}

impl Sink for Buffer {
  fn enter(&mut self, stage: Stage) { self.events.push(Event::Enter(stage)); }

  fn status(&mut self, progress: f32, text: String) {
    self.events.push(Event::Status(progress, text));
  }

  fn partial(&mut self, message: String) { self.events.push(Event::Partial(message)); }
}

// ─── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Reporter {
  tx:       UnboundedSender<RunMessage>,
  stage:    Stage,
  high:     f32,
  detached: bool,
}

impl Reporter {
  pub fn new(tx: UnboundedSender<RunMessage>) -> Self {
    Self { tx, stage: Stage::Idle, high: 0.0, detached: false }
  }

  pub fn stage(&self) -> Stage { self.stage }

  /// Send the terminal message. Consumes the reporter.
  pub fn finish(mut self, message: RunMessage) {
    let stage = match message {
      RunMessage::Error { .. } => Stage::Failed,
      _ => Stage::Done,
    };
    self.enter(stage);
    self.send(message);
  }

  /// A dropped receiver means the caller walked away; the run finishes
  /// quietly instead of failing.
  fn send(&mut self, message: RunMessage) {
    if self.tx.send(message).is_err() && !self.detached {
      self.detached = true;
      debug!("run receiver dropped; further messages are discarded");
    }
  }
}

impl Sink for Reporter {
  fn enter(&mut self, stage: Stage) {
    debug!(from = ?self.stage, to = ?stage, "run stage");
    self.stage = stage;
  }

  fn status(&mut self, progress: f32, text: String) {
    self.high = progress.clamp(0.0, 1.0).max(self.high);
    self.send(RunMessage::status(self.high, text));
  }

  fn partial(&mut self, message: String) { self.send(RunMessage::ErrorPartial { message }); }
}
