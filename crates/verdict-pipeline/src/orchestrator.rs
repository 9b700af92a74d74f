//! [`Orchestrator`]: drives one analysis run from raw input to terminal
//! message.
//!
//! A single-product run resolves, fetches, budgets and analyses one
//! product. A comparison run does the same for every requested product in
//! two phases (fetch everything, then analyse everything), applies the
//! comparison thresholds, and asks for an aggregate recommendation.
//!
//! Per-item failures never abort sibling items; they surface as
//! `ErrorPartial` messages. Only the thresholds and fatal provider errors
//! end a run early.

use std::collections::HashSet;

use chrono::Utc;
use futures::{StreamExt, stream};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use verdict_core::{
  Error, ProductId, ProviderError,
  analysis::{
    AnalysisRequest, AnalysisResult, ComparisonEntry, ComparisonInput, FailureReason, PromptKind,
  },
  catalog::Catalog,
  client::AnalysisClient,
  message::{ItemReport, RunMessage},
  product::ProductInfo,
};

use crate::{
  PipelineSettings, budget,
  progress::{Buffer, Reporter, Sink, Stage},
  prompt::{self, ComparisonItem, SYSTEM_INSTRUCTION},
};

// ─── Progress checkpoints ─────────────────────────────────────────────────────

const FETCH_START: f32 = 0.1;
const FETCH_END: f32 = 0.2;
const ANALYSIS_START: f32 = 0.7;
const ANALYSIS_END: f32 = 0.8;
const AGGREGATE: f32 = 0.9;
const COMPLETE: f32 = 1.0;

/// Fraction for item `index` of `count`, spread evenly over `[lo, hi]`.
fn spread(lo: f32, hi: f32, index: usize, count: usize) -> f32 {
  if count <= 1 {
    return lo;
  }
  lo + (hi - lo) * index as f32 / (count - 1) as f32
}

// ─── User-facing placeholders ─────────────────────────────────────────────────

pub fn no_reviews_text(product: &ProductInfo) -> String {
  format!(
    "No reviews were found for \"{}\" (article {}), so it could not be analysed.",
    product.label(),
    product.id
  )
}

pub fn analysis_failed_text(product: &ProductInfo) -> String {
  format!(
    "The analysis of \"{}\" could not be completed because the text-generation service did not \
     respond. Please try again later.",
    product.label()
  )
}

pub const COMPARISON_FAILED_TEXT: &str = "The overall recommendation could not be generated \
                                          because the text-generation service did not respond. \
                                          The individual analyses are shown above.";

// ─── Run helpers ──────────────────────────────────────────────────────────────

/// Open a comparison item and validate its input. Invalid inputs are
/// reported as an `ErrorPartial` and dropped.
fn validate<S: Sink>(index: usize, count: usize, input: &str, sink: &mut S) -> Option<ProductId> {
  sink.enter(Stage::ResolvingProduct(index));
  sink.status(
    spread(FETCH_START, FETCH_END, index, count),
    format!("Processing product {} ({}/{count})...", input.trim(), index + 1),
  );
  match ProductId::from_input(input) {
    Ok(id) => Some(id),
    Err(e) => {
      warn!(input, error = %e, "skipping product");
      sink.partial(format!("Skipping \"{}\": {e}", input.trim()));
      None
    }
  }
}

/// For each input, whether it names a product not seen earlier in the list.
/// Invalid inputs count as first occurrences; `validate` reports them.
fn first_occurrences(inputs: &[String]) -> Vec<bool> {
  let mut seen = HashSet::new();
  inputs
    .iter()
    .map(|input| ProductId::from_input(input).map_or(true, |id| seen.insert(id)))
    .collect()
}

/// `validate`, then drop repeats of a product already in the comparison.
fn admit<S: Sink>(
  index: usize,
  count: usize,
  input: &str,
  first: bool,
  sink: &mut S,
) -> Option<ProductId> {
  let id = validate(index, count, input, sink)?;
  if !first {
    debug!(sku = %id, "duplicate product");
    sink.partial(format!("Skipping \"{}\": product {id} is already being compared", input.trim()));
    return None;
  }
  Some(id)
}

fn abort(mut reporter: Reporter, err: Error) {
  warn!(error = %err, "comparison aborted");
  reporter.status(AGGREGATE, "Not enough data for a comparison".into());
  reporter.finish(RunMessage::Error { message: err.to_string() });
}

// ─── Orchestrator ─────────────────────────────────────────────────────────────

/// A product that was resolved and had its reviews fetched.
#[derive(Debug, Clone)]
struct Fetched {
  index:   usize,
  product: ProductInfo,
  /// Rendered review texts after variation filtering and the cap.
  reviews: Vec<String>,
}

/// Sequences one run. Owns its collaborators; dropping the orchestrator
/// releases them.
pub struct Orchestrator<C, A> {
  catalog:  C,
  client:   A,
  settings: PipelineSettings,
}

impl<C: Catalog, A: AnalysisClient> Orchestrator<C, A> {
  pub fn new(catalog: C, client: A, settings: PipelineSettings) -> Self {
    Self { catalog, client, settings }
  }

  /// Analyse a single product. Always ends with exactly one terminal
  /// message on `tx`.
  pub async fn run_single(&self, input: &str, tx: UnboundedSender<RunMessage>) {
    let mut reporter = Reporter::new(tx);
    reporter.enter(Stage::ResolvingProduct(0));
    reporter.status(FETCH_START, format!("Resolving product {}...", input.trim()));

    let id = match ProductId::from_input(input) {
      Ok(id) => id,
      Err(e) => return reporter.finish(RunMessage::Error { message: e.to_string() }),
    };
    let fetched = self.fetch_item(0, 1, id, &mut reporter).await;
    let name = fetched.product.label();

    if fetched.reviews.is_empty() {
      reporter.status(COMPLETE, format!("No reviews found for '{name}'"));
      return reporter.finish(RunMessage::NoReviews { name });
    }

    let (result, _) = self.analyse_item(fetched, 0, 1, &mut reporter).await;
    match result {
      AnalysisResult::FatalFailure { detail } => {
        reporter.finish(RunMessage::Error { message: detail });
      }
      other => {
        reporter.status(COMPLETE, "Analysis complete".into());
        reporter.finish(RunMessage::Result {
          name,
          analysis: other.display_text().to_string(),
          completed_at: Utc::now(),
        });
      }
    }
  }

  /// Analyse several products and compare them. Always ends with exactly
  /// one terminal message on `tx`.
  pub async fn run_multiple(&self, inputs: &[String], tx: UnboundedSender<RunMessage>) {
    let mut reporter = Reporter::new(tx);
    let requested = inputs.len();

    let usable = self.fetch_phase(inputs, &mut reporter).await;
    let threshold = if usable.is_empty() {
      Some(Error::NoUsableProducts)
    } else if requested >= 2 && usable.len() < 2 {
      Some(Error::TooFewProducts { usable: usable.len(), requested })
    } else {
      None
    };
    if let Some(err) = threshold {
      return abort(reporter, err);
    }

    let input = match self.analysis_phase(usable, &mut reporter).await {
      Ok(input) => input,
      Err(detail) => return reporter.finish(RunMessage::Error { message: detail }),
    };

    let successful = input.successful();
    if successful < 2 {
      return abort(reporter, Error::InsufficientAnalyses { successful, requested });
    }

    reporter.enter(Stage::Aggregating);
    reporter.status(AGGREGATE, "Preparing the overall recommendation...".into());
    let labels: Vec<String> = input.iter().map(|e| e.product.label()).collect();
    let title = format!("Comparison: {}", labels.join(", "));
    let items: Vec<ComparisonItem<'_>> = input
      .iter()
      .zip(&labels)
      .map(|(entry, name)| ComparisonItem {
        name,
        analysis: entry.result.display_text(),
        review_count: entry.review_count,
      })
      .collect();
    let comparison_prompt = prompt::comparison(&items, self.settings.low_review_threshold);

    reporter.enter(Stage::AwaitingComparison);
    let aggregate = match self.submit(PromptKind::Comparison, &comparison_prompt).await {
      Ok(text) => text,
      Err(e) if e.is_fatal() => {
        return reporter.finish(RunMessage::Error { message: Error::Provider(e).to_string() });
      }
      Err(e) => {
        warn!(error = %e, "comparison failed");
        reporter.partial("The overall recommendation could not be generated.".into());
        COMPARISON_FAILED_TEXT.to_string()
      }
    };

    let items = input
      .into_entries()
      .into_iter()
      .map(|entry| ItemReport {
        product_id:   entry.product.id.to_string(),
        name:         entry.product.label(),
        analysis:     entry.result.display_text().to_string(),
        review_count: entry.review_count,
      })
      .collect();

    info!(%title, "comparison complete");
    reporter.status(COMPLETE, "Comparison complete".into());
    reporter.finish(RunMessage::MultiResult { title, items, aggregate, completed_at: Utc::now() });
  }

  // ─── Phases ─────────────────────────────────────────────────────────────────

  /// Resolve and fetch every input. Items whose identifier is invalid or
  /// repeats an earlier one are dropped with an `ErrorPartial`; the rest
  /// keep request order.
  async fn fetch_phase(&self, inputs: &[String], reporter: &mut Reporter) -> Vec<Fetched> {
    let count = inputs.len();
    let first = first_occurrences(inputs);
    let mut usable = Vec::with_capacity(count);

    if self.settings.concurrency <= 1 {
      for (index, input) in inputs.iter().enumerate() {
        if let Some(id) = admit(index, count, input, first[index], reporter) {
          usable.push(self.fetch_item(index, count, id, reporter).await);
        }
      }
      return usable;
    }

    let first = &first;
    let mut items = stream::iter(inputs.iter().cloned().enumerate())
      .map(|(index, input)| async move {
        let mut buffer = Buffer::new();
        let fetched = match admit(index, count, &input, first[index], &mut buffer) {
          Some(id) => Some(self.fetch_item(index, count, id, &mut buffer).await),
          None => None,
        };
        (fetched, buffer)
      })
      .buffered(self.settings.concurrency);
    while let Some((fetched, buffer)) = items.next().await {
      buffer.replay(reporter);
      usable.extend(fetched);
    }
    usable
  }

  /// Analyse every fetched product into a [`ComparisonInput`], in request
  /// order. `Err` carries the message of a fatal provider failure.
  async fn analysis_phase(
    &self,
    fetched: Vec<Fetched>,
    reporter: &mut Reporter,
  ) -> Result<ComparisonInput, String> {
    let count = fetched.len();
    let mut input = ComparisonInput::new();

    if self.settings.concurrency <= 1 {
      for (position, item) in fetched.into_iter().enumerate() {
        let (result, entry) = self.analyse_item(item, position, count, reporter).await;
        if let AnalysisResult::FatalFailure { detail } = result {
          return Err(detail);
        }
        input.insert(entry);
      }
      return Ok(input);
    }

    let mut items = stream::iter(fetched.into_iter().enumerate())
      .map(|(position, item)| async move {
        let mut buffer = Buffer::new();
        let analysed = self.analyse_item(item, position, count, &mut buffer).await;
        (analysed, buffer)
      })
      .buffered(self.settings.concurrency);
    while let Some(((result, entry), buffer)) = items.next().await {
      buffer.replay(reporter);
      if let AnalysisResult::FatalFailure { detail } = result {
        return Err(detail);
      }
      input.insert(entry);
    }
    Ok(input)
  }

  // ─── Per-item steps ─────────────────────────────────────────────────────────

  /// Resolve one product and fetch its reviews. Never fails: unreachable
  /// reviews are reported as an `ErrorPartial` and count as none.
  async fn fetch_item<S: Sink>(
    &self,
    index: usize,
    count: usize,
    id: ProductId,
    sink: &mut S,
  ) -> Fetched {
    let product = self.catalog.resolve(&id).await;
    sink.enter(Stage::FetchingReviews(index));
    if count == 1 {
      sink.status(FETCH_END, format!("Fetching reviews for '{}'...", product.label()));
    }

    let batch = match self.catalog.fetch_reviews(&product.root_id).await {
      Ok(batch) => batch,
      Err(e) => {
        warn!(sku = %id, root = %product.root_id, error = %e, "reviews unavailable");
        sink.partial(format!("Reviews for \"{}\" could not be retrieved: {e}", product.label()));
        Default::default()
      }
    };
    let fetched = batch.len();
    let kept = batch
      .filter_by_variation(&id, self.settings.strict_variation)
      .truncated(self.settings.review_cap);
    debug!(sku = %id, fetched, kept = kept.len(), "reviews filtered");

    Fetched { index, product, reviews: kept.texts() }
  }

  /// Budget and analyse one fetched product. `position` and `count` place
  /// it among the products being analysed.
  async fn analyse_item<S: Sink>(
    &self,
    item: Fetched,
    position: usize,
    count: usize,
    sink: &mut S,
  ) -> (AnalysisResult, ComparisonEntry) {
    let Fetched { index, product, reviews } = item;
    let review_count = reviews.len();

    let result = if reviews.is_empty() {
      sink.status(
        spread(ANALYSIS_START, ANALYSIS_END, position, count),
        format!("No reviews for '{}'", product.label()),
      );
      AnalysisResult::PartialFailure {
        reason:        FailureReason::NoReviews,
        detail:        format!("no reviews for {}", product.id),
        fallback_text: no_reviews_text(&product),
      }
    } else {
      sink.enter(Stage::Budgeting(index));
      let request = AnalysisRequest {
        budgeted_text: budget::budget(&reviews, &self.settings),
        product:       product.clone(),
        kind:          PromptKind::Single,
      };
      sink.enter(Stage::AwaitingAnalysis(index));
      let progress = if count == 1 {
        ANALYSIS_START
      } else {
        spread(ANALYSIS_START, ANALYSIS_END, position, count)
      };
      sink.status(progress, format!("Analysing reviews for '{}'...", product.label()));
      if count == 1 {
        sink.status(ANALYSIS_END, format!("Waiting for the analysis of '{}'...", product.label()));
      }
      self.analyse(&request, sink).await
    };

    let entry = ComparisonEntry { product, result: result.clone(), review_count };
    (result, entry)
  }

  async fn analyse<S: Sink>(&self, request: &AnalysisRequest, sink: &mut S) -> AnalysisResult {
    let label = request.product.label();
    let prompt = prompt::single_analysis(&label, &request.budgeted_text);

    match self.submit(request.kind, &prompt).await {
      Ok(text) => {
        info!(sku = %request.product.id, reviews = request.budgeted_text.len(), "analysis complete");
        AnalysisResult::success(prompt::format_analysis(&text))
      }
      Err(e) if e.is_fatal() => AnalysisResult::FatalFailure { detail: Error::Provider(e).to_string() },
      Err(e) => {
        warn!(sku = %request.product.id, error = %e, "analysis failed");
        sink.partial(format!("Analysis failed for \"{label}\" ({}).", request.product.id));
        AnalysisResult::PartialFailure {
          reason:        FailureReason::ProviderFailed,
          detail:        e.to_string(),
          fallback_text: analysis_failed_text(&request.product),
        }
      }
    }
  }

  async fn submit(&self, kind: PromptKind, prompt: &str) -> Result<String, ProviderError> {
    debug!(?kind, prompt_chars = prompt.chars().count(), "submitting prompt");
    self.client.submit(prompt, SYSTEM_INSTRUCTION).await
  }
}
