//! Run scenarios against an in-memory catalog and a scripted analysis
//! client.

use std::{
  collections::HashMap,
  io,
  sync::{Arc, Mutex},
  time::Duration,
};

use tokio::sync::mpsc;
use verdict_core::{
  ProductId, ProviderError,
  catalog::Catalog,
  client::AnalysisClient,
  message::{ProgressEvent, RunMessage},
  product::ProductInfo,
  review::{Review, ReviewBatch},
};

use crate::{
  Orchestrator, PipelineSettings,
  orchestrator::{COMPARISON_FAILED_TEXT, analysis_failed_text},
  spawn_multiple,
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

fn pid(raw: &str) -> ProductId { ProductId::parse(raw).unwrap() }

#[derive(Default, Clone)]
struct FakeCatalog {
  products: HashMap<String, ProductInfo>,
  /// Keyed by root id. Missing roots answer with an empty batch.
  reviews:  HashMap<String, Result<Vec<Review>, String>>,
  /// Artificial latency per root, to scramble completion order.
  delays:   HashMap<String, Duration>,
}

impl FakeCatalog {
  fn with_product(mut self, id: &str, root: &str, name: &str, reviews: Vec<Review>) -> Self {
    self.products.insert(id.into(), ProductInfo {
      id:              pid(id),
      root_id:         pid(root),
      display_name:    name.into(),
      brand:           None,
      variation_label: None,
    });
    self.reviews.insert(root.into(), Ok(reviews));
    self
  }

  fn with_broken_reviews(mut self, root: &str) -> Self {
    self.reviews.insert(root.into(), Err("connection reset".into()));
    self
  }

  fn with_delay(mut self, root: &str, delay: Duration) -> Self {
    self.delays.insert(root.into(), delay);
    self
  }
}

impl Catalog for FakeCatalog {
  type Error = io::Error;

  async fn resolve<'a>(&'a self, id: &'a ProductId) -> ProductInfo {
    self
      .products
      .get(id.as_str())
      .cloned()
      .unwrap_or_else(|| ProductInfo::placeholder(id.clone()))
  }

  async fn fetch_reviews<'a>(&'a self, root: &'a ProductId) -> Result<ReviewBatch, io::Error> {
    if let Some(delay) = self.delays.get(root.as_str()) {
      tokio::time::sleep(*delay).await;
    }
    match self.reviews.get(root.as_str()) {
      Some(Ok(reviews)) => Ok(ReviewBatch::new(reviews.clone())),
      Some(Err(e)) => Err(io::Error::other(e.clone())),
      None => Ok(ReviewBatch::default()),
    }
  }
}

type Rule = fn(&str) -> Result<String, ProviderError>;

/// Records every prompt and answers according to `rule`.
#[derive(Clone)]
struct FakeClient {
  prompts: Arc<Mutex<Vec<String>>>,
  rule:    Rule,
}

impl FakeClient {
  fn new(rule: Rule) -> Self { Self { prompts: Arc::default(), rule } }

  fn prompts(&self) -> Vec<String> { self.prompts.lock().unwrap().clone() }
}

impl AnalysisClient for FakeClient {
  async fn submit<'a>(&'a self, prompt: &'a str, system: &'a str) -> Result<String, ProviderError> {
    assert!(!system.is_empty());
    self.prompts.lock().unwrap().push(prompt.to_string());
    (self.rule)(prompt)
  }
}

fn well_behaved(prompt: &str) -> Result<String, ProviderError> {
  if prompt.starts_with("Compare") {
    Ok("Overall pick:\nLamp A".into())
  } else {
    Ok("Pros:\nbright\n\nCons:\nnone\n\nRecommendation:\nbuy".into())
  }
}

fn overloaded(_: &str) -> Result<String, ProviderError> {
  Err(ProviderError::Exhausted { attempts: 4, last: "provider returned 503: busy".into() })
}

fn keyless(_: &str) -> Result<String, ProviderError> { Err(ProviderError::MissingCredentials) }

fn comparison_fails(prompt: &str) -> Result<String, ProviderError> {
  if prompt.starts_with("Compare") { overloaded(prompt) } else { well_behaved(prompt) }
}

fn reviews(owner: &str, n: usize) -> Vec<Review> {
  (0..n)
    .map(|i| Review {
      text:            format!("review {i} of {owner}"),
      pros:            "bright".into(),
      cons:            String::new(),
      owner_variation: Some(owner.into()),
    })
    .collect()
}

fn two_lamps() -> FakeCatalog {
  FakeCatalog::default()
    .with_product("7000001", "7000001", "Lamp A", reviews("7000001", 10))
    .with_product("7000002", "7000002", "Lamp B", reviews("7000002", 8))
}

// ─── Harness ─────────────────────────────────────────────────────────────────

async fn single(
  catalog: FakeCatalog,
  client: FakeClient,
  settings: PipelineSettings,
  input: &str,
) -> Vec<RunMessage> {
  let (tx, mut rx) = mpsc::unbounded_channel();
  Orchestrator::new(catalog, client, settings).run_single(input, tx).await;
  let mut out = Vec::new();
  while let Some(m) = rx.recv().await {
    out.push(m);
  }
  out
}

async fn multiple(
  catalog: FakeCatalog,
  client: FakeClient,
  settings: PipelineSettings,
  inputs: &[&str],
) -> Vec<RunMessage> {
  let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
  let (tx, mut rx) = mpsc::unbounded_channel();
  Orchestrator::new(catalog, client, settings).run_multiple(&inputs, tx).await;
  let mut out = Vec::new();
  while let Some(m) = rx.recv().await {
    out.push(m);
  }
  out
}

fn partials(messages: &[RunMessage]) -> Vec<&str> {
  messages
    .iter()
    .filter_map(|m| match m {
      RunMessage::ErrorPartial { message } => Some(message.as_str()),
      _ => None,
    })
    .collect()
}

fn progress(messages: &[RunMessage]) -> Vec<f32> {
  messages
    .iter()
    .filter_map(|m| match m {
      RunMessage::Status(ProgressEvent { progress, .. }) => Some(*progress),
      _ => None,
    })
    .collect()
}

/// Exactly one terminal message, and it is the last one.
fn terminal(messages: &[RunMessage]) -> &RunMessage {
  let last = messages.last().expect("no messages");
  assert!(last.is_terminal(), "last message is not terminal: {last:?}");
  assert_eq!(messages.iter().filter(|m| m.is_terminal()).count(), 1);
  last
}

// ─── Single-product runs ─────────────────────────────────────────────────────

#[tokio::test]
async fn empty_feedbacks_end_in_no_reviews_without_analysis() {
  let client = FakeClient::new(well_behaved);
  let messages =
    single(FakeCatalog::default(), client.clone(), PipelineSettings::default(), "7654321").await;

  assert_eq!(terminal(&messages), &RunMessage::NoReviews { name: "Product 7654321".into() });
  assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn successful_single_run_delivers_the_formatted_analysis() {
  let catalog =
    FakeCatalog::default().with_product("1111111", "9999999", "Lamp", reviews("1111111", 4));
  let client = FakeClient::new(|_| Ok("Bright and warm.\n\nWorth buying.".into()));
  let messages = single(
    catalog,
    client.clone(),
    PipelineSettings::default(),
    "https://www.wildberries.ru/catalog/1111111/detail.aspx?targetUrl=GP",
  )
  .await;

  match terminal(&messages) {
    RunMessage::Result { name, analysis, .. } => {
      assert_eq!(name, "Lamp");
      assert!(analysis.starts_with("Pros:\nBright and warm."), "{analysis}");
      assert!(analysis.ends_with("Recommendation:\nWorth buying."), "{analysis}");
    }
    other => panic!("unexpected {other:?}"),
  }
  let prompts = client.prompts();
  assert_eq!(prompts.len(), 1);
  assert!(prompts[0].contains("Review 4: review 3 of 1111111\nPros: bright"));
  assert_eq!(progress(&messages).last(), Some(&1.0));
}

#[tokio::test]
async fn strict_filtering_drops_sibling_variation_reviews() {
  let catalog =
    FakeCatalog::default().with_product("1111111", "9999999", "Lamp", reviews("2222222", 5));

  let messages =
    single(catalog.clone(), FakeClient::new(well_behaved), PipelineSettings::default(), "1111111")
      .await;
  assert!(matches!(terminal(&messages), RunMessage::NoReviews { .. }));

  let settings = PipelineSettings { strict_variation: false, ..PipelineSettings::default() };
  let messages = single(catalog, FakeClient::new(well_behaved), settings, "1111111").await;
  assert!(matches!(terminal(&messages), RunMessage::Result { .. }));
}

#[tokio::test]
async fn unreachable_reviews_count_as_none() {
  let catalog = FakeCatalog::default()
    .with_product("1111111", "1111111", "Lamp", vec![])
    .with_broken_reviews("1111111");
  let messages =
    single(catalog, FakeClient::new(well_behaved), PipelineSettings::default(), "1111111").await;
  assert_eq!(partials(&messages), [
    "Reviews for \"Lamp\" could not be retrieved: connection reset"
  ]);
  assert_eq!(terminal(&messages), &RunMessage::NoReviews { name: "Lamp".into() });
}

#[tokio::test]
async fn unreachable_reviews_are_reported_for_one_comparison_item() {
  let catalog = two_lamps()
    .with_product("7000003", "7000003", "Lamp C", vec![])
    .with_broken_reviews("7000003");
  let client = FakeClient::new(well_behaved);
  let messages = multiple(catalog, client.clone(), PipelineSettings::default(), &[
    "7000001", "7000002", "7000003",
  ])
  .await;

  assert_eq!(partials(&messages), [
    "Reviews for \"Lamp C\" could not be retrieved: connection reset"
  ]);
  match terminal(&messages) {
    RunMessage::MultiResult { items, .. } => {
      assert_eq!(items.len(), 3);
      assert_eq!(items[2].review_count, 0);
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(client.prompts().len(), 3);
}

#[tokio::test]
async fn invalid_input_fails_before_any_lookup() {
  let client = FakeClient::new(well_behaved);
  let messages =
    single(FakeCatalog::default(), client.clone(), PipelineSettings::default(), "lamp").await;

  match terminal(&messages) {
    RunMessage::Error { message } => {
      assert!(message.starts_with("invalid product identifier"), "{message}")
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(messages.len(), 2);
  assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn provider_failure_yields_a_placeholder_result() {
  let catalog =
    FakeCatalog::default().with_product("1111111", "1111111", "Lamp", reviews("1111111", 3));
  let messages =
    single(catalog.clone(), FakeClient::new(overloaded), PipelineSettings::default(), "1111111")
      .await;

  assert_eq!(partials(&messages), ["Analysis failed for \"Lamp\" (1111111)."]);
  let expected = analysis_failed_text(&catalog.products["1111111"]);
  match terminal(&messages) {
    RunMessage::Result { analysis, .. } => assert_eq!(analysis, &expected),
    other => panic!("unexpected {other:?}"),
  }
}

#[tokio::test]
async fn missing_credentials_abort_the_run() {
  let catalog =
    FakeCatalog::default().with_product("1111111", "1111111", "Lamp", reviews("1111111", 3));
  let messages =
    single(catalog, FakeClient::new(keyless), PipelineSettings::default(), "1111111").await;
  match terminal(&messages) {
    RunMessage::Error { message } => assert!(message.contains("no API key"), "{message}"),
    other => panic!("unexpected {other:?}"),
  }
  assert!(partials(&messages).is_empty());
}

// ─── Comparison runs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn one_usable_product_of_two_is_below_threshold() {
  let client = FakeClient::new(well_behaved);
  let messages =
    multiple(two_lamps(), client.clone(), PipelineSettings::default(), &["7000001", "lamp"]).await;

  match terminal(&messages) {
    RunMessage::Error { message } => {
      assert_eq!(message, "retrieved data for only 1 of 2 products; comparison is not possible")
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(partials(&messages).len(), 1);
  assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn no_usable_products_is_fatal() {
  let messages =
    multiple(two_lamps(), FakeClient::new(well_behaved), PipelineSettings::default(), &[
      "lamp", "chair",
    ])
    .await;
  match terminal(&messages) {
    RunMessage::Error { message } => assert!(message.contains("any of the requested"), "{message}"),
    other => panic!("unexpected {other:?}"),
  }
}

#[tokio::test]
async fn invalid_item_is_skipped_and_the_rest_compared() {
  let client = FakeClient::new(well_behaved);
  let messages = multiple(two_lamps(), client.clone(), PipelineSettings::default(), &[
    "7000001",
    "not a product",
    "https://www.wildberries.ru/catalog/7000002/detail.aspx",
  ])
  .await;

  let skipped = partials(&messages);
  assert_eq!(skipped.len(), 1);
  assert!(skipped[0].starts_with("Skipping \"not a product\""), "{}", skipped[0]);

  match terminal(&messages) {
    RunMessage::MultiResult { title, items, aggregate, .. } => {
      assert_eq!(title, "Comparison: Lamp A, Lamp B");
      let ids: Vec<_> = items.iter().map(|i| i.product_id.as_str()).collect();
      assert_eq!(ids, ["7000001", "7000002"]);
      assert_eq!(items[1].review_count, 8);
      assert_eq!(aggregate, "Overall pick:\nLamp A");
    }
    other => panic!("unexpected {other:?}"),
  }
  let prompts = client.prompts();
  assert_eq!(prompts.len(), 3);
  assert!(prompts[2].starts_with("Compare the following 2 products"));
}

#[tokio::test]
async fn repeated_product_is_compared_once() {
  let client = FakeClient::new(well_behaved);
  let messages = multiple(two_lamps(), client.clone(), PipelineSettings::default(), &[
    "7000001",
    "https://www.wildberries.ru/catalog/7000001/detail.aspx",
    "7000002",
  ])
  .await;

  let skipped = partials(&messages);
  assert_eq!(skipped.len(), 1);
  assert!(skipped[0].contains("already being compared"), "{}", skipped[0]);
  match terminal(&messages) {
    RunMessage::MultiResult { items, .. } => {
      let ids: Vec<_> = items.iter().map(|i| i.product_id.as_str()).collect();
      assert_eq!(ids, ["7000001", "7000002"]);
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(client.prompts().len(), 3);
}

#[tokio::test]
async fn product_compared_with_itself_is_below_threshold() {
  let client = FakeClient::new(well_behaved);
  let settings = PipelineSettings { concurrency: 4, ..PipelineSettings::default() };
  let messages = multiple(two_lamps(), client.clone(), settings, &["7000001", "7000001"]).await;

  assert_eq!(partials(&messages).len(), 1);
  match terminal(&messages) {
    RunMessage::Error { message } => {
      assert_eq!(message, "retrieved data for only 1 of 2 products; comparison is not possible")
    }
    other => panic!("unexpected {other:?}"),
  }
  assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn low_review_product_is_caveated_in_the_comparison() {
  let catalog = FakeCatalog::default()
    .with_product("7000001", "7000001", "Lamp A", reviews("7000001", 12))
    .with_product("7000002", "7000002", "Lamp B", reviews("7000002", 2));
  let client = FakeClient::new(well_behaved);
  let messages =
    multiple(catalog, client.clone(), PipelineSettings::default(), &["7000001", "7000002"]).await;
  assert!(matches!(terminal(&messages), RunMessage::MultiResult { .. }));

  let comparison = client.prompts().pop().unwrap();
  assert!(comparison.contains("PRODUCT 2: \"Lamp B\" (2 reviews) [LOW DATA]"));
  assert!(comparison.contains("\"Lamp B\" has only 2 reviews"));
  assert!(comparison.contains("do not name it the overall pick"));
  assert!(!comparison.contains("\"Lamp A\" has only"));
}

#[tokio::test]
async fn fewer_than_two_successful_analyses_abort_before_comparing() {
  let catalog = FakeCatalog::default()
    .with_product("7000001", "7000001", "Lamp A", reviews("7000001", 12))
    .with_product("7000002", "7000002", "Lamp B", vec![]);
  let client = FakeClient::new(well_behaved);
  let messages =
    multiple(catalog, client.clone(), PipelineSettings::default(), &["7000001", "7000002"]).await;

  match terminal(&messages) {
    RunMessage::Error { message } => {
      assert!(message.starts_with("insufficient successful analyses"), "{message}")
    }
    other => panic!("unexpected {other:?}"),
  }
  assert_eq!(client.prompts().len(), 1);
}

#[tokio::test]
async fn failed_comparison_still_delivers_individual_results() {
  let messages = multiple(
    two_lamps(),
    FakeClient::new(comparison_fails),
    PipelineSettings::default(),
    &["7000001", "7000002"],
  )
  .await;

  assert_eq!(partials(&messages).len(), 1);
  match terminal(&messages) {
    RunMessage::MultiResult { items, aggregate, .. } => {
      assert_eq!(aggregate, COMPARISON_FAILED_TEXT);
      assert!(items.iter().all(|i| i.analysis.starts_with("Pros:")));
    }
    other => panic!("unexpected {other:?}"),
  }
}

#[tokio::test]
async fn review_cap_limits_counted_reviews() {
  let settings = PipelineSettings { review_cap: 4, ..PipelineSettings::default() };
  let messages =
    multiple(two_lamps(), FakeClient::new(well_behaved), settings, &["7000001", "7000002"]).await;
  match terminal(&messages) {
    RunMessage::MultiResult { items, .. } => {
      assert!(items.iter().all(|i| i.review_count == 4));
    }
    other => panic!("unexpected {other:?}"),
  }
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one() {
  let messages = multiple(
    two_lamps(),
    FakeClient::new(well_behaved),
    PipelineSettings::default(),
    &["7000001", "lamp", "7000002"],
  )
  .await;

  let seen = progress(&messages);
  assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
  assert_eq!(seen.first(), Some(&0.1));
  assert_eq!(seen.last(), Some(&1.0));
  terminal(&messages);
}

#[tokio::test]
async fn concurrent_items_report_in_request_order() {
  let catalog = two_lamps()
    .with_product("7000003", "7000003", "Lamp C", reviews("7000003", 6))
    .with_delay("7000001", Duration::from_millis(80));
  let inputs = ["7000001", "bogus", "7000002", "7000003"];

  let sequential =
    multiple(catalog.clone(), FakeClient::new(well_behaved), PipelineSettings::default(), &inputs)
      .await;
  let settings = PipelineSettings { concurrency: 3, ..PipelineSettings::default() };
  let concurrent = multiple(catalog, FakeClient::new(well_behaved), settings, &inputs).await;

  let body = |m: &[RunMessage]| m[..m.len() - 1].to_vec();
  assert_eq!(body(&sequential), body(&concurrent));
  match (terminal(&sequential), terminal(&concurrent)) {
    (
      RunMessage::MultiResult { title: a, items: ia, .. },
      RunMessage::MultiResult { title: b, items: ib, .. },
    ) => {
      assert_eq!(a, b);
      assert_eq!(ia, ib);
    }
    other => panic!("unexpected {other:?}"),
  }
}

#[tokio::test]
async fn spawned_run_streams_to_its_handle() {
  let mut handle = spawn_multiple(
    two_lamps(),
    FakeClient::new(well_behaved),
    PipelineSettings::default(),
    vec!["7000001".into(), "7000002".into()],
  );
  assert_eq!(handle.id.get_version_num(), 4);

  let mut messages = Vec::new();
  while let Some(m) = handle.next().await {
    messages.push(m);
  }
  handle.worker.await.unwrap();
  assert!(matches!(terminal(&messages), RunMessage::MultiResult { .. }));
}

#[tokio::test]
async fn handle_can_be_polled_without_blocking() {
  let mut handle = spawn_multiple(
    two_lamps(),
    FakeClient::new(well_behaved),
    PipelineSettings::default(),
    vec!["7000001".into(), "7000002".into()],
  );

  let mut messages = Vec::new();
  loop {
    match handle.try_next() {
      Some(m) => {
        let done = m.is_terminal();
        messages.push(m);
        if done {
          break;
        }
      }
      None => tokio::task::yield_now().await,
    }
  }
  (&mut handle.worker).await.unwrap();
  assert!(handle.try_next().is_none());
  assert!(matches!(terminal(&messages), RunMessage::MultiResult { .. }));
}

#[test]
fn multi_result_serialises_for_history() {
  let message = RunMessage::MultiResult {
    title:        "Comparison: Lamp A, Lamp B".into(),
    items:        vec![],
    aggregate:    "Overall pick:\nLamp A".into(),
    completed_at: chrono::Utc::now(),
  };
  let json = serde_json::to_value(&message).unwrap();
  assert_eq!(json["type"], "multi_result");
  assert_eq!(json["title"], "Comparison: Lamp A, Lamp B");
}
