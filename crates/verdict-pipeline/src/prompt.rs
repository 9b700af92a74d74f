//! Prompt templates and analysis post-formatting.
//!
//! The single-product prompt fixes a pros / cons / recommendation layout
//! that [`format_analysis`] relies on. The comparison prompt asks only for
//! an aggregate verdict and flags every product with too few reviews.

use std::fmt::Write as _;

/// System message sent with every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional product review analyst. Your answers \
                                      are structured, informative and follow the requested format \
                                      exactly, in plain text without emoji.";

pub const PROS_HEADING: &str = "Pros:";
pub const CONS_HEADING: &str = "Cons:";
pub const RECOMMENDATION_HEADING: &str = "Recommendation:";

/// Marker placed on comparison items that lack enough reviews.
pub const LOW_DATA_MARKER: &str = "LOW DATA";

/// Build the single-product analysis prompt from already budgeted reviews.
pub fn single_analysis(product_name: &str, reviews: &[String]) -> String {
  let mut listed = String::new();
  for (n, review) in reviews.iter().enumerate() {
    let _ = writeln!(listed, "Review {}: {review}", n + 1);
  }

  format!(
    "Analyze the following customer reviews of the product \"{product_name}\".

REVIEWS:
{listed}
Your answer must follow exactly this format and must not contain emoji or any other symbols:

{PROS_HEADING}
[list the main strengths of the product, based on the reviews]

{CONS_HEADING}
[list the main weaknesses of the product, based on the reviews. If there are none, write \
     \"Judging by the reviews, no obvious drawbacks were found\"]

{RECOMMENDATION_HEADING}
[say whether the product is worth buying based on the reviews, and which kinds of buyers it \
     suits best]

Requirements:
1. Do not use emoji
2. Use plain text only, without formatting
3. Follow the structure above strictly
4. Base the analysis only on the reviews provided
"
  )
}

/// One product as presented to the comparison prompt.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonItem<'a> {
  pub name:         &'a str,
  pub analysis:     &'a str,
  pub review_count: usize,
}

/// Build the comparison prompt.
///
/// Items with fewer than `low_review_threshold` reviews are marked
/// [`LOW_DATA_MARKER`] and listed in a caveat section that forbids naming
/// them the overall pick.
pub fn comparison(items: &[ComparisonItem<'_>], low_review_threshold: usize) -> String {
  let low: Vec<&ComparisonItem<'_>> = items
    .iter()
    .filter(|item| item.review_count < low_review_threshold)
    .collect();

  let mut out = format!(
    "Compare the following {} products using their individual review analyses. Give only an \
     overall recommendation; do not restate each product's pros and cons.\n\n",
    items.len()
  );

  for (n, item) in items.iter().enumerate() {
    let _ = write!(out, "PRODUCT {}: \"{}\" ({} reviews)", n + 1, item.name, item.review_count);
    if item.review_count < low_review_threshold {
      let _ = write!(out, " [{LOW_DATA_MARKER}]");
    }
    let _ = writeln!(out, "\n{}\n", item.analysis.trim());
  }

  out.push_str("DATA SUFFICIENCY:\n");
  if low.is_empty() {
    out.push_str("All products have enough reviews for a reliable comparison.\n");
  } else {
    for item in &low {
      let _ = writeln!(
        out,
        "- {LOW_DATA_MARKER}: \"{}\" has only {} reviews (fewer than {low_review_threshold}). \
         State explicitly that its assessment rests on too little data, and do not name it the \
         overall pick.",
        item.name, item.review_count
      );
    }
    if low.len() == items.len() {
      out.push_str(
        "- No product has enough reviews; say that no reliable overall pick is possible.\n",
      );
    }
  }

  out.push_str(
    "
Your answer must follow exactly this format, in plain text without emoji:

Overall pick:
[the product you recommend overall and the main reason]

Trade-offs:
[what a buyer gains and gives up with each product]

Who should buy what:
[which product suits which kind of buyer]
",
  );
  out
}

/// Force a single-product analysis into the pros / cons / recommendation
/// layout when the model ignored it.
///
/// Text already containing [`PROS_HEADING`] is returned unchanged.
/// Otherwise the first paragraph becomes the pros, the cons are reported
/// as missing and the last paragraph becomes the recommendation.
pub fn format_analysis(raw: &str) -> String {
  if raw.contains(PROS_HEADING) {
    return raw.to_string();
  }

  let parts: Vec<&str> = raw.split("\n\n").collect();
  let mut out = format!("{PROS_HEADING}\n");
  if let Some(first) = parts.first() {
    out.push_str(first);
    out.push_str("\n\n");
  }
  let _ = write!(out, "{CONS_HEADING}\nNo information about drawbacks was provided\n\n");
  out.push_str(RECOMMENDATION_HEADING);
  out.push('\n');
  if parts.len() > 1
    && let Some(last) = parts.last()
  {
    out.push_str(last);
  }
  out
}
