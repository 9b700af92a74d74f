//! Human-readable rendering of run messages.
//!
//! Progress and warnings go to stderr; analyses go to stdout so they can
//! be piped.

use std::fmt::Write as _;

use verdict_core::message::{ProgressEvent, RunMessage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
  Stdout(String),
  Stderr(String),
}

impl Output {
  pub fn emit(self) {
    match self {
      Self::Stdout(text) => println!("{text}"),
      Self::Stderr(text) => eprintln!("{text}"),
    }
  }
}

pub fn render(message: &RunMessage) -> Output {
  match message {
    RunMessage::Status(ProgressEvent { progress, text }) => {
      Output::Stderr(format!("[{:>3.0}%] {text}", progress * 100.0))
    }
    RunMessage::ErrorPartial { message } => Output::Stderr(format!("warning: {message}")),
    RunMessage::Error { message } => Output::Stderr(format!("error: {message}")),
    RunMessage::NoReviews { name } => {
      Output::Stdout(format!("{name} has no reviews yet; analysis is not possible."))
    }
    RunMessage::Result { name, analysis, .. } => {
      Output::Stdout(format!("{}\n\n{}", heading(name, '='), analysis.trim()))
    }
    RunMessage::MultiResult { title, items, aggregate, .. } => {
      let mut out = heading(title, '=');
      for item in items {
        let _ = write!(
          out,
          "\n\n{}\n{}",
          heading(&format!("{} ({} reviews)", item.name, item.review_count), '-'),
          item.analysis.trim()
        );
      }
      let _ = write!(out, "\n\n{}\n{}", heading("Overall recommendation", '='), aggregate.trim());
      Output::Stdout(out)
    }
  }
}

fn heading(text: &str, rule: char) -> String {
  let width = text.chars().count();
  let line: String = std::iter::repeat_n(rule, width).collect();
  format!("{text}\n{line}")
}
