//! Output clean-up for generated text.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"[^\w\s,.\-:;"'()\[\]{}?!]"#).expect("static regex")
});

/// Strip every character outside word characters, whitespace and basic
/// punctuation. Emoji, bullets and markdown markers disappear.
pub fn sanitize(text: &str) -> String { DISALLOWED.replace_all(text, "").into_owned() }
