//! Heading ids and table-of-contents entries.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static CUSTOM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[#([^\]]+)\]\s*$").expect("valid custom heading id regex"));

/// One table-of-contents entry, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub title: String,
    /// Heading level, `1..=6`.
    pub depth: u8,
    /// Fragment link, `#<id>`.
    pub url: String,
}

/// Splits a trailing `[#custom-id]` marker off heading text.
///
/// Returns the text with the marker and its surrounding whitespace removed,
/// plus the raw id. `None` when the text carries no marker.
pub fn split_custom_id(text: &str) -> Option<(&str, &str)> {
    let captures = CUSTOM_ID_RE.captures(text)?;
    let marker = captures.get(0)?;
    let id = captures.get(1)?;
    Some((text[..marker.start()].trim_end(), id.as_str()))
}

/// GitHub-compatible heading slug generator.
///
/// Repeated slugs within one document get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a document-unique slug for `value` and records it.
    pub fn slug(&mut self, value: &str) -> String {
        let base = slugify(value);
        let mut candidate = base.clone();
        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }
}

/// Lowercases, drops punctuation, and turns each space into `-`.
///
/// Letters and digits of any script survive, as do `-` and `_`.
pub fn slugify(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            '-' | '_' => Some(ch),
            ch if ch.is_alphanumeric() => Some(ch),
            _ => None,
        })
        .collect()
}
