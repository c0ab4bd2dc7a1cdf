//! Entity spans produced by the linguistic pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label attached to a recognized span.
///
/// Labels the pipeline does not route are kept in `Other` so that the router
/// drops them through an explicit branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Medication,
    Treatment,
    Activity,
    Procedure,
    Vital,
    /// Any label outside the known vocabulary
    Other(String),
}

impl EntityCategory {
    /// Parse a raw recognizer label. Matching is case-insensitive.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "MEDICATION" => EntityCategory::Medication,
            "TREATMENT" => EntityCategory::Treatment,
            "ACTIVITY" => EntityCategory::Activity,
            "PROCEDURE" => EntityCategory::Procedure,
            "VITAL" => EntityCategory::Vital,
            other => EntityCategory::Other(other.to_string()),
        }
    }

    /// Returns the canonical label
    pub fn label(&self) -> &str {
        match self {
            EntityCategory::Medication => "MEDICATION",
            EntityCategory::Treatment => "TREATMENT",
            EntityCategory::Activity => "ACTIVITY",
            EntityCategory::Procedure => "PROCEDURE",
            EntityCategory::Vital => "VITAL",
            EntityCategory::Other(label) => label,
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A contiguous mention in the input text with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Text as it appears in the input
    pub text: String,
    pub category: EntityCategory,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, category: EntityCategory, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            category,
            start,
            end,
        }
    }

    /// Build a span from a byte range of `source`.
    pub fn from_range(source: &str, start: usize, end: usize, category: EntityCategory) -> Self {
        Self::new(&source[start..end], category, start, end)
    }
}

/// A word-like token with its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

fn is_joiner(c: char) -> bool {
    matches!(c, '-' | '\'' | '\u{2019}')
}

impl<'a> Token<'a> {
    /// Pieces of a compound token split at its hyphens and apostrophes.
    ///
    /// "post-walk" gives "post" and "walk"; "walk's" gives "walk" and "s".
    /// A plain token yields itself.
    pub fn parts(&self) -> Vec<Token<'a>> {
        let mut parts = Vec::new();
        let mut part_start = 0;

        for (idx, c) in self.text.char_indices() {
            if !is_joiner(c) {
                continue;
            }
            if idx > part_start {
                parts.push(self.slice(part_start, idx));
            }
            part_start = idx + c.len_utf8();
        }
        if part_start < self.text.len() {
            parts.push(self.slice(part_start, self.text.len()));
        }

        parts
    }

    fn slice(&self, from: usize, to: usize) -> Token<'a> {
        Token {
            text: &self.text[from..to],
            start: self.start + from,
            end: self.start + to,
        }
    }
}

/// Split text into alphanumeric tokens.
///
/// Hyphens and apostrophes are kept when they sit between two alphanumeric
/// characters ("x-ray", "crohn's"); every other character is a separator.
/// Digits and letters are split apart ("75kg" gives "75" and "kg").
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        if !c.is_alphanumeric() {
            i += 1;
            continue;
        }

        let numeric = c.is_numeric();
        let mut j = i + 1;
        while j < chars.len() {
            let (_, cur) = chars[j];
            if cur.is_alphanumeric() && cur.is_numeric() == numeric {
                j += 1;
                continue;
            }
            let joiner = is_joiner(cur);
            let next_is_word = chars
                .get(j + 1)
                .is_some_and(|(_, n)| n.is_alphanumeric() && !numeric && !n.is_numeric());
            if joiner && !numeric && next_is_word {
                j += 2;
                continue;
            }
            break;
        }

        let end = chars.get(j).map(|(pos, _)| *pos).unwrap_or(text.len());
        tokens.push(Token {
            text: &text[start..end],
            start,
            end,
        });
        i = j;
    }

    tokens
}
