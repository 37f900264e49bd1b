//! Numbered-line tokenizer for model text reports
//!
//! Splits a report such as `2) Medication Names: Aspirin, Amoxicillin` into
//! `(ordinal, label, value)` triples. No semantic interpretation happens here.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// `N) Label: value`, with optional whitespace around each part
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\)\s*(.+?)\s*:\s*(\S.*?)\s*$").unwrap());

/// A single non-blank line of a text report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineRecord {
    /// Line following the numbered-field convention
    Field {
        ordinal: String,
        label: String,
        value: String,
    },
    /// Any other line, kept verbatim
    Raw { line: String },
}

impl LineRecord {
    /// Label and value when this is a structured field
    pub fn as_field(&self) -> Option<(&str, &str)> {
        match self {
            LineRecord::Field { label, value, .. } => Some((label, value)),
            LineRecord::Raw { .. } => None,
        }
    }
}

/// Tokenize a text report into line records, preserving line order.
///
/// Blank lines are dropped. Lines that do not follow the numbered convention
/// are returned as [`LineRecord::Raw`]; parsing never fails.
pub fn parse(text: &str) -> Vec<LineRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> LineRecord {
    match NUMBERED_LINE.captures(line) {
        Some(caps) => LineRecord::Field {
            ordinal: caps[1].to_string(),
            label: caps[2].to_string(),
            value: caps[3].to_string(),
        },
        None => LineRecord::Raw {
            line: line.to_string(),
        },
    }
}
