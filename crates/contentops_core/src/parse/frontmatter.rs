//! YAML-like frontmatter parsing for markdown imports.
//!
//! Accepted shape:
//!
//! ```text
//! ---
//! title: "Example"
//! primary_keyword: ops
//! related_keywords: [ops, ai]
//! internal_links:
//!   - /blog/one
//!   - /blog/two
//! ---
//! Markdown body
//! ```
//!
//! # Invariants
//! - The loose parser never fails; missing delimiters yield no fields and the
//!   whole input as body.
//! - The strict parser fails when the opening or closing delimiter is absent.
//! - Keys are lowercased. A `- value` line appends to the most recent key and
//!   turns that key into a list on first continuation.
//! - A value opening with `[` but lacking `]` stays a scalar; the key is
//!   recorded in `malformed_lists` so callers can surface it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DELIMITER: &str = "---";

static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_\-]*)\s*:\s*(.*)$").expect("valid key/value regex")
});

/// Value of one frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    /// Returns the value as text; lists are joined with `, `.
    pub fn to_text(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(values) => values.join(", "),
        }
    }

    /// Returns the value as a list; a non-empty scalar is a single item.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Scalar(value) if value.is_empty() => Vec::new(),
            Self::Scalar(value) => vec![value.clone()],
            Self::List(values) => values.clone(),
        }
    }
}

/// Parsed frontmatter block plus the remaining markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, FrontmatterValue>,
    body: String,
    has_frontmatter: bool,
    malformed_lists: Vec<String>,
}

impl Frontmatter {
    /// Whether a complete `---` block was found.
    pub fn has_frontmatter(&self) -> bool {
        self.has_frontmatter
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.fields.get(key.to_ascii_lowercase().as_str())
    }

    /// Returns the key as text, or `""` when absent.
    pub fn get_text(&self, key: &str) -> String {
        self.get(key)
            .map(FrontmatterValue::to_text)
            .unwrap_or_default()
    }

    /// Returns the key as a list, or an empty list when absent.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(FrontmatterValue::to_list)
            .unwrap_or_default()
    }

    /// Keys whose inline list syntax was malformed and fell back to scalar.
    pub fn malformed_lists(&self) -> &[String] {
        &self.malformed_lists
    }
}

/// Strict-mode frontmatter failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    MissingOpeningDelimiter,
    MissingClosingDelimiter,
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOpeningDelimiter => {
                write!(f, "frontmatter must start with a `---` line")
            }
            Self::MissingClosingDelimiter => {
                write!(f, "frontmatter block is not closed by a `---` line")
            }
        }
    }
}

impl Error for FrontmatterError {}

/// Parses frontmatter without ever failing.
pub fn parse_frontmatter_loose(input: &str) -> Frontmatter {
    match parse_frontmatter_strict(input) {
        Ok(frontmatter) => frontmatter,
        Err(_) => Frontmatter {
            body: input.trim().to_string(),
            ..Frontmatter::default()
        },
    }
}

/// Parses frontmatter, failing when either delimiter is missing.
pub fn parse_frontmatter_strict(input: &str) -> Result<Frontmatter, FrontmatterError> {
    let content = input.trim_start_matches('\u{feff}').trim_start();
    let mut lines = content.lines();

    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {}
        _ => return Err(FrontmatterError::MissingOpeningDelimiter),
    }

    let mut header_lines = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.starts_with(DELIMITER) {
            closed = true;
            break;
        }
        header_lines.push(line);
    }
    if !closed {
        return Err(FrontmatterError::MissingClosingDelimiter);
    }

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    let mut frontmatter = Frontmatter {
        body,
        has_frontmatter: true,
        ..Frontmatter::default()
    };
    parse_header_lines(&header_lines, &mut frontmatter);
    Ok(frontmatter)
}

fn parse_header_lines(lines: &[&str], frontmatter: &mut Frontmatter) {
    let mut last_key: Option<String> = None;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = continuation_item(trimmed) {
            let Some(key) = last_key.as_ref() else {
                continue;
            };
            let item = unquote(item);
            let entry = frontmatter
                .fields
                .entry(key.clone())
                .or_insert_with(|| FrontmatterValue::List(Vec::new()));
            if let FrontmatterValue::Scalar(existing) = entry {
                let mut values = Vec::new();
                if !existing.is_empty() {
                    values.push(std::mem::take(existing));
                }
                *entry = FrontmatterValue::List(values);
            }
            if let FrontmatterValue::List(values) = entry {
                if !item.is_empty() {
                    values.push(item);
                }
            }
            continue;
        }

        if let Some(caps) = KEY_VALUE_RE.captures(trimmed) {
            let key = caps[1].to_ascii_lowercase();
            let raw_value = caps[2].trim();
            let value = match parse_inline_list(raw_value) {
                InlineValue::List(values) => FrontmatterValue::List(values),
                InlineValue::Malformed => {
                    frontmatter.malformed_lists.push(key.clone());
                    FrontmatterValue::Scalar(raw_value.to_string())
                }
                InlineValue::Scalar => FrontmatterValue::Scalar(unquote(raw_value)),
            };
            frontmatter.fields.insert(key.clone(), value);
            last_key = Some(key);
        }
    }
}

fn continuation_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ").map(str::trim)
}

enum InlineValue {
    Scalar,
    List(Vec<String>),
    Malformed,
}

fn parse_inline_list(value: &str) -> InlineValue {
    if !value.starts_with('[') {
        return InlineValue::Scalar;
    }
    let Some(inner) = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return InlineValue::Malformed;
    };

    let items = inner
        .split(',')
        .map(unquote)
        .filter(|item| !item.is_empty())
        .collect();
    InlineValue::List(items)
}

fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        parse_frontmatter_loose, parse_frontmatter_strict, FrontmatterError, FrontmatterValue,
    };

    #[test]
    fn dash_continuation_builds_list() {
        let parsed = parse_frontmatter_strict(
            "---\ntitle: \"Example\"\nrelated_keywords:\n  - ops\n  - ai\n---\nBody text",
        )
        .unwrap();
        assert!(parsed.has_frontmatter());
        assert_eq!(parsed.get_text("title"), "Example");
        assert_eq!(parsed.get_list("related_keywords"), vec!["ops", "ai"]);
        assert_eq!(parsed.body(), "Body text");
    }

    #[test]
    fn bracket_value_is_inline_list() {
        let parsed = parse_frontmatter_loose("---\nSource_Links: [a, 'b', ]\n---\n");
        assert_eq!(
            parsed.get("source_links"),
            Some(&FrontmatterValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(parsed.body(), "");
    }

    #[test]
    fn unbalanced_bracket_falls_back_to_scalar_and_is_recorded() {
        let parsed = parse_frontmatter_loose("---\nrelated_keywords: [ops, ai\n---\nBody");
        assert_eq!(
            parsed.get("related_keywords"),
            Some(&FrontmatterValue::Scalar("[ops, ai".to_string()))
        );
        assert_eq!(parsed.malformed_lists(), ["related_keywords".to_string()]);
    }

    #[test]
    fn continuation_after_scalar_keeps_scalar_as_first_item() {
        let parsed = parse_frontmatter_loose("---\ntags: one\n- two\n---\n");
        assert_eq!(parsed.get_list("tags"), vec!["one", "two"]);
    }

    #[test]
    fn continuation_without_key_is_ignored() {
        let parsed = parse_frontmatter_loose("---\n- orphan\ntitle: T\n---\nBody");
        assert_eq!(parsed.get_text("title"), "T");
        assert!(parsed.get("orphan").is_none());
    }

    #[test]
    fn loose_without_delimiters_returns_body_only() {
        let parsed = parse_frontmatter_loose("Just markdown\n\nMore");
        assert!(!parsed.has_frontmatter());
        assert_eq!(parsed.body(), "Just markdown\n\nMore");
        assert_eq!(parsed.get_text("title"), "");
    }

    #[test]
    fn loose_with_unclosed_block_returns_whole_input_as_body() {
        let parsed = parse_frontmatter_loose("---\ntitle: T\nbody never closed");
        assert!(!parsed.has_frontmatter());
        assert!(parsed.body().starts_with("---"));
    }

    #[test]
    fn strict_reports_missing_delimiters() {
        assert_eq!(
            parse_frontmatter_strict("title: T\n---\n").unwrap_err(),
            FrontmatterError::MissingOpeningDelimiter
        );
        assert_eq!(
            parse_frontmatter_strict("---\ntitle: T\n").unwrap_err(),
            FrontmatterError::MissingClosingDelimiter
        );
    }
}
