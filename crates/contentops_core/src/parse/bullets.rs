//! Bullet-list extraction for field notes.
//!
//! # Invariants
//! - A marker line is `-`, `*` or `•` followed by whitespace (or nothing).
//!   `**bold**` and `-->` are prose, not markers.
//! - Thematic breaks (`---`, `***`, `___`, `- - -`) are neither bullets nor
//!   sentences.
//! - Marker lines win; sentence splitting only runs when the input has no
//!   marker lines at all.
//! - Returned bullets are trimmed and never empty.

use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*•](?:\s+(.*))?$").expect("valid bullet regex"));
static THEMATIC_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").expect("valid rule regex")
});
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Bullets recovered from free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBullets {
    pub bullets: Vec<String>,
    /// `true` when no marker lines existed and sentences were split instead.
    pub inferred: bool,
}

/// Extracts marker lines, stripping the marker.
pub fn parse_bullets(text: &str) -> Vec<String> {
    content_lines(text)
        .filter_map(|line| {
            let item = BULLET_LINE_RE.captures(line)?.get(1)?.as_str().trim();
            if item.is_empty() {
                None
            } else {
                Some(item.to_string())
            }
        })
        .collect()
}

/// Returns marker bullets, or sentence fragments when there are none.
///
/// The sentence path is lossy: abbreviations and decimals split too.
pub fn normalize_bullets(text: &str) -> NormalizedBullets {
    if content_lines(text).any(|line| BULLET_LINE_RE.is_match(line)) {
        return NormalizedBullets {
            bullets: parse_bullets(text),
            inferred: false,
        };
    }

    let bullets = content_lines(text)
        .flat_map(|line| SENTENCE_END_RE.split(line))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect();

    NormalizedBullets {
        bullets,
        inferred: true,
    }
}

/// Trimmed, non-blank lines that are not thematic breaks.
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !THEMATIC_BREAK_RE.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::{normalize_bullets, parse_bullets};

    #[test]
    fn markers_are_stripped() {
        let bullets = parse_bullets("- one\n* two\n  • three\nplain\n-   \n");
        assert_eq!(bullets, vec!["one", "two", "three"]);
    }

    #[test]
    fn sentences_become_bullets_without_markers() {
        let normalized = normalize_bullets("Shipped the feature. Fixed the bug.");
        assert!(normalized.inferred);
        assert_eq!(
            normalized.bullets,
            vec!["Shipped the feature", "Fixed the bug"]
        );
    }

    #[test]
    fn sentence_split_spans_lines_and_drops_empty_fragments() {
        let normalized = normalize_bullets("Wow!! Really?\n\nYes...");
        assert_eq!(normalized.bullets, vec!["Wow", "Really", "Yes"]);
    }

    #[test]
    fn any_marker_line_disables_fallback() {
        let normalized = normalize_bullets("Intro sentence. Another.\n- only bullet");
        assert!(!normalized.inferred);
        assert_eq!(normalized.bullets, vec!["only bullet"]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(normalize_bullets("  \n ").bullets.is_empty());
    }

    #[test]
    fn thematic_break_is_not_a_marker_line() {
        let normalized = normalize_bullets("Shipped it. Fixed it. Tested it.\n---");
        assert!(normalized.inferred);
        assert_eq!(normalized.bullets, vec!["Shipped it", "Fixed it", "Tested it"]);

        let bullets = parse_bullets("- one\n* * *\n- two\n___");
        assert_eq!(bullets, vec!["one", "two"]);
    }

    #[test]
    fn bold_text_is_prose_not_a_bullet() {
        let normalized = normalize_bullets("**Bold** note. Next. Third.");
        assert!(normalized.inferred);
        assert_eq!(normalized.bullets, vec!["**Bold** note", "Next", "Third"]);
    }

    #[test]
    fn marker_needs_trailing_whitespace() {
        assert_eq!(parse_bullets("-->arrow\n*emphasis*\n-\tkept"), vec!["kept"]);
    }
}
