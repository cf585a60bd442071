//! Section-tagged markdown parsing for systems memos.
//!
//! Recognized headers (case-insensitive, optional leading `#`s, optional
//! inline content after the colon): `thesis:`, `points:`, `example:`,
//! `takeaway:`. Text before the first header is ignored.

use crate::model::payload::SystemsMemoPayload;
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:#+\s*)?(thesis|points|example|takeaway)\s*:\s*(.*)$")
        .expect("valid section header regex")
});
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s*").expect("valid list marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Thesis,
    Points,
    Example,
    Takeaway,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "thesis" => Self::Thesis,
            "points" => Self::Points,
            "example" => Self::Example,
            _ => Self::Takeaway,
        }
    }
}

/// Parsed memo plus how many section headers were recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMemo {
    pub memo: SystemsMemoPayload,
    pub headers_found: usize,
}

/// Splits a memo into its four sections.
pub fn parse_memo_sections(text: &str) -> ParsedMemo {
    let mut active: Option<Section> = None;
    let mut headers_found = 0;
    let mut thesis = Vec::new();
    let mut example = Vec::new();
    let mut takeaway = Vec::new();
    let mut points = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let content = match SECTION_HEADER_RE.captures(trimmed) {
            Some(caps) => {
                active = Some(Section::from_header(&caps[1]));
                headers_found += 1;
                caps.get(2).map_or("", |m| m.as_str()).trim().to_string()
            }
            None => trimmed.to_string(),
        };

        match active {
            None => {}
            Some(Section::Points) => {
                let point = LIST_MARKER_RE.replace(&content, "").trim().to_string();
                if !point.is_empty() {
                    points.push(point);
                }
            }
            Some(Section::Thesis) => thesis.push(content),
            Some(Section::Example) => example.push(content),
            Some(Section::Takeaway) => takeaway.push(content),
        }
    }

    ParsedMemo {
        memo: SystemsMemoPayload {
            thesis: join_section(&thesis),
            points,
            example: join_section(&example),
            takeaway: join_section(&takeaway),
        },
        headers_found,
    }
}

fn join_section(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::parse_memo_sections;

    #[test]
    fn sections_accumulate_until_next_header() {
        let parsed = parse_memo_sections(
            "preamble is ignored\n\
             Thesis: Queues hide latency\n\
             until they do.\n\
             POINTS:\n\
             - backpressure\n\
             * retries\n\
             2. timeouts\n\
             Example:\n\
             The nightly import.\n\
             ## Takeaway: Measure queue age.",
        );
        assert_eq!(parsed.headers_found, 4);
        assert_eq!(parsed.memo.thesis, "Queues hide latency\nuntil they do.");
        assert_eq!(
            parsed.memo.points,
            vec!["backpressure", "retries", "timeouts"]
        );
        assert_eq!(parsed.memo.example, "The nightly import.");
        assert_eq!(parsed.memo.takeaway, "Measure queue age.");
    }

    #[test]
    fn inline_point_content_is_kept() {
        let parsed = parse_memo_sections("points: - first\n- second");
        assert_eq!(parsed.memo.points, vec!["first", "second"]);
    }

    #[test]
    fn text_without_headers_yields_empty_memo() {
        let parsed = parse_memo_sections("just a paragraph");
        assert_eq!(parsed.headers_found, 0);
        assert!(parsed.memo.thesis.is_empty());
        assert!(parsed.memo.points.is_empty());
    }
}
