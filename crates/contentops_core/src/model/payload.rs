//! Kind-specific structured payloads.
//!
//! # Responsibility
//! - Define one typed payload per `ContentKind`.
//! - Provide the tagged sum type shared by persistence and validators.
//! - Render display bodies and topic/slug seeds from payloads.
//!
//! # Invariants
//! - `StructuredPayload::kind()` is exhaustive; each variant maps to exactly
//!   one `ContentKind`.
//! - Missing JSON fields deserialize to empty defaults; shape errors (wrong
//!   JSON types) are the only deserialization failures.

use crate::model::kind::ContentKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldNotePayload {
    pub bullets: Vec<String>,
}

/// One measured project result, also the unit of CSV bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectNoteRow {
    pub case_study_slug: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub metric: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemsMemoPayload {
    pub thesis: String,
    pub points: Vec<String>,
    pub example: String,
    pub takeaway: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogFeaturePayload {
    pub title: String,
    pub primary_keyword: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_links: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_links: Vec<String>,
    /// Markdown body after the frontmatter block.
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeLogEntry {
    pub date: String,
    pub change: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecisionRecordPayload {
    pub context: String,
    pub decision: String,
    pub tradeoffs: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalLogEntry {
    pub date: String,
    pub signal: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Kind-tagged structured payload.
///
/// Serialized as `{"kind": "<snake_kind>", "payload": {...}}` so the stored
/// JSON is self-describing and can be checked against the owning item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum StructuredPayload {
    FieldNote(FieldNotePayload),
    ProjectNote(ProjectNoteRow),
    SystemsMemo(SystemsMemoPayload),
    BlogFeature(BlogFeaturePayload),
    ChangeLog(ChangeLogEntry),
    DecisionRecord(DecisionRecordPayload),
    SignalLog(SignalLogEntry),
}

impl StructuredPayload {
    /// Returns the content kind implied by this payload variant.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::FieldNote(_) => ContentKind::FieldNote,
            Self::ProjectNote(_) => ContentKind::ProjectNote,
            Self::SystemsMemo(_) => ContentKind::SystemsMemo,
            Self::BlogFeature(_) => ContentKind::BlogFeature,
            Self::ChangeLog(_) => ContentKind::ChangeLog,
            Self::DecisionRecord(_) => ContentKind::DecisionRecord,
            Self::SignalLog(_) => ContentKind::SignalLog,
        }
    }

    /// Renders the plain-text/markdown body shown in list and detail views.
    ///
    /// Empty sections are omitted, so a sparse draft renders a short body
    /// rather than a skeleton of headings.
    pub fn render_body(&self) -> String {
        match self {
            Self::FieldNote(payload) => payload
                .bullets
                .iter()
                .map(|bullet| format!("- {bullet}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::ProjectNote(row) => {
                let mut parts = Vec::new();
                if !row.metric.trim().is_empty() {
                    parts.push(format!("**{}**", row.metric.trim()));
                }
                push_non_empty(&mut parts, &row.detail);
                if let Some(link) = row.source_link.as_deref() {
                    if !link.trim().is_empty() {
                        parts.push(format!("Source: {}", link.trim()));
                    }
                }
                parts.join("\n\n")
            }
            Self::SystemsMemo(memo) => {
                let mut parts = Vec::new();
                push_section(&mut parts, "Thesis", &memo.thesis);
                if !memo.points.is_empty() {
                    let points = memo
                        .points
                        .iter()
                        .map(|point| format!("- {point}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    parts.push(format!("## Points\n{points}"));
                }
                push_section(&mut parts, "Example", &memo.example);
                push_section(&mut parts, "Takeaway", &memo.takeaway);
                parts.join("\n\n")
            }
            Self::BlogFeature(feature) => feature.body.trim().to_string(),
            Self::ChangeLog(entry) => {
                let mut parts = Vec::new();
                push_non_empty(&mut parts, &entry.change);
                if !entry.impact.trim().is_empty() {
                    parts.push(format!("Impact: {}", entry.impact.trim()));
                }
                parts.join("\n\n")
            }
            Self::DecisionRecord(record) => {
                let mut parts = Vec::new();
                push_section(&mut parts, "Context", &record.context);
                push_section(&mut parts, "Decision", &record.decision);
                push_section(&mut parts, "Tradeoffs", &record.tradeoffs);
                push_section(&mut parts, "Outcome", &record.outcome);
                parts.join("\n\n")
            }
            Self::SignalLog(entry) => {
                let mut parts = Vec::new();
                push_non_empty(&mut parts, &entry.signal);
                if let Some(link) = entry.link.as_deref() {
                    if !link.trim().is_empty() {
                        parts.push(link.trim().to_string());
                    }
                }
                parts.join("\n\n")
            }
        }
    }

    /// Payload values that feed the item's `topics` set.
    pub fn topic_seeds(&self) -> Vec<String> {
        match self {
            Self::BlogFeature(feature) => std::iter::once(&feature.primary_keyword)
                .chain(feature.related_keywords.iter())
                .cloned()
                .collect(),
            Self::SignalLog(entry) => entry.tags.clone(),
            _ => Vec::new(),
        }
    }

    /// Payload values that feed the item's `related_slugs` set.
    pub fn related_slug_seeds(&self) -> Vec<String> {
        match self {
            Self::ProjectNote(row) => vec![row.case_study_slug.clone()],
            _ => Vec::new(),
        }
    }
}

fn push_non_empty(parts: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

fn push_section(parts: &mut Vec<String>, heading: &str, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        parts.push(format!("## {heading}\n{trimmed}"));
    }
}
