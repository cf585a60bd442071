//! Validation findings and summaries.
//!
//! # Responsibility
//! - Define the `Issue` / `ValidationSummary` contract returned to callers.
//! - Keep `field` routing values stable for UI inline error display.
//!
//! # Invariants
//! - `ValidationSummary::ok` is `true` iff `errors` is empty.
//! - Warnings never affect `ok`.

use crate::model::kind::ContentKind;
use crate::model::payload::StructuredPayload;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Review surface an issue should be displayed next to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueField {
    #[serde(rename = "rawInput")]
    RawInput,
    #[serde(rename = "project_note")]
    ProjectNote,
    #[serde(rename = "change_log")]
    ChangeLog,
    #[serde(rename = "decision_record")]
    DecisionRecord,
    #[serde(rename = "signal_log")]
    SignalLog,
}

impl IssueField {
    /// Returns the review surface used for issues of a given kind.
    ///
    /// Free-text kinds are edited through the raw input box; structured kinds
    /// have a dedicated form each.
    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::FieldNote | ContentKind::SystemsMemo | ContentKind::BlogFeature => {
                Self::RawInput
            }
            ContentKind::ProjectNote => Self::ProjectNote,
            ContentKind::ChangeLog => Self::ChangeLog,
            ContentKind::DecisionRecord => Self::DecisionRecord,
            ContentKind::SignalLog => Self::SignalLog,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RawInput => "rawInput",
            Self::ProjectNote => "project_note",
            Self::ChangeLog => "change_log",
            Self::DecisionRecord => "decision_record",
            Self::SignalLog => "signal_log",
        }
    }
}

/// One structured validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable machine-readable code, e.g. `field_note_bullet_count`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Optional suggestion for fixing the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<IssueField>,
}

impl Issue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
            field: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_field(mut self, field: IssueField) -> Self {
        self.field = Some(field);
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of running one validator.
///
/// `normalized` carries the best-effort typed reconstruction of the input,
/// present even when `ok` is false so callers can preview without
/// re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub ok: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<StructuredPayload>,
}

impl Default for ValidationSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationSummary {
    /// Creates an empty, passing summary.
    pub fn new() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            normalized: None,
        }
    }

    /// Creates a failing summary holding a single error.
    pub fn failed(issue: Issue) -> Self {
        let mut summary = Self::new();
        summary.error(issue);
        summary
    }

    /// Records a blocking error.
    pub fn error(&mut self, issue: Issue) {
        self.errors.push(issue);
        self.ok = false;
    }

    /// Records a non-blocking warning.
    pub fn warn(&mut self, issue: Issue) {
        self.warnings.push(issue);
    }

    /// Returns the error codes in report order.
    pub fn error_codes(&self) -> Vec<&str> {
        self.errors.iter().map(|issue| issue.code.as_str()).collect()
    }

    /// Returns the warning codes in report order.
    pub fn warning_codes(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .map(|issue| issue.code.as_str())
            .collect()
    }
}

impl Display for ValidationSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.ok {
            return write!(f, "validation passed ({} warnings)", self.warnings.len());
        }
        let codes = self.error_codes().join(", ");
        write!(f, "validation failed: {codes}")
    }
}

#[cfg(test)]
mod tests {
    use super::{Issue, IssueField, ValidationSummary};

    #[test]
    fn warnings_do_not_flip_ok() {
        let mut summary = ValidationSummary::new();
        summary.warn(Issue::new("soft", "soft issue"));
        assert!(summary.ok);

        summary.error(Issue::new("hard", "hard issue"));
        assert!(!summary.ok);
        assert_eq!(summary.error_codes(), vec!["hard"]);
    }

    #[test]
    fn issue_field_serializes_to_stable_strings() {
        let issue = Issue::new("x", "y").with_field(IssueField::RawInput);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["field"], "rawInput");
        assert!(json.get("hint").is_none());

        let json = serde_json::to_value(IssueField::DecisionRecord).unwrap();
        assert_eq!(json, "decision_record");
    }
}
