//! Content kind, lifecycle status and source enums.
//!
//! # Responsibility
//! - Define the closed sets of kinds/states understood by the engine.
//! - Own the stable storage codes for each variant.
//!
//! # Invariants
//! - Storage codes are snake_case and never change once released.
//! - `ContentStatus::Draft` is the only default creation status.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the seven content variants the engine understands.
///
/// The kind is fixed at creation and selects the structured payload shape,
/// the parser and the validator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Short bullet list captured in the field.
    FieldNote,
    /// One measured result tied to a case study.
    ProjectNote,
    /// Thesis/points/example/takeaway memo.
    SystemsMemo,
    /// Long-form article with SEO frontmatter.
    BlogFeature,
    /// Dated change with its impact.
    ChangeLog,
    /// Context/decision/tradeoffs/outcome record.
    DecisionRecord,
    /// Dated external signal with tags.
    SignalLog,
}

impl ContentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ContentKind; 7] = [
        ContentKind::FieldNote,
        ContentKind::ProjectNote,
        ContentKind::SystemsMemo,
        ContentKind::BlogFeature,
        ContentKind::ChangeLog,
        ContentKind::DecisionRecord,
        ContentKind::SignalLog,
    ];

    /// Stable snake_case code used in storage, issue codes and CLI args.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FieldNote => "field_note",
            Self::ProjectNote => "project_note",
            Self::SystemsMemo => "systems_memo",
            Self::BlogFeature => "blog_feature",
            Self::ChangeLog => "change_log",
            Self::DecisionRecord => "decision_record",
            Self::SignalLog => "signal_log",
        }
    }

    /// Parses a storage code. Accepts `-` as separator for CLI convenience.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review lifecycle state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Saved work in progress. Only default creation status.
    #[default]
    Draft,
    /// Passed strict validation and waits for review.
    Ready,
    /// Reviewed and accepted.
    Approved,
    /// Reviewed and declined.
    Rejected,
    /// Retired from active views.
    Archived,
}

impl ContentStatus {
    /// Every status, in declaration order.
    pub const ALL: [ContentStatus; 5] = [
        ContentStatus::Draft,
        ContentStatus::Ready,
        ContentStatus::Approved,
        ContentStatus::Rejected,
        ContentStatus::Archived,
    ];

    /// Returns whether entering this status requires promotion validation.
    pub fn is_promoted(self) -> bool {
        matches!(self, Self::Ready | Self::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }
}

impl Display for ContentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the raw input of an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Typed in by an operator.
    #[default]
    Manual,
    /// Imported from an uploaded file (CSV, markdown).
    Upload,
    /// Pulled in by an external sync (draft generator, evidence fetch).
    ExternalSync,
}

impl ContentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Upload => "upload",
            Self::ExternalSync => "external_sync",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Some(Self::Manual),
            "upload" => Some(Self::Upload),
            "external_sync" => Some(Self::ExternalSync),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentKind, ContentStatus};

    #[test]
    fn kind_codes_round_trip() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(
            ContentKind::parse("Blog-Feature"),
            Some(ContentKind::BlogFeature)
        );
        assert_eq!(ContentKind::parse("podcast"), None);
    }

    #[test]
    fn only_ready_and_approved_are_promoted() {
        let promoted: Vec<_> = ContentStatus::ALL
            .into_iter()
            .filter(|status| status.is_promoted())
            .collect();
        assert_eq!(promoted, vec![ContentStatus::Ready, ContentStatus::Approved]);
    }
}
