//! Content item aggregate.
//!
//! # Responsibility
//! - Define the persisted content record and its attachments.
//! - Enforce record-level invariants before persistence.
//! - Provide set-union helpers for `topics` / `related_slugs`.
//!
//! # Invariants
//! - `id` is stable and never nil.
//! - `kind` never changes after creation.
//! - `structured`, when present, matches `kind`.
//! - `topics` and `related_slugs` are normalized, deduplicated and sorted.

use crate::model::kind::{ContentKind, ContentSource, ContentStatus};
use crate::model::payload::StructuredPayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every content item.
pub type ContentItemId = Uuid;

/// File attached to an item, with text extracted by the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    #[serde(default)]
    pub extracted_text: String,
}

/// Canonical content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentItemId,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub title: Option<String>,
    pub summary: Option<String>,
    /// Rendered display text derived from the payload at intake.
    pub body: Option<String>,
    /// Original operator/import text, kept verbatim.
    pub raw_input: Option<String>,
    pub structured: Option<StructuredPayload>,
    pub source: ContentSource,
    /// Free-form reminder cadence, e.g. `weekly`.
    pub cadence_target: Option<String>,
    pub topics: Vec<String>,
    pub related_slugs: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

/// Record-level invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItemValidationError {
    NilId,
    StructuredKindMismatch {
        item_kind: ContentKind,
        payload_kind: ContentKind,
    },
    InvalidTimestamps {
        created_at: i64,
        updated_at: i64,
    },
}

impl Display for ContentItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "content item id must not be nil"),
            Self::StructuredKindMismatch {
                item_kind,
                payload_kind,
            } => write!(
                f,
                "structured payload kind `{payload_kind}` does not match item kind `{item_kind}`"
            ),
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for ContentItemValidationError {}

impl ContentItem {
    /// Creates an empty draft item with a generated id.
    pub fn new(kind: ContentKind, now_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), kind, now_ms)
    }

    /// Creates an empty draft item with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally. The id
    /// is checked by `validate()` rather than here.
    pub fn with_id(id: ContentItemId, kind: ContentKind, now_ms: i64) -> Self {
        Self {
            id,
            kind,
            status: ContentStatus::Draft,
            title: None,
            summary: None,
            body: None,
            raw_input: None,
            structured: None,
            source: ContentSource::Manual,
            cadence_target: None,
            topics: Vec::new(),
            related_slugs: Vec::new(),
            attachments: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), ContentItemValidationError> {
        if self.id.is_nil() {
            return Err(ContentItemValidationError::NilId);
        }

        if let Some(payload) = self.structured.as_ref() {
            if payload.kind() != self.kind {
                return Err(ContentItemValidationError::StructuredKindMismatch {
                    item_kind: self.kind,
                    payload_kind: payload.kind(),
                });
            }
        }

        if self.updated_at < self.created_at {
            return Err(ContentItemValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }

        Ok(())
    }

    /// Unions values into `topics`.
    pub fn add_topics<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.topics = merge_unique(&self.topics, values);
    }

    /// Unions values into `related_slugs`.
    pub fn add_related_slugs<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.related_slugs = merge_unique(&self.related_slugs, values);
    }
}

/// Normalizes one set member: trimmed, lowercased, blank dropped.
pub fn normalize_set_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Unions `additions` into `existing`, returning a normalized sorted set.
pub fn merge_unique<I, S>(existing: &[String], additions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique = BTreeSet::new();
    for value in existing {
        if let Some(normalized) = normalize_set_value(value) {
            unique.insert(normalized);
        }
    }
    for value in additions {
        if let Some(normalized) = normalize_set_value(value.as_ref()) {
            unique.insert(normalized);
        }
    }
    unique.into_iter().collect()
}
