//! Typed content intake and promotion validation.
//!
//! Parsers turn loosely structured text into kind-specific payloads,
//! validators grade them at create and promotion time, and the lifecycle
//! service persists items and gates their status changes.

pub mod db;
pub mod logging;
pub mod model;
pub mod parse;
pub mod repo;
pub mod service;
pub mod validate;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::issue::{Issue, IssueField, ValidationSummary};
pub use model::item::{Attachment, ContentItem, ContentItemId, ContentItemValidationError};
pub use model::kind::{ContentKind, ContentSource, ContentStatus};
pub use model::payload::{
    BlogFeaturePayload, ChangeLogEntry, DecisionRecordPayload, FieldNotePayload, ProjectNoteRow,
    SignalLogEntry, StructuredPayload, SystemsMemoPayload,
};
pub use repo::content_repo::{
    ContentListQuery, ContentRepository, RepoError, RepoResult, SqliteContentRepository,
};
pub use service::audit::{AuditAction, AuditEvent, AuditSink, LogAuditSink, NoopAuditSink};
pub use service::content_service::{
    derive_summary, promotion_issues, ContentPatch, ContentService, ContentServiceError,
    CreateContentRequest, CreateOutcome, CsvImportReport, CsvRowCreated, CsvRowFailure,
    PromotionReportEntry,
};
pub use validate::{
    kind_entry, kind_table, requires_structured_payload, validate_create, validate_promote,
    ContentInput, KindEntry, StructuredInput,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
