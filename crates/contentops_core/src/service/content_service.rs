//! Content lifecycle service.
//!
//! # Responsibility
//! - Run create-time validation and apply normalized-payload side effects
//!   before the first write.
//! - Gate entry into Ready/Approved behind promotion validation.
//! - Bulk-import ProjectNote rows from CSV and report promotion blockers.
//!
//! # Invariants
//! - A failed validation leaves storage untouched.
//! - `update_fields` never validates and never changes status.
//! - Re-requesting the current status is a no-op without an audit event.
//! - Audit events are emitted only after the write succeeded.

use crate::model::issue::{Issue, IssueField, ValidationSummary};
use crate::model::item::{
    merge_unique, Attachment, ContentItem, ContentItemId, ContentItemValidationError,
};
use crate::model::kind::{ContentKind, ContentSource, ContentStatus};
use crate::model::payload::StructuredPayload;
use crate::parse::parse_csv;
use crate::repo::content_repo::{ContentListQuery, ContentRepository, RepoError};
use crate::service::audit::{AuditAction, AuditEvent, AuditSink};
use crate::validate::{
    project_note_from_csv_row, requires_structured_payload, validate_create, validate_promote,
    ContentInput, StructuredInput,
};
use chrono::Utc;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Maximum characters of a derived summary.
pub const SUMMARY_MAX_CHARS: usize = 160;

/// Header columns a ProjectNote CSV import must carry.
const CSV_REQUIRED_COLUMNS: [&str; 4] = ["case_study_slug", "date", "metric", "detail"];

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~\[\]\(\)!]+").expect("valid markdown symbol regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-+]|\d+[.)])\s+").expect("valid list marker regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for content lifecycle use-cases.
#[derive(Debug)]
pub enum ContentServiceError {
    /// Create-time or promotion validation failed; carries the summary verbatim.
    Validation(ValidationSummary),
    /// Target item does not exist.
    NotFound(ContentItemId),
    /// The mutation would break a record-level invariant.
    InvalidItem(ContentItemValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ContentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(summary) => write!(f, "{summary}"),
            Self::NotFound(id) => write!(f, "content item not found: {id}"),
            Self::InvalidItem(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent content state: {details}")
            }
        }
    }
}

impl Error for ContentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidItem(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidItem(err),
            other => Self::Repo(other),
        }
    }
}

impl ContentServiceError {
    /// Returns the validation summary when this is a validation failure.
    pub fn summary(&self) -> Option<&ValidationSummary> {
        match self {
            Self::Validation(summary) => Some(summary),
            _ => None,
        }
    }
}

pub type ContentServiceResult<T> = Result<T, ContentServiceError>;

/// Intake request for one new content item.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContentRequest {
    pub kind: ContentKind,
    pub raw_input: Option<String>,
    pub structured: Option<StructuredInput>,
    /// Draft unless the caller asks for more; promoted states run promotion
    /// validation before the write.
    pub requested_status: ContentStatus,
    /// Explicit title; BlogFeature falls back to its frontmatter title.
    pub title: Option<String>,
    pub source: ContentSource,
    pub cadence_target: Option<String>,
    pub topics: Vec<String>,
    pub related_slugs: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl CreateContentRequest {
    /// Creates an empty Draft request of `kind`.
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            raw_input: None,
            structured: None,
            requested_status: ContentStatus::Draft,
            title: None,
            source: ContentSource::Manual,
            cadence_target: None,
            topics: Vec::new(),
            related_slugs: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_raw_input(mut self, raw_input: impl Into<String>) -> Self {
        self.raw_input = Some(raw_input.into());
        self
    }

    pub fn with_structured(mut self, structured: StructuredInput) -> Self {
        self.structured = Some(structured);
        self
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.requested_status = status;
        self
    }

    fn input(&self) -> ContentInput {
        ContentInput {
            raw_input: self.raw_input.clone(),
            structured: self.structured.clone(),
        }
    }
}

/// Result of a successful create: the stored item and create-time warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutcome {
    pub item: ContentItem,
    pub warnings: Vec<Issue>,
}

/// Field-level update.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears it. Set
/// additions are unioned into the existing sets. Replacing the payload of a
/// free-text kind without also sending `raw_input` drops the stored raw
/// input, so later promotion checks see the new payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentPatch {
    #[serde(deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub summary: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub body: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub raw_input: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub structured: Option<Option<StructuredPayload>>,
    pub source: Option<ContentSource>,
    #[serde(deserialize_with = "present")]
    pub cadence_target: Option<Option<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub add_topics: Vec<String>,
    pub add_related_slugs: Vec<String>,
}

/// Maps a present JSON field (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ContentPatch {
    fn apply(self, item: &mut ContentItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(summary) = self.summary {
            item.summary = summary;
        }
        if let Some(body) = self.body {
            item.body = body;
        }
        let replaces_payload = matches!(self.structured, Some(Some(_)));
        match self.raw_input {
            Some(raw_input) => item.raw_input = raw_input,
            // Raw input shadows the payload of free-text kinds.
            None if replaces_payload && !requires_structured_payload(item.kind) => {
                item.raw_input = None;
            }
            None => {}
        }
        if let Some(structured) = self.structured {
            item.structured = structured;
        }
        if let Some(source) = self.source {
            item.source = source;
        }
        if let Some(cadence_target) = self.cadence_target {
            item.cadence_target = cadence_target;
        }
        if let Some(attachments) = self.attachments {
            item.attachments = attachments;
        }
        item.add_topics(&self.add_topics);
        item.add_related_slugs(&self.add_related_slugs);
    }
}

/// One CSV row that became a Draft item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRowCreated {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub id: ContentItemId,
    pub warnings: Vec<Issue>,
}

/// One CSV row rejected by create-time validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRowFailure {
    pub row: usize,
    pub errors: Vec<Issue>,
}

/// Per-row outcome of a ProjectNote CSV import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportReport {
    pub created: Vec<CsvRowCreated>,
    pub failed: Vec<CsvRowFailure>,
}

/// One item with its promotion blockers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionReportEntry {
    pub id: ContentItemId,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub title: Option<String>,
    pub updated_at: i64,
    pub ready_to_promote: bool,
    pub errors: Vec<Issue>,
}

/// Content service facade over repository and audit implementations.
pub struct ContentService<R: ContentRepository, A: AuditSink> {
    repo: R,
    audit: A,
}

impl<R: ContentRepository, A: AuditSink> ContentService<R, A> {
    /// Creates a service using the provided repository and audit sink.
    pub fn new(repo: R, audit: A) -> Self {
        Self { repo, audit }
    }

    /// Validates and persists one new item.
    ///
    /// # Errors
    /// - `Validation` with the create-time summary when it is not ok.
    /// - `Validation` with the promotion summary when a promoted status was
    ///   requested and the input does not qualify.
    pub fn create(&self, request: CreateContentRequest) -> ContentServiceResult<CreateOutcome> {
        let started_at = Instant::now();
        let kind = request.kind;
        let input = request.input();

        let summary = validate_create(kind, &input);
        if !summary.ok {
            log_rejected("content_create", kind, &summary, started_at);
            return Err(ContentServiceError::Validation(summary));
        }

        if request.requested_status.is_promoted() {
            let promotion = validate_promote(kind, &input);
            if !promotion.ok {
                log_rejected("content_create", kind, &promotion, started_at);
                return Err(ContentServiceError::Validation(promotion));
            }
        }

        let now = now_epoch_ms();
        let mut item = ContentItem::new(kind, now);
        item.status = request.requested_status;
        item.title = non_blank(request.title);
        item.raw_input = non_blank(request.raw_input);
        item.source = request.source;
        item.cadence_target = non_blank(request.cadence_target);
        item.attachments = request.attachments;
        item.add_topics(&request.topics);
        item.add_related_slugs(&request.related_slugs);

        if let Some(payload) = summary.normalized.clone() {
            apply_payload_side_effects(&mut item, payload);
        }

        let id = self.repo.create_item(&item)?;
        let stored = self
            .repo
            .get_item(id)?
            .ok_or(ContentServiceError::InconsistentState(
                "created item not found in read-back",
            ))?;

        self.emit(AuditAction::Create, &stored, None);
        info!(
            "event=content_create module=service status=ok kind={} item_status={} warnings={} duration_ms={}",
            kind,
            stored.status,
            summary.warnings.len(),
            started_at.elapsed().as_millis()
        );

        Ok(CreateOutcome {
            item: stored,
            warnings: summary.warnings,
        })
    }

    /// Applies a field patch without validation; status is never touched.
    pub fn update_fields(
        &self,
        id: ContentItemId,
        patch: ContentPatch,
    ) -> ContentServiceResult<ContentItem> {
        let mut item = self.load(id)?;
        patch.apply(&mut item);
        item.updated_at = now_epoch_ms().max(item.created_at);

        self.repo.update_item(&item)?;
        let stored = self
            .repo
            .get_item(id)?
            .ok_or(ContentServiceError::InconsistentState(
                "updated item not found in read-back",
            ))?;

        self.emit(AuditAction::Update, &stored, None);
        info!(
            "event=content_update module=service status=ok kind={} item_id={}",
            stored.kind, stored.id
        );
        Ok(stored)
    }

    /// Moves an item to `target`, gating Ready/Approved on promotion rules.
    ///
    /// # Errors
    /// - `Validation` with the promotion summary; status stays unchanged.
    pub fn transition_status(
        &self,
        id: ContentItemId,
        target: ContentStatus,
    ) -> ContentServiceResult<ContentItem> {
        let started_at = Instant::now();
        let item = self.load(id)?;
        let previous = item.status;

        if previous == target {
            info!(
                "event=content_transition module=service status=noop kind={} item_status={}",
                item.kind, target
            );
            return Ok(item);
        }

        if target.is_promoted() {
            let summary = validate_promote(item.kind, &ContentInput::from_item(&item));
            if !summary.ok {
                log_rejected("content_transition", item.kind, &summary, started_at);
                return Err(ContentServiceError::Validation(summary));
            }
        }

        self.repo.update_status(id, target, now_epoch_ms())?;
        let stored = self
            .repo
            .get_item(id)?
            .ok_or(ContentServiceError::InconsistentState(
                "transitioned item not found in read-back",
            ))?;

        self.emit(AuditAction::Transition, &stored, Some(previous));
        info!(
            "event=content_transition module=service status=ok kind={} from={} to={} duration_ms={}",
            stored.kind,
            previous,
            target,
            started_at.elapsed().as_millis()
        );
        Ok(stored)
    }

    /// Gets one item by id.
    pub fn get_item(&self, id: ContentItemId) -> ContentServiceResult<Option<ContentItem>> {
        Ok(self.repo.get_item(id)?)
    }

    /// Lists items sorted by `updated_at DESC, uuid ASC`.
    pub fn list_items(&self, query: &ContentListQuery) -> ContentServiceResult<Vec<ContentItem>> {
        Ok(self.repo.list_items(query)?)
    }

    /// Lists items with the errors that block their promotion.
    pub fn promotion_report(
        &self,
        query: &ContentListQuery,
    ) -> ContentServiceResult<Vec<PromotionReportEntry>> {
        let items = self.repo.list_items(query)?;
        Ok(items
            .into_iter()
            .map(|item| {
                let errors = promotion_issues(&item);
                PromotionReportEntry {
                    id: item.id,
                    kind: item.kind,
                    status: item.status,
                    title: item.title,
                    updated_at: item.updated_at,
                    ready_to_promote: errors.is_empty(),
                    errors,
                }
            })
            .collect())
    }

    /// Creates one Draft ProjectNote per CSV data row.
    ///
    /// Rows are validated independently; a rejected row does not stop the
    /// import. A row fails when create-time validation fails or it has no
    /// `case_study_slug`. An unreadable table or a header without the
    /// required columns fails the whole import with a `project_note_parse`
    /// summary.
    pub fn import_project_notes_csv(
        &self,
        csv_text: &str,
        source: ContentSource,
    ) -> ContentServiceResult<CsvImportReport> {
        let started_at = Instant::now();
        let table = parse_csv(csv_text)
            .map_err(|err| csv_parse_failure(err.to_string(), "check quoting and row shape"))?;

        let missing: Vec<&str> = CSV_REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !table.has_column(column))
            .collect();
        if !missing.is_empty() {
            let failure = csv_parse_failure(
                format!("header row is missing columns: {}", missing.join(", ")),
                "first line must be `case_study_slug,date,metric,detail,source_link`",
            );
            if let ContentServiceError::Validation(summary) = &failure {
                log_rejected("csv_import", ContentKind::ProjectNote, summary, started_at);
            }
            return Err(failure);
        }

        let mut report = CsvImportReport::default();
        for (index, row) in table.rows.iter().enumerate() {
            let row_number = index + 1;
            let payload = project_note_from_csv_row(row);
            // Every imported row must name its case study.
            if payload.case_study_slug.trim().is_empty() {
                report.failed.push(CsvRowFailure {
                    row: row_number,
                    errors: vec![Issue::new(
                        "project_note_slug_missing",
                        "row has no case_study_slug",
                    )
                    .with_field(IssueField::ProjectNote)],
                });
                continue;
            }

            let mut request = CreateContentRequest::new(ContentKind::ProjectNote).with_structured(
                StructuredInput::Typed(StructuredPayload::ProjectNote(payload)),
            );
            request.source = source;

            match self.create(request) {
                Ok(outcome) => report.created.push(CsvRowCreated {
                    row: row_number,
                    id: outcome.item.id,
                    warnings: outcome.warnings,
                }),
                Err(ContentServiceError::Validation(summary)) => {
                    report.failed.push(CsvRowFailure {
                        row: row_number,
                        errors: summary.errors,
                    })
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "event=csv_import module=service status=ok kind=project_note created={} failed={} duration_ms={}",
            report.created.len(),
            report.failed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn load(&self, id: ContentItemId) -> ContentServiceResult<ContentItem> {
        self.repo
            .get_item(id)?
            .ok_or(ContentServiceError::NotFound(id))
    }

    fn emit(&self, action: AuditAction, item: &ContentItem, previous: Option<ContentStatus>) {
        self.audit.record(&AuditEvent {
            action,
            item_id: item.id,
            kind: item.kind,
            status: item.status,
            previous_status: previous,
            at_ms: item.updated_at,
        });
    }
}

/// Returns the errors that block promoting `item`.
///
/// Read-only; runs promotion validation on the item's current fields.
pub fn promotion_issues(item: &ContentItem) -> Vec<Issue> {
    validate_promote(item.kind, &ContentInput::from_item(item)).errors
}

/// Derives a plain-text summary from a markdown body.
///
/// Images are dropped, links keep their label, markdown symbols and list
/// markers are stripped and whitespace is collapsed. Returns `None` when
/// nothing readable remains.
pub fn derive_summary(body: &str) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(body, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_markers = LIST_MARKER_RE.replace_all(&without_links, " ");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_markers, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(SUMMARY_MAX_CHARS).collect())
    }
}

fn apply_payload_side_effects(item: &mut ContentItem, payload: StructuredPayload) {
    let body = payload.render_body();
    if !body.is_empty() {
        item.body = Some(body);
    }

    item.topics = merge_unique(&item.topics, payload.topic_seeds());
    item.related_slugs = merge_unique(&item.related_slugs, payload.related_slug_seeds());

    if let StructuredPayload::BlogFeature(feature) = &payload {
        if item.title.is_none() && !feature.title.is_empty() {
            item.title = Some(feature.title.clone());
        }
        item.summary = derive_summary(&feature.body);
    }

    item.structured = Some(payload);
}

fn csv_parse_failure(message: String, hint: &str) -> ContentServiceError {
    ContentServiceError::Validation(ValidationSummary::failed(
        Issue::new("project_note_parse", message)
            .with_hint(hint)
            .with_field(IssueField::ProjectNote),
    ))
}

fn log_rejected(
    event: &str,
    kind: ContentKind,
    summary: &ValidationSummary,
    started_at: Instant,
) {
    warn!(
        "event={event} module=service status=rejected kind={kind} error_codes={} duration_ms={}",
        summary.error_codes().join(","),
        started_at.elapsed().as_millis()
    );
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{derive_summary, ContentPatch, ContentServiceError, SUMMARY_MAX_CHARS};
    use crate::model::issue::{Issue, ValidationSummary};
    use crate::model::kind::ContentSource;
    use serde_json::json;

    #[test]
    fn summary_strips_markdown_and_collapses_whitespace() {
        let body = "# Queue age\n\n![chart](a.png)\nRead the [runbook](https://x.y) **now** please.\n\n- first\n- second";
        assert_eq!(
            derive_summary(body).as_deref(),
            Some("Queue age Read the runbook now please. first second")
        );
    }

    #[test]
    fn summary_is_capped_and_keeps_hyphenated_words() {
        let body = format!("well-known {}", "word ".repeat(100));
        let summary = derive_summary(&body).unwrap();
        assert!(summary.starts_with("well-known word"));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS);
    }

    #[test]
    fn summary_of_symbols_only_is_none() {
        assert_eq!(derive_summary("## ** __"), None);
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: ContentPatch = serde_json::from_value(json!({
            "title": null,
            "summary": "short",
            "source": "upload",
            "addTopics": ["Ops"]
        }))
        .unwrap();
        assert_eq!(patch.title, Some(None));
        assert_eq!(patch.summary, Some(Some("short".to_string())));
        assert_eq!(patch.body, None);
        assert_eq!(patch.source, Some(ContentSource::Upload));
        assert_eq!(patch.add_topics, vec!["Ops"]);
    }

    #[test]
    fn validation_error_display_is_the_summary() {
        let err = ContentServiceError::Validation(ValidationSummary::failed(Issue::new(
            "field_note_bullet_count",
            "field note has 2 bullets",
        )));
        assert_eq!(err.to_string(), "validation failed: field_note_bullet_count");
    }
}
