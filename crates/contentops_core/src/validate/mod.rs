//! Two-tier validation for every content kind.
//!
//! # Responsibility
//! - Resolve raw text / typed / JSON input into the kind's typed payload.
//! - Run permissive create-time checks (warnings) and strict promotion checks
//!   (errors) and return a `ValidationSummary` with the normalized payload.
//! - Own the kind dispatch table.
//!
//! # Invariants
//! - Create-time validation only blocks on structural absence, empty
//!   free-text input or parse failures.
//! - Every issue carries a `field` routing tag.
//! - `normalized` is present whenever any payload could be reconstructed.
//! - Validators are pure; they never touch storage.

mod blog_feature;
mod change_log;
mod decision_record;
mod field_note;
mod project_note;
mod signal_log;
mod systems_memo;

use crate::model::issue::{Issue, IssueField, ValidationSummary};
use crate::model::item::ContentItem;
use crate::model::kind::ContentKind;
use crate::model::payload::StructuredPayload;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use blog_feature::{blog_feature_from_frontmatter, BLOG_BODY_MIN_CHARS};
pub use field_note::{FIELD_NOTE_MAX_BULLETS, FIELD_NOTE_MIN_BULLETS};
pub use project_note::{project_note_from_csv_row, PROJECT_NOTE_COLUMNS};
pub use systems_memo::SYSTEMS_MEMO_MIN_POINTS;

/// Issue code used when a free-text kind receives no input at all.
pub const RAW_INPUT_REQUIRED: &str = "raw_input_required";
/// Issue code used when a typed payload belongs to another kind.
pub const STRUCTURED_KIND_MISMATCH: &str = "structured_kind_mismatch";

/// Structured input as handed over by forms, imports or the draft generator.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredInput {
    /// Already typed payload (forms, stored items).
    Typed(StructuredPayload),
    /// Untyped JSON, either a bare payload object or the tagged
    /// `{"kind", "payload"}` form.
    Json(Value),
}

/// Input to one validator run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentInput {
    pub raw_input: Option<String>,
    pub structured: Option<StructuredInput>,
}

impl ContentInput {
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw_input: Some(text.into()),
            structured: None,
        }
    }

    pub fn typed(payload: StructuredPayload) -> Self {
        Self {
            raw_input: None,
            structured: Some(StructuredInput::Typed(payload)),
        }
    }

    pub fn json(value: Value) -> Self {
        Self {
            raw_input: None,
            structured: Some(StructuredInput::Json(value)),
        }
    }

    /// Builds validator input from a persisted item's current fields.
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            raw_input: item.raw_input.clone(),
            structured: item.structured.clone().map(StructuredInput::Typed),
        }
    }

    fn raw_text(&self) -> Option<&str> {
        self.raw_input
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    fn structured(&self) -> Option<&StructuredInput> {
        match self.structured.as_ref() {
            Some(StructuredInput::Json(Value::Null)) | None => None,
            Some(other) => Some(other),
        }
    }
}

/// Which tier of validation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Promote,
}

/// Best-effort parse result for one kind.
pub(crate) struct Parsed<P> {
    pub payload: P,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
}

impl<P> Parsed<P> {
    pub(crate) fn clean(payload: P) -> Self {
        Self {
            payload,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Per-kind parse and check rules.
pub(crate) trait KindRules {
    type Payload: DeserializeOwned;

    const KIND: ContentKind;
    /// Kinds with no free-text fallback hard-fail without a payload.
    const REQUIRES_STRUCTURED_PAYLOAD: bool;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload>;
    fn into_structured(payload: Self::Payload) -> StructuredPayload;

    /// Parses raw text. Only free-text kinds implement this.
    fn parse_raw(_raw: &str, _mode: ValidationMode) -> Option<Parsed<Self::Payload>> {
        None
    }

    /// Trims fields and drops blank list items.
    fn normalize(payload: Self::Payload) -> Self::Payload;

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary);
    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary);
}

/// One row of the kind dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct KindEntry {
    pub kind: ContentKind,
    pub requires_structured_payload: bool,
    pub validate_create: fn(&ContentInput) -> ValidationSummary,
    pub validate_promote: fn(&ContentInput) -> ValidationSummary,
}

/// Returns the dispatch entry for `kind`.
pub fn kind_entry(kind: ContentKind) -> KindEntry {
    match kind {
        ContentKind::FieldNote => entry::<field_note::FieldNoteRules>(),
        ContentKind::ProjectNote => entry::<project_note::ProjectNoteRules>(),
        ContentKind::SystemsMemo => entry::<systems_memo::SystemsMemoRules>(),
        ContentKind::BlogFeature => entry::<blog_feature::BlogFeatureRules>(),
        ContentKind::ChangeLog => entry::<change_log::ChangeLogRules>(),
        ContentKind::DecisionRecord => entry::<decision_record::DecisionRecordRules>(),
        ContentKind::SignalLog => entry::<signal_log::SignalLogRules>(),
    }
}

/// Returns the full dispatch table in `ContentKind::ALL` order.
pub fn kind_table() -> [KindEntry; 7] {
    ContentKind::ALL.map(kind_entry)
}

/// Returns whether `kind` hard-fails without a structured payload.
pub fn requires_structured_payload(kind: ContentKind) -> bool {
    kind_entry(kind).requires_structured_payload
}

/// Runs permissive create-time validation.
pub fn validate_create(kind: ContentKind, input: &ContentInput) -> ValidationSummary {
    (kind_entry(kind).validate_create)(input)
}

/// Runs strict promotion validation.
pub fn validate_promote(kind: ContentKind, input: &ContentInput) -> ValidationSummary {
    (kind_entry(kind).validate_promote)(input)
}

fn entry<K: KindRules>() -> KindEntry {
    KindEntry {
        kind: K::KIND,
        requires_structured_payload: K::REQUIRES_STRUCTURED_PAYLOAD,
        validate_create: run_create::<K>,
        validate_promote: run_promote::<K>,
    }
}

fn run_create<K: KindRules>(input: &ContentInput) -> ValidationSummary {
    run::<K>(input, ValidationMode::Create)
}

fn run_promote<K: KindRules>(input: &ContentInput) -> ValidationSummary {
    run::<K>(input, ValidationMode::Promote)
}

fn run<K: KindRules>(input: &ContentInput, mode: ValidationMode) -> ValidationSummary {
    let field = IssueField::for_kind(K::KIND);
    let parsed = match resolve::<K>(input, mode) {
        Ok(parsed) => parsed,
        Err(issue) => return ValidationSummary::failed(issue.with_field(field)),
    };

    let mut summary = ValidationSummary::new();
    for issue in parsed.errors {
        summary.error(issue);
    }
    for issue in parsed.warnings {
        summary.warn(issue);
    }

    let payload = K::normalize(parsed.payload);
    match mode {
        ValidationMode::Create => K::create_checks(&payload, &mut summary),
        ValidationMode::Promote => K::promote_checks(&payload, &mut summary),
    }

    for issue in summary.errors.iter_mut().chain(summary.warnings.iter_mut()) {
        if issue.field.is_none() {
            issue.field = Some(field);
        }
    }
    summary.normalized = Some(K::into_structured(payload));
    summary
}

fn resolve<K: KindRules>(
    input: &ContentInput,
    mode: ValidationMode,
) -> Result<Parsed<K::Payload>, Issue> {
    if !K::REQUIRES_STRUCTURED_PAYLOAD {
        if let Some(parsed) = input.raw_text().and_then(|raw| K::parse_raw(raw, mode)) {
            return Ok(parsed);
        }
    }

    match input.structured() {
        Some(StructuredInput::Typed(payload)) => from_typed::<K>(payload.clone()),
        Some(StructuredInput::Json(value)) => from_json::<K>(value),
        None if K::REQUIRES_STRUCTURED_PAYLOAD => Err(Issue::new(
            format!("{}_required", K::KIND),
            format!("{} requires a structured payload", K::KIND),
        )
        .with_hint("fill in the form fields; free text is not accepted for this kind")),
        None => Err(Issue::new(
            RAW_INPUT_REQUIRED,
            format!("{} input is empty", K::KIND),
        )
        .with_hint("paste the draft text before saving")),
    }
}

fn from_typed<K: KindRules>(payload: StructuredPayload) -> Result<Parsed<K::Payload>, Issue> {
    let payload_kind = payload.kind();
    K::from_structured(payload).map(Parsed::clean).ok_or_else(|| {
        Issue::new(
            STRUCTURED_KIND_MISMATCH,
            format!(
                "structured payload is a {payload_kind}, expected {}",
                K::KIND
            ),
        )
    })
}

fn from_json<K: KindRules>(value: &Value) -> Result<Parsed<K::Payload>, Issue> {
    let is_tagged = value
        .as_object()
        .is_some_and(|object| object.contains_key("kind") && object.contains_key("payload"));
    if is_tagged {
        return serde_json::from_value::<StructuredPayload>(value.clone())
            .map_err(|err| parse_issue::<K>(&err))
            .and_then(from_typed::<K>);
    }

    serde_json::from_value::<K::Payload>(value.clone())
        .map(Parsed::clean)
        .map_err(|err| parse_issue::<K>(&err))
}

fn parse_issue<K: KindRules>(err: &serde_json::Error) -> Issue {
    Issue::new(
        format!("{}_parse", K::KIND),
        format!("structured payload is not a valid {}: {err}", K::KIND),
    )
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Adds an issue when `value` is blank, at the severity implied by `mode`.
pub(crate) fn require_text(
    summary: &mut ValidationSummary,
    mode: ValidationMode,
    value: &str,
    code: &str,
    message: &str,
) {
    if !is_blank(value) {
        return;
    }
    let issue = Issue::new(code, message);
    match mode {
        ValidationMode::Create => summary.warn(issue),
        ValidationMode::Promote => summary.error(issue),
    }
}

/// Warns when a non-blank date is not `YYYY-MM-DD`.
pub(crate) fn warn_non_iso_date(summary: &mut ValidationSummary, value: &str, code: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
        return;
    }
    summary.warn(
        Issue::new(code, format!("date `{trimmed}` is not an ISO date"))
            .with_hint("use YYYY-MM-DD"),
    );
}

pub(crate) fn trim_owned(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn trim_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(trim_owned)
        .filter(|value| !value.is_empty())
        .collect()
}

pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(trim_owned).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        kind_table, requires_structured_payload, validate_create, validate_promote,
        ContentInput, RAW_INPUT_REQUIRED, STRUCTURED_KIND_MISMATCH,
    };
    use crate::model::issue::IssueField;
    use crate::model::kind::ContentKind;
    use crate::model::payload::{ChangeLogEntry, FieldNotePayload, StructuredPayload};
    use serde_json::json;

    #[test]
    fn table_covers_every_kind_once_in_order() {
        let table = kind_table();
        let kinds: Vec<_> = table.iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, ContentKind::ALL.to_vec());
    }

    #[test]
    fn structured_requirement_flag_matches_kind_family() {
        for kind in [
            ContentKind::ProjectNote,
            ContentKind::ChangeLog,
            ContentKind::DecisionRecord,
            ContentKind::SignalLog,
        ] {
            assert!(requires_structured_payload(kind), "{kind}");
        }
        for kind in [
            ContentKind::FieldNote,
            ContentKind::SystemsMemo,
            ContentKind::BlogFeature,
        ] {
            assert!(!requires_structured_payload(kind), "{kind}");
        }
    }

    #[test]
    fn structured_kind_without_payload_fails_at_create() {
        let summary = validate_create(ContentKind::ChangeLog, &ContentInput::raw("some text"));
        assert!(!summary.ok);
        assert_eq!(summary.error_codes(), vec!["change_log_required"]);
        assert_eq!(summary.errors[0].field, Some(IssueField::ChangeLog));
        assert!(summary.normalized.is_none());
    }

    #[test]
    fn free_text_kind_with_blank_input_fails_at_create() {
        let summary = validate_create(ContentKind::SystemsMemo, &ContentInput::raw("   \n"));
        assert_eq!(summary.error_codes(), vec![RAW_INPUT_REQUIRED]);
        assert_eq!(summary.errors[0].field, Some(IssueField::RawInput));
    }

    #[test]
    fn invalid_json_becomes_single_parse_issue() {
        let input = ContentInput::json(json!({ "date": 20260101, "change": "x" }));
        let summary = validate_create(ContentKind::ChangeLog, &input);
        assert_eq!(summary.error_codes(), vec!["change_log_parse"]);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn tagged_json_is_accepted() {
        let input = ContentInput::json(json!({
            "kind": "change_log",
            "payload": { "date": "2026-01-01", "change": "Cut cold start", "impact": "Faster" }
        }));
        let summary = validate_promote(ContentKind::ChangeLog, &input);
        assert!(summary.ok, "{summary}");
    }

    #[test]
    fn typed_payload_of_other_kind_is_rejected() {
        let input = ContentInput::typed(StructuredPayload::ChangeLog(ChangeLogEntry::default()));
        let summary = validate_create(ContentKind::FieldNote, &input);
        assert_eq!(summary.error_codes(), vec![STRUCTURED_KIND_MISMATCH]);
    }

    #[test]
    fn json_null_counts_as_absent() {
        let input = ContentInput::json(serde_json::Value::Null);
        let summary = validate_create(ContentKind::SignalLog, &input);
        assert_eq!(summary.error_codes(), vec!["signal_log_required"]);
    }

    #[test]
    fn raw_input_wins_over_structured_for_free_text_kinds() {
        let input = ContentInput {
            raw_input: Some("- a\n- b\n- c".to_string()),
            structured: Some(super::StructuredInput::Typed(StructuredPayload::FieldNote(
                FieldNotePayload {
                    bullets: vec!["stale".to_string()],
                },
            ))),
        };
        let summary = validate_promote(ContentKind::FieldNote, &input);
        assert!(summary.ok);
        assert_eq!(
            summary.normalized,
            Some(StructuredPayload::FieldNote(FieldNotePayload {
                bullets: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            }))
        );
    }
}
