//! Project note rules: one dated, measured result for a case study.

use super::{
    require_text, trim_optional, trim_owned, warn_non_iso_date, KindRules, ValidationMode,
};
use crate::model::issue::ValidationSummary;
use crate::model::kind::ContentKind;
use crate::model::payload::{ProjectNoteRow, StructuredPayload};
use crate::parse::CsvRow;

/// Column names of the ProjectNote CSV import.
pub const PROJECT_NOTE_COLUMNS: [&str; 5] =
    ["case_study_slug", "date", "metric", "detail", "source_link"];

pub(crate) struct ProjectNoteRules;

/// Maps one CSV import row onto a project note payload.
pub fn project_note_from_csv_row(row: &CsvRow) -> ProjectNoteRow {
    ProjectNoteRow {
        case_study_slug: row.get("case_study_slug").to_string(),
        date: row.get("date").to_string(),
        metric: row.get("metric").to_string(),
        detail: row.get("detail").to_string(),
        source_link: row.get_non_empty("source_link").map(str::to_string),
    }
}

impl KindRules for ProjectNoteRules {
    type Payload = ProjectNoteRow;

    const KIND: ContentKind = ContentKind::ProjectNote;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = true;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::ProjectNote(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::ProjectNote(payload)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        ProjectNoteRow {
            case_study_slug: trim_owned(payload.case_study_slug),
            date: trim_owned(payload.date),
            metric: trim_owned(payload.metric),
            detail: trim_owned(payload.detail),
            source_link: trim_optional(payload.source_link),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
        require_text(
            summary,
            ValidationMode::Create,
            &payload.metric,
            "project_note_metric_missing",
            "project note has no metric",
        );
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &ProjectNoteRow, summary: &mut ValidationSummary, mode: ValidationMode) {
    require_text(
        summary,
        mode,
        &payload.case_study_slug,
        "project_note_slug_missing",
        "project note needs a case study slug",
    );
    require_text(
        summary,
        mode,
        &payload.date,
        "project_note_date_missing",
        "project note needs a date",
    );
    require_text(
        summary,
        mode,
        &payload.detail,
        "project_note_detail_missing",
        "project note needs a detail",
    );
    warn_non_iso_date(summary, &payload.date, "project_note_date_format");
}

#[cfg(test)]
mod tests {
    use super::project_note_from_csv_row;
    use crate::model::issue::IssueField;
    use crate::model::kind::ContentKind;
    use crate::model::payload::{ProjectNoteRow, StructuredPayload};
    use crate::parse::parse_csv;
    use crate::validate::{validate_create, validate_promote, ContentInput};
    use serde_json::json;

    #[test]
    fn csv_row_maps_to_payload() {
        let table = parse_csv(
            "case_study_slug,date,metric,detail,source_link\n\
             mmh,2026-01-01,Perf,\"Reduced load, a lot\",",
        )
        .unwrap();
        let row = project_note_from_csv_row(&table.rows[0]);
        assert_eq!(row.case_study_slug, "mmh");
        assert_eq!(row.detail, "Reduced load, a lot");
        assert_eq!(row.source_link, None);

        let summary = validate_promote(
            ContentKind::ProjectNote,
            &ContentInput::typed(StructuredPayload::ProjectNote(row)),
        );
        assert!(summary.ok, "{summary}");
    }

    #[test]
    fn promotion_requires_slug_date_and_detail() {
        let input = ContentInput::json(json!({ "metric": "p95" }));
        let summary = validate_promote(ContentKind::ProjectNote, &input);
        assert_eq!(
            summary.error_codes(),
            vec![
                "project_note_slug_missing",
                "project_note_date_missing",
                "project_note_detail_missing",
            ]
        );
        assert!(summary
            .errors
            .iter()
            .all(|issue| issue.field == Some(IssueField::ProjectNote)));
    }

    #[test]
    fn create_warns_on_gaps_and_date_format() {
        let row = ProjectNoteRow {
            case_study_slug: "mmh".to_string(),
            date: "01/02/2026".to_string(),
            detail: "Cut p95".to_string(),
            ..ProjectNoteRow::default()
        };
        let summary = validate_create(
            ContentKind::ProjectNote,
            &ContentInput::typed(StructuredPayload::ProjectNote(row)),
        );
        assert!(summary.ok);
        assert_eq!(
            summary.warning_codes(),
            vec!["project_note_date_format", "project_note_metric_missing"]
        );
    }
}
