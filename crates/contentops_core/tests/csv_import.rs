use contentops_core::db::open_db_in_memory;
use contentops_core::{
    ContentKind, ContentListQuery, ContentService, ContentSource, ContentStatus, IssueField,
    NoopAuditSink, SqliteContentRepository, StructuredPayload,
};

const NOTES_CSV: &str = "\
Case_Study_Slug,Date,Metric,Detail,Source_Link
mmh,2026-01-05,p95 latency,\"Cut p95 from 900ms to 520ms, no new hardware\",https://example.com/pr/12

,2026-01-06,errors,Row without a slug,
billing-rewrite,06/01/2026,,Dropped the nightly batch,
";

#[test]
fn rows_import_independently_with_one_based_row_numbers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();
    let service = ContentService::new(repo, NoopAuditSink);

    let report = service
        .import_project_notes_csv(NOTES_CSV, ContentSource::Upload)
        .unwrap();

    let created_rows: Vec<usize> = report.created.iter().map(|row| row.row).collect();
    assert_eq!(created_rows, vec![1, 3]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].row, 2);
    assert_eq!(report.failed[0].errors[0].code, "project_note_slug_missing");
    assert_eq!(report.failed[0].errors[0].field, Some(IssueField::ProjectNote));

    let third = &report.created[1];
    let warning_codes: Vec<&str> = third.warnings.iter().map(|w| w.code.as_str()).collect();
    assert_eq!(
        warning_codes,
        vec!["project_note_date_format", "project_note_metric_missing"]
    );

    let first = service
        .get_item(report.created[0].id)
        .unwrap()
        .unwrap();
    assert_eq!(first.kind, ContentKind::ProjectNote);
    assert_eq!(first.status, ContentStatus::Draft);
    assert_eq!(first.source, ContentSource::Upload);
    assert_eq!(first.related_slugs, vec!["mmh"]);
    match first.structured {
        Some(StructuredPayload::ProjectNote(row)) => {
            assert_eq!(row.detail, "Cut p95 from 900ms to 520ms, no new hardware");
            assert_eq!(row.source_link.as_deref(), Some("https://example.com/pr/12"));
        }
        other => panic!("unexpected structured payload: {other:?}"),
    }
    assert_eq!(
        first.body.as_deref(),
        Some("**p95 latency**\n\nCut p95 from 900ms to 520ms, no new hardware\n\nSource: https://example.com/pr/12")
    );
}

#[test]
fn imported_rows_are_ready_for_promotion_report() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();
    let service = ContentService::new(repo, NoopAuditSink);

    service
        .import_project_notes_csv(NOTES_CSV, ContentSource::Upload)
        .unwrap();
    let report = service
        .promotion_report(&ContentListQuery {
            kind: Some(ContentKind::ProjectNote),
            ..ContentListQuery::default()
        })
        .unwrap();

    assert_eq!(report.len(), 2);
    assert!(report.iter().all(|entry| entry.ready_to_promote));
}

#[test]
fn header_without_required_columns_fails_whole_import() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();
    let service = ContentService::new(repo, NoopAuditSink);

    let err = service
        .import_project_notes_csv("mmh,2026-01-05,p95,detail\n", ContentSource::Upload)
        .unwrap_err();
    let summary = err.summary().unwrap();
    assert!(!summary.ok);
    assert_eq!(summary.error_codes(), vec!["project_note_parse"]);
    assert!(summary.errors[0].message.contains("case_study_slug"));

    assert!(service
        .list_items(&ContentListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn empty_csv_fails_with_parse_issue() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();
    let service = ContentService::new(repo, NoopAuditSink);

    let err = service
        .import_project_notes_csv("", ContentSource::Manual)
        .unwrap_err();
    assert_eq!(
        err.summary().unwrap().error_codes(),
        vec!["project_note_parse"]
    );
}

#[test]
fn header_only_csv_imports_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContentRepository::try_new(&conn).unwrap();
    let service = ContentService::new(repo, NoopAuditSink);

    let report = service
        .import_project_notes_csv(
            "case_study_slug,date,metric,detail\n",
            ContentSource::Manual,
        )
        .unwrap();
    assert!(report.created.is_empty());
    assert!(report.failed.is_empty());
}
