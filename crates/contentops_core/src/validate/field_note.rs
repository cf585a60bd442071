//! Field note rules: a short list of bullets.

use super::{trim_list, KindRules, Parsed, ValidationMode};
use crate::model::issue::{Issue, ValidationSummary};
use crate::model::kind::ContentKind;
use crate::model::payload::{FieldNotePayload, StructuredPayload};
use crate::parse::normalize_bullets;

pub const FIELD_NOTE_MIN_BULLETS: usize = 3;
pub const FIELD_NOTE_MAX_BULLETS: usize = 8;

pub(crate) struct FieldNoteRules;

impl KindRules for FieldNoteRules {
    type Payload = FieldNotePayload;

    const KIND: ContentKind = ContentKind::FieldNote;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = false;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::FieldNote(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::FieldNote(payload)
    }

    fn parse_raw(raw: &str, _mode: ValidationMode) -> Option<Parsed<Self::Payload>> {
        let normalized = normalize_bullets(raw);
        let mut parsed = Parsed::clean(FieldNotePayload {
            bullets: normalized.bullets,
        });
        if normalized.inferred {
            parsed.warnings.push(
                Issue::new(
                    "field_note_bullets_inferred",
                    "no bullet markers found; bullets were split from sentences",
                )
                .with_hint("start each bullet line with `-`"),
            );
        }
        Some(parsed)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        FieldNotePayload {
            bullets: trim_list(payload.bullets),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        if let Some(issue) = bullet_count_issue(payload.bullets.len()) {
            summary.warn(issue);
        }
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        if let Some(issue) = bullet_count_issue(payload.bullets.len()) {
            summary.error(issue);
        }
    }
}

fn bullet_count_issue(count: usize) -> Option<Issue> {
    if (FIELD_NOTE_MIN_BULLETS..=FIELD_NOTE_MAX_BULLETS).contains(&count) {
        return None;
    }
    Some(
        Issue::new(
            "field_note_bullet_count",
            format!(
                "field note has {count} bullets; expected {FIELD_NOTE_MIN_BULLETS} to {FIELD_NOTE_MAX_BULLETS}"
            ),
        )
        .with_hint("keep one observation per bullet"),
    )
}

#[cfg(test)]
mod tests {
    use crate::model::kind::ContentKind;
    use crate::validate::{validate_create, validate_promote, ContentInput};

    fn bullets(count: usize) -> String {
        (1..=count)
            .map(|index| format!("- observation {index}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn promotion_accepts_three_to_eight_bullets() {
        for count in 3..=8 {
            let summary =
                validate_promote(ContentKind::FieldNote, &ContentInput::raw(bullets(count)));
            assert!(summary.ok, "{count} bullets should promote");
        }
    }

    #[test]
    fn promotion_rejects_counts_outside_range() {
        for count in [1, 2, 9, 12] {
            let summary =
                validate_promote(ContentKind::FieldNote, &ContentInput::raw(bullets(count)));
            assert_eq!(summary.error_codes(), vec!["field_note_bullet_count"]);
        }
    }

    #[test]
    fn create_only_warns_on_bad_count() {
        let summary = validate_create(ContentKind::FieldNote, &ContentInput::raw("- lonely"));
        assert!(summary.ok);
        assert_eq!(summary.warning_codes(), vec!["field_note_bullet_count"]);
    }

    #[test]
    fn sentence_fallback_is_reported() {
        let summary = validate_create(
            ContentKind::FieldNote,
            &ContentInput::raw("Shipped the feature. Fixed the bug."),
        );
        assert!(summary.ok);
        assert_eq!(
            summary.warning_codes(),
            vec!["field_note_bullets_inferred", "field_note_bullet_count"]
        );
    }
}
