//! Change log rules.

use super::{require_text, trim_owned, warn_non_iso_date, KindRules, ValidationMode};
use crate::model::issue::ValidationSummary;
use crate::model::kind::ContentKind;
use crate::model::payload::{ChangeLogEntry, StructuredPayload};

pub(crate) struct ChangeLogRules;

impl KindRules for ChangeLogRules {
    type Payload = ChangeLogEntry;

    const KIND: ContentKind = ContentKind::ChangeLog;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = true;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::ChangeLog(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::ChangeLog(payload)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        ChangeLogEntry {
            date: trim_owned(payload.date),
            change: trim_owned(payload.change),
            impact: trim_owned(payload.impact),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &ChangeLogEntry, summary: &mut ValidationSummary, mode: ValidationMode) {
    require_text(
        summary,
        mode,
        &payload.date,
        "change_log_date_missing",
        "change log entry needs a date",
    );
    require_text(
        summary,
        mode,
        &payload.change,
        "change_log_change_missing",
        "change log entry needs a change description",
    );
    require_text(
        summary,
        mode,
        &payload.impact,
        "change_log_impact_missing",
        "change log entry needs an impact",
    );
    warn_non_iso_date(summary, &payload.date, "change_log_date_format");
}

#[cfg(test)]
mod tests {
    use crate::model::kind::ContentKind;
    use crate::validate::{validate_create, validate_promote, ContentInput};
    use serde_json::json;

    #[test]
    fn missing_impact_blocks_promotion_only() {
        let input = ContentInput::json(json!({ "date": "2026-03-02", "change": "New cache" }));

        let created = validate_create(ContentKind::ChangeLog, &input);
        assert!(created.ok);
        assert_eq!(created.warning_codes(), vec!["change_log_impact_missing"]);

        let promoted = validate_promote(ContentKind::ChangeLog, &input);
        assert_eq!(promoted.error_codes(), vec!["change_log_impact_missing"]);
    }
}
