//! Signal log rules.

use super::{
    require_text, trim_list, trim_optional, trim_owned, warn_non_iso_date, KindRules,
    ValidationMode,
};
use crate::model::issue::{Issue, ValidationSummary};
use crate::model::kind::ContentKind;
use crate::model::payload::{SignalLogEntry, StructuredPayload};

pub(crate) struct SignalLogRules;

impl KindRules for SignalLogRules {
    type Payload = SignalLogEntry;

    const KIND: ContentKind = ContentKind::SignalLog;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = true;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::SignalLog(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::SignalLog(payload)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        SignalLogEntry {
            date: trim_owned(payload.date),
            signal: trim_owned(payload.signal),
            tags: trim_list(payload.tags),
            link: trim_optional(payload.link),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &SignalLogEntry, summary: &mut ValidationSummary, mode: ValidationMode) {
    require_text(
        summary,
        mode,
        &payload.date,
        "signal_log_date_missing",
        "signal needs a date",
    );
    require_text(
        summary,
        mode,
        &payload.signal,
        "signal_log_signal_missing",
        "signal needs a description",
    );
    if payload.tags.is_empty() {
        let issue = Issue::new("signal_log_tags_missing", "signal needs at least one tag")
            .with_hint("tags feed dashboard topics");
        match mode {
            ValidationMode::Create => summary.warn(issue),
            ValidationMode::Promote => summary.error(issue),
        }
    }
    warn_non_iso_date(summary, &payload.date, "signal_log_date_format");
}

#[cfg(test)]
mod tests {
    use crate::model::kind::ContentKind;
    use crate::model::payload::StructuredPayload;
    use crate::validate::{validate_create, validate_promote, ContentInput};
    use serde_json::json;

    #[test]
    fn blank_tags_do_not_count() {
        let input = ContentInput::json(json!({
            "date": "2026-04-01",
            "signal": "Competitor launched pricing page",
            "tags": ["  ", ""]
        }));
        let summary = validate_promote(ContentKind::SignalLog, &input);
        assert_eq!(summary.error_codes(), vec!["signal_log_tags_missing"]);
    }

    #[test]
    fn normalized_entry_is_trimmed() {
        let input = ContentInput::json(json!({
            "date": " 2026-04-01 ",
            "signal": "Pricing change",
            "tags": [" Pricing "],
            "link": "  "
        }));
        let summary = validate_create(ContentKind::SignalLog, &input);
        assert!(summary.ok);
        assert!(summary.warnings.is_empty());
        match summary.normalized {
            Some(StructuredPayload::SignalLog(entry)) => {
                assert_eq!(entry.date, "2026-04-01");
                assert_eq!(entry.tags, vec!["Pricing"]);
                assert_eq!(entry.link, None);
            }
            other => panic!("unexpected normalized payload: {other:?}"),
        }
    }
}
