//! Decision record rules: every section is mandatory for review.

use super::{require_text, trim_owned, KindRules, ValidationMode};
use crate::model::issue::ValidationSummary;
use crate::model::kind::ContentKind;
use crate::model::payload::{DecisionRecordPayload, StructuredPayload};

pub(crate) struct DecisionRecordRules;

impl KindRules for DecisionRecordRules {
    type Payload = DecisionRecordPayload;

    const KIND: ContentKind = ContentKind::DecisionRecord;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = true;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::DecisionRecord(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::DecisionRecord(payload)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        DecisionRecordPayload {
            context: trim_owned(payload.context),
            decision: trim_owned(payload.decision),
            tradeoffs: trim_owned(payload.tradeoffs),
            outcome: trim_owned(payload.outcome),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &DecisionRecordPayload, summary: &mut ValidationSummary, mode: ValidationMode) {
    let sections = [
        (&payload.context, "decision_record_context_missing", "context"),
        (&payload.decision, "decision_record_decision_missing", "decision"),
        (&payload.tradeoffs, "decision_record_tradeoffs_missing", "tradeoffs"),
        (&payload.outcome, "decision_record_outcome_missing", "outcome"),
    ];
    for (value, code, name) in sections {
        require_text(
            summary,
            mode,
            value,
            code,
            &format!("decision record needs {name}"),
        );
    }
}
