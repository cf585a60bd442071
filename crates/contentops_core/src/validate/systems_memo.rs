//! Systems memo rules: thesis, points, example, takeaway.

use super::{require_text, trim_list, trim_owned, KindRules, Parsed, ValidationMode};
use crate::model::issue::{Issue, ValidationSummary};
use crate::model::kind::ContentKind;
use crate::model::payload::{StructuredPayload, SystemsMemoPayload};
use crate::parse::parse_memo_sections;

pub const SYSTEMS_MEMO_MIN_POINTS: usize = 3;

pub(crate) struct SystemsMemoRules;

impl KindRules for SystemsMemoRules {
    type Payload = SystemsMemoPayload;

    const KIND: ContentKind = ContentKind::SystemsMemo;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = false;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::SystemsMemo(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::SystemsMemo(payload)
    }

    fn parse_raw(raw: &str, _mode: ValidationMode) -> Option<Parsed<Self::Payload>> {
        let parsed_memo = parse_memo_sections(raw);
        let mut parsed = Parsed::clean(parsed_memo.memo);
        if parsed_memo.headers_found == 0 {
            parsed.warnings.push(
                Issue::new(
                    "systems_memo_sections_missing",
                    "no `thesis:`, `points:`, `example:` or `takeaway:` headers found",
                )
                .with_hint("start each section with its header, e.g. `Thesis: ...`"),
            );
        }
        Some(parsed)
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        SystemsMemoPayload {
            thesis: trim_owned(payload.thesis),
            points: trim_list(payload.points),
            example: trim_owned(payload.example),
            takeaway: trim_owned(payload.takeaway),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
        require_text(
            summary,
            ValidationMode::Create,
            &payload.example,
            "systems_memo_example_missing",
            "memo has no example",
        );
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &SystemsMemoPayload, summary: &mut ValidationSummary, mode: ValidationMode) {
    require_text(
        summary,
        mode,
        &payload.thesis,
        "systems_memo_thesis_missing",
        "memo needs a thesis",
    );
    require_text(
        summary,
        mode,
        &payload.takeaway,
        "systems_memo_takeaway_missing",
        "memo needs a takeaway",
    );

    let count = payload.points.len();
    if count < SYSTEMS_MEMO_MIN_POINTS {
        let issue = Issue::new(
            "systems_memo_points_count",
            format!("memo has {count} points; expected at least {SYSTEMS_MEMO_MIN_POINTS}"),
        );
        match mode {
            ValidationMode::Create => summary.warn(issue),
            ValidationMode::Promote => summary.error(issue),
        }
    }
}
