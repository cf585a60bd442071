//! Blog feature rules: frontmatter metadata plus a long-form body.
//!
//! Create-time parsing is loose; promotion re-parses raw input strictly so a
//! half-written frontmatter block cannot reach review.

use super::{require_text, trim_list, trim_owned, KindRules, Parsed, ValidationMode};
use crate::model::issue::{Issue, ValidationSummary};
use crate::model::kind::ContentKind;
use crate::model::payload::{BlogFeaturePayload, StructuredPayload};
use crate::parse::{
    parse_frontmatter_loose, parse_frontmatter_strict, Frontmatter, FrontmatterValue,
};

pub const BLOG_BODY_MIN_CHARS: usize = 300;

const LIST_KEYS: [&str; 3] = ["related_keywords", "internal_links", "source_links"];

pub(crate) struct BlogFeatureRules;

/// Maps parsed frontmatter onto the blog feature payload.
pub fn blog_feature_from_frontmatter(frontmatter: &Frontmatter) -> BlogFeaturePayload {
    BlogFeaturePayload {
        title: frontmatter.get_text("title"),
        primary_keyword: frontmatter.get_text("primary_keyword"),
        related_keywords: frontmatter.get_list("related_keywords"),
        internal_links: frontmatter.get_list("internal_links"),
        source_links: frontmatter.get_list("source_links"),
        body: frontmatter.body().to_string(),
    }
}

impl KindRules for BlogFeatureRules {
    type Payload = BlogFeaturePayload;

    const KIND: ContentKind = ContentKind::BlogFeature;
    const REQUIRES_STRUCTURED_PAYLOAD: bool = false;

    fn from_structured(payload: StructuredPayload) -> Option<Self::Payload> {
        match payload {
            StructuredPayload::BlogFeature(payload) => Some(payload),
            _ => None,
        }
    }

    fn into_structured(payload: Self::Payload) -> StructuredPayload {
        StructuredPayload::BlogFeature(payload)
    }

    fn parse_raw(raw: &str, mode: ValidationMode) -> Option<Parsed<Self::Payload>> {
        let mut errors = Vec::new();
        let frontmatter = match mode {
            ValidationMode::Create => parse_frontmatter_loose(raw),
            ValidationMode::Promote => match parse_frontmatter_strict(raw) {
                Ok(frontmatter) => frontmatter,
                Err(err) => {
                    errors.push(
                        Issue::new("blog_feature_parse", err.to_string())
                            .with_hint("wrap title/primary_keyword in a `---` block"),
                    );
                    parse_frontmatter_loose(raw)
                }
            },
        };

        let mut warnings = Vec::new();
        if !frontmatter.has_frontmatter() && mode == ValidationMode::Create {
            warnings.push(
                Issue::new(
                    "blog_feature_frontmatter_missing",
                    "no `---` frontmatter block found; the whole input is treated as body",
                )
                .with_hint("add title and primary_keyword in a leading `---` block"),
            );
        }
        warnings.extend(malformed_list_warnings(&frontmatter));

        Some(Parsed {
            payload: blog_feature_from_frontmatter(&frontmatter),
            warnings,
            errors,
        })
    }

    fn normalize(payload: Self::Payload) -> Self::Payload {
        BlogFeaturePayload {
            title: trim_owned(payload.title),
            primary_keyword: trim_owned(payload.primary_keyword),
            related_keywords: trim_list(payload.related_keywords),
            internal_links: trim_list(payload.internal_links),
            source_links: trim_list(payload.source_links),
            body: trim_owned(payload.body),
        }
    }

    fn create_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Create);
    }

    fn promote_checks(payload: &Self::Payload, summary: &mut ValidationSummary) {
        checks(payload, summary, ValidationMode::Promote);
    }
}

fn checks(payload: &BlogFeaturePayload, summary: &mut ValidationSummary, mode: ValidationMode) {
    require_text(
        summary,
        mode,
        &payload.title,
        "blog_feature_title_missing",
        "blog feature needs a title",
    );
    require_text(
        summary,
        mode,
        &payload.primary_keyword,
        "blog_feature_keyword_missing",
        "blog feature needs a primary keyword",
    );

    let length = payload.body.chars().count();
    if length < BLOG_BODY_MIN_CHARS {
        let issue = Issue::new(
            "blog_feature_body_short",
            format!("body has {length} characters; expected at least {BLOG_BODY_MIN_CHARS}"),
        );
        match mode {
            ValidationMode::Create => summary.warn(issue),
            ValidationMode::Promote => summary.error(issue),
        }
    }
}

/// Flags list keys that fell back to a scalar.
///
/// Covers unbalanced `[` values and comma-separated scalars, both of which
/// are usually a missing bracket rather than a single keyword.
fn malformed_list_warnings(frontmatter: &Frontmatter) -> Vec<Issue> {
    LIST_KEYS
        .iter()
        .filter(|key| {
            let unbalanced = frontmatter
                .malformed_lists()
                .iter()
                .any(|malformed| malformed.as_str() == **key);
            let comma_scalar = matches!(
                frontmatter.get(key),
                Some(FrontmatterValue::Scalar(value)) if value.contains(',')
            );
            unbalanced || comma_scalar
        })
        .map(|key| {
            Issue::new(
                "blog_feature_list_malformed",
                format!("`{key}` was read as a single value"),
            )
            .with_hint(format!("write `{key}: [a, b]` or one `- item` per line"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::BLOG_BODY_MIN_CHARS;
    use crate::model::kind::ContentKind;
    use crate::model::payload::{BlogFeaturePayload, StructuredPayload};
    use crate::validate::{validate_create, validate_promote, ContentInput};

    fn feature_with_body(length: usize) -> String {
        format!(
            "---\ntitle: Queue age\nprimary_keyword: queues\n---\n{}",
            "a".repeat(length)
        )
    }

    #[test]
    fn body_length_boundary_is_three_hundred() {
        let short = validate_promote(
            ContentKind::BlogFeature,
            &ContentInput::raw(feature_with_body(BLOG_BODY_MIN_CHARS - 1)),
        );
        assert_eq!(short.error_codes(), vec!["blog_feature_body_short"]);

        let exact = validate_promote(
            ContentKind::BlogFeature,
            &ContentInput::raw(feature_with_body(BLOG_BODY_MIN_CHARS)),
        );
        assert!(exact.ok, "{exact}");
    }

    #[test]
    fn frontmatter_lists_reach_normalized_payload() {
        let summary = validate_create(
            ContentKind::BlogFeature,
            &ContentInput::raw(
                "---\ntitle: \"Example\"\nrelated_keywords:\n  - ops\n  - ai\n---\nBody text",
            ),
        );
        assert!(summary.ok);
        match summary.normalized {
            Some(StructuredPayload::BlogFeature(feature)) => {
                assert_eq!(feature.title, "Example");
                assert_eq!(feature.related_keywords, vec!["ops", "ai"]);
                assert_eq!(feature.body, "Body text");
            }
            other => panic!("unexpected normalized payload: {other:?}"),
        }
    }

    #[test]
    fn promotion_requires_frontmatter_block() {
        let body = "b".repeat(BLOG_BODY_MIN_CHARS);
        let summary = validate_promote(ContentKind::BlogFeature, &ContentInput::raw(body));
        assert!(!summary.ok);
        assert_eq!(summary.error_codes()[0], "blog_feature_parse");
        assert!(summary.normalized.is_some());
    }

    #[test]
    fn create_without_frontmatter_only_warns() {
        let summary = validate_create(ContentKind::BlogFeature, &ContentInput::raw("draft body"));
        assert!(summary.ok);
        assert!(summary
            .warning_codes()
            .contains(&"blog_feature_frontmatter_missing"));
    }

    #[test]
    fn malformed_lists_warn() {
        let summary = validate_create(
            ContentKind::BlogFeature,
            &ContentInput::raw(
                "---\ntitle: T\nrelated_keywords: [ops, ai\nsource_links: a, b\n---\nBody",
            ),
        );
        let malformed = summary
            .warnings
            .iter()
            .filter(|issue| issue.code == "blog_feature_list_malformed")
            .count();
        assert_eq!(malformed, 2);
    }

    #[test]
    fn typed_draft_payload_promotes_without_raw_input() {
        let payload = BlogFeaturePayload {
            title: "T".to_string(),
            primary_keyword: "k".to_string(),
            body: "x".repeat(BLOG_BODY_MIN_CHARS),
            ..BlogFeaturePayload::default()
        };
        let summary = validate_promote(
            ContentKind::BlogFeature,
            &ContentInput::typed(StructuredPayload::BlogFeature(payload)),
        );
        assert!(summary.ok);
    }
}
