//! Report Extractor — maps the model's free-text reply onto a fixed `AnalysisReport`.
//!
//! Extraction is driven by `FIELD_RULES`: one row per W with its separator
//! pattern and the status/justification reported for it. Matching is
//! line-anchored: a line must start with the label, optionally behind a list
//! marker (`-`, `*`, `+`, `•`, `>`, `#`, `1.`, `1)`) and markdown emphasis,
//! followed by `:` or `-`. The first such line supplies the justification; if
//! there is none, or its text is empty, the row's default is used.
//!
//! The reported status is taken from the table regardless of whether the field
//! was found.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::models::{AnalysisReport, ErrorResult, Field, FieldAssessment, FieldStatus};

pub const DEFAULT_JUSTIFICATION: &str = "Missing details";
pub const DEFAULT_WHEN_JUSTIFICATION: &str =
    "No date or time for the interaction was identified in the note";
pub const DEFAULT_WHERE_JUSTIFICATION: &str =
    "No location or channel for the interaction was identified in the note";

pub const OVERALL_QUALITY: &str = "Needs Improvement";

pub const SUGGESTIONS: [&str; 4] = [
    "Identify every participant by name and role (client, relationship manager, other attendees).",
    "State the date and time of the interaction explicitly.",
    "Record where the interaction took place or the channel used (branch, phone, video call, email).",
    "Explain the purpose of the contact and any agreed next steps or follow-up actions.",
];

/// Separator between a label and its justification: a colon or a hyphen.
const LABEL_SEPARATOR: &str = r"[:\-]";

/// One row of the extraction table.
#[derive(Debug, Clone, Copy)]
struct FieldRule {
    field: Field,
    separator: &'static str,
    status: FieldStatus,
    default_justification: &'static str,
}

const FIELD_RULES: [FieldRule; 5] = [
    FieldRule {
        field: Field::Who,
        separator: LABEL_SEPARATOR,
        status: FieldStatus::Partial,
        default_justification: DEFAULT_JUSTIFICATION,
    },
    FieldRule {
        field: Field::What,
        separator: LABEL_SEPARATOR,
        status: FieldStatus::Partial,
        default_justification: DEFAULT_JUSTIFICATION,
    },
    FieldRule {
        field: Field::Why,
        separator: LABEL_SEPARATOR,
        status: FieldStatus::Partial,
        default_justification: DEFAULT_JUSTIFICATION,
    },
    FieldRule {
        field: Field::When,
        separator: LABEL_SEPARATOR,
        status: FieldStatus::No,
        default_justification: DEFAULT_WHEN_JUSTIFICATION,
    },
    FieldRule {
        field: Field::Where,
        separator: LABEL_SEPARATOR,
        status: FieldStatus::No,
        default_justification: DEFAULT_WHERE_JUSTIFICATION,
    },
];

/// A table row with its compiled pattern.
struct FieldPattern {
    rule: FieldRule,
    regex: Regex,
}

impl FieldPattern {
    fn compile(rule: FieldRule) -> Result<Self, regex::Error> {
        // Start of line, optional list marker, optional `**` emphasis, the label
        // as a whole word, separator, then the rest of that line only.
        // `[ \t]` rather than `\s` keeps the match on one line.
        let pattern = format!(
            r"(?im)^[ \t]*(?:[-*+•>]|#{{1,6}}|\d+[.)])?[ \t*]*{label}\b[ \t*]*{sep}[ \t]*([^\r\n]*)",
            label = regex::escape(rule.field.label()),
            sep = rule.separator,
        );
        Ok(Self {
            rule,
            regex: Regex::new(&pattern)?,
        })
    }

    /// Justification from the first line labelled with this field. An empty
    /// remainder on that line counts as not found.
    fn find<'a>(&self, raw_output: &'a str) -> Option<&'a str> {
        self.regex
            .captures(raw_output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_matches(|c: char| c.is_whitespace() || c == '*'))
            .filter(|text| !text.is_empty())
    }

    fn assess(&self, raw_output: &str) -> FieldAssessment {
        let justification = self
            .find(raw_output)
            .unwrap_or(self.rule.default_justification);
        FieldAssessment {
            status: self.rule.status,
            justification: justification.to_string(),
        }
    }
}

static FIELD_PATTERNS: LazyLock<Result<Vec<FieldPattern>, regex::Error>> =
    LazyLock::new(|| FIELD_RULES.into_iter().map(FieldPattern::compile).collect());

/// Maps raw model output to an `AnalysisReport`.
///
/// Never panics; a pattern table that fails to compile is reported as an
/// `ExtractionFailure` carrying the raw output.
pub fn extract_report(raw_output: &str) -> Result<AnalysisReport, ErrorResult> {
    let patterns = FIELD_PATTERNS.as_ref().map_err(|e| {
        ErrorResult::extraction(format!("Failed to compile field patterns: {e}"), raw_output)
    })?;

    let assess = |field: Field| -> Result<FieldAssessment, ErrorResult> {
        patterns
            .iter()
            .find(|p| p.rule.field == field)
            .map(|p| p.assess(raw_output))
            .ok_or_else(|| {
                ErrorResult::extraction(
                    format!("No extraction rule for field '{}'", field.label()),
                    raw_output,
                )
            })
    };

    Ok(AnalysisReport {
        who: assess(Field::Who)?,
        what: assess(Field::What)?,
        why: assess(Field::Why)?,
        when: assess(Field::When)?,
        r#where: assess(Field::Where)?,
        overall_quality: OVERALL_QUALITY.to_string(),
        suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    })
}
