use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How well a note covers one of the five Ws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    // Part of the response contract; the extractor currently assigns fixed statuses.
    #[allow(dead_code)]
    Yes,
    Partial,
    No,
}

/// The five fields a complete Client Contact Note should address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Who,
    What,
    Why,
    When,
    Where,
}

impl Field {
    /// The label the model is asked to use, and the one the extractor looks for.
    pub fn label(self) -> &'static str {
        match self {
            Field::Who => "Who",
            Field::What => "What",
            Field::Why => "Why",
            Field::When => "When",
            Field::Where => "Where",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssessment {
    pub status: FieldStatus,
    pub justification: String,
}

/// Structured assessment of a single note. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub who: FieldAssessment,
    pub what: FieldAssessment,
    pub why: FieldAssessment,
    pub when: FieldAssessment,
    pub r#where: FieldAssessment,
    pub overall_quality: String,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
impl AnalysisReport {
    pub fn field(&self, field: Field) -> &FieldAssessment {
        match field {
            Field::Who => &self.who,
            Field::What => &self.what,
            Field::Why => &self.why,
            Field::When => &self.when,
            Field::Where => &self.r#where,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    GenerationFailure,
    ExtractionFailure,
}

/// Returned in place of an `AnalysisReport` when generation or extraction fails.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct ErrorResult {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ErrorResult {
    pub fn generation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::GenerationFailure,
            message: message.into(),
            raw_output: None,
        }
    }

    pub fn extraction(message: impl Into<String>, raw_output: &str) -> Self {
        Self {
            kind: ErrorKind::ExtractionFailure,
            message: message.into(),
            raw_output: Some(raw_output.to_string()),
        }
    }
}
