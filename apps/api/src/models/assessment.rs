use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Collection, Document};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    ShortText,
    LongText,
    Numeric,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
    pub value: String,
}

/// Visibility predicate: show the question only when `question_id` was answered with `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCondition {
    pub question_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<QuestionCondition>,
    /// Comma-separated extension list, e.g. `.pdf,.doc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_types: Option<String>,
    /// Megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A candidate submission stored on its assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: String,
    pub created_at: i64,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub job_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<AssessmentSection>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<AssessmentResponse>,
}

impl Document for Assessment {
    const COLLECTION: Collection = Collection::Assessments;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Checks the builder invariants the UI relies on: conditions point at a
/// question that appears earlier, and numeric bounds are ordered.
pub fn validate_sections(sections: &[AssessmentSection]) -> Result<(), String> {
    let mut seen: HashSet<&str> = HashSet::new();
    for section in sections {
        for question in &section.questions {
            if let Some(condition) = &question.condition {
                if !seen.contains(condition.question_id.as_str()) {
                    return Err(format!(
                        "Question '{}' depends on '{}', which does not precede it",
                        question.label, condition.question_id
                    ));
                }
            }
            if let (Some(min), Some(max)) = (question.min, question.max) {
                if min > max {
                    return Err(format!(
                        "Question '{}' has min {min} greater than max {max}",
                        question.label
                    ));
                }
            }
            seen.insert(question.id.as_str());
        }
    }
    Ok(())
}

/// Body of `POST /api/assessments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<AssessmentSection>>,
}

/// Body of `PUT /api/assessments/:jobId`. The path's job id always wins over
/// any `jobId` in the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<AssessmentSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<AssessmentResponse>>,
}
