use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::models::assessment::{ChoiceOption, Question, QuestionType};

use super::MIN_SEEDED_ASSESSMENTS;

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

/// Data tables the seed generator draws from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub jobs: Vec<JobTemplate>,
    /// Candidate profile blurbs keyed by a job's primary tag.
    #[serde(default)]
    pub profiles: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub assessments: Vec<AssessmentTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTemplate {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// An assessment attached to the seeded job whose title is `job_title`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentTemplate {
    pub job_title: String,
    pub title: String,
    /// How long before the seeding run the assessment claims to have been created.
    #[serde(default)]
    pub age_days: i64,
    pub sections: Vec<SectionTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionTemplate {
    pub title: String,
    pub questions: Vec<QuestionTemplate>,
}

/// A question without its id; ids are minted per seeding run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTemplate {
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub file_types: Option<String>,
    pub max_file_size: Option<f64>,
    pub allow_multiple: Option<bool>,
}

impl QuestionTemplate {
    pub fn instantiate(&self, id: String) -> Question {
        Question {
            id,
            label: self.label.clone(),
            question_type: self.question_type,
            required: self.required,
            options: self.options.clone(),
            min: self.min,
            max: self.max,
            condition: None,
            file_types: self.file_types.clone(),
            max_file_size: self.max_file_size,
            allow_multiple: self.allow_multiple,
        }
    }
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::parse(BUILTIN_CATALOG).context("Built-in seed catalog is invalid")
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed catalog {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid seed catalog {}", path.display()))
    }

    /// Loads `path` when given, otherwise the built-in catalog.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Assessment templates that will attach to a seeded job.
    pub fn attached_assessments(&self) -> usize {
        self.assessments
            .iter()
            .filter(|a| self.jobs.iter().any(|j| j.title == a.job_title))
            .count()
    }

    fn parse(raw: &str) -> anyhow::Result<Self> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        if catalog.first_names.is_empty() || catalog.last_names.is_empty() {
            bail!("catalog needs at least one first name and one last name");
        }
        if catalog.jobs.is_empty() {
            bail!("catalog needs at least one job template");
        }
        // Fewer seeded assessments than the guard expects would make every
        // seeding run wipe the store.
        let attached = catalog.attached_assessments();
        if attached < MIN_SEEDED_ASSESSMENTS {
            bail!(
                "catalog needs at least {MIN_SEEDED_ASSESSMENTS} assessment templates \
                 whose jobTitle names a job template, found {attached}"
            );
        }
        Ok(catalog)
    }
}
