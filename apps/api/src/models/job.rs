use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, Document};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Archived => "archived",
        }
    }

    /// The status an archive/restore toggle moves to.
    pub fn toggled(&self) -> JobStatus {
        match self {
            JobStatus::Active => JobStatus::Archived,
            JobStatus::Archived => JobStatus::Active,
        }
    }
}

/// A job posting on the board. `order` is the 1-based board position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Client-supplied; the server never derives or rewrites it.
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub order: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub summary: String,
}

impl Document for Job {
    const COLLECTION: Collection = Collection::Jobs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Job {
    /// Case-insensitive substring match on title or any tag. `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Body of `POST /api/jobs`. Everything is optional; the server assigns `order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub summary: String,
}

impl NewJob {
    pub fn into_job(self, order: i64, now_ms: i64) -> Job {
        Job {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: self.title,
            slug: self.slug,
            status: self.status,
            tags: self.tags,
            order,
            created_at: self.created_at.unwrap_or(now_ms),
            summary: self.summary,
        }
    }
}

/// Body of `PATCH /api/jobs/:id`. Fields present replace the stored value wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl JobPatch {
    pub fn apply(self, mut job: Job) -> Job {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(slug) = self.slug {
            job.slug = slug;
        }
        if let Some(status) = self.status {
            job.status = Some(status);
        }
        if let Some(tags) = self.tags {
            job.tags = tags;
        }
        if let Some(summary) = self.summary {
            job.summary = summary;
        }
        job
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    /// Informational only; the stored position of the job is authoritative.
    #[serde(default)]
    pub from_order: Option<i64>,
    pub to_order: i64,
}
