//! Typed wrappers over [`ApiClient`], one per resource.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::jobs::slug::{slugify, unique_slug};
use crate::models::assessment::{Assessment, AssessmentUpsert, NewAssessment};
use crate::models::candidate::{
    Candidate, CandidatePatch, NewCandidate, TimelineEvent, TimelineResponse,
};
use crate::models::job::{Job, JobPatch, JobStatus, NewJob};
use crate::models::now_ms;
use crate::models::page::Page;
use crate::models::SuccessResponse;

use super::{ApiClient, ClientError, Method, RequestOptions, Transport};

/// Page size used when the whole board is needed for slug de-duplication.
const ALL_JOBS_PAGE_SIZE: usize = 1000;

fn json_body<B: Serialize>(body: &B) -> Result<Value, ClientError> {
    Ok(serde_json::to_value(body)?)
}

#[derive(Debug, Clone, Default)]
pub struct JobListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub stage: Option<String>,
    pub job_id: Option<String>,
}

pub struct JobsService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> JobsService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &JobListParams) -> Result<Page<Job>, ClientError> {
        let options = RequestOptions::get()
            .param("page", params.page)
            .param("pageSize", params.page_size)
            .param("search", params.search.as_deref())
            .param("status", params.status.as_deref());
        self.client.request_as("jobs", options).await
    }

    pub async fn get(&self, id: &str) -> Result<Job, ClientError> {
        self.client
            .request_as(&format!("jobs/{id}"), RequestOptions::get())
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Job, ClientError> {
        self.client
            .request_as(&format!("jobs/by-slug/{slug}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, job: &NewJob) -> Result<Job, ClientError> {
        let options = RequestOptions::with_method(Method::POST).body(json_body(job)?);
        self.client.request_as("jobs", options).await
    }

    /// Creates an active job whose slug is made unique against the current
    /// board. An empty slug is derived from the title first.
    pub async fn create_with_unique_slug(&self, mut job: NewJob) -> Result<Job, ClientError> {
        let base = if job.slug.is_empty() {
            slugify(&job.title)
        } else {
            job.slug.clone()
        };
        let existing: HashSet<String> = self
            .list(&JobListParams {
                page: Some(1),
                page_size: Some(ALL_JOBS_PAGE_SIZE),
                ..Default::default()
            })
            .await?
            .items
            .into_iter()
            .map(|j| j.slug)
            .collect();

        job.slug = unique_slug(&base, &existing);
        job.id.get_or_insert_with(|| Uuid::new_v4().to_string());
        job.status.get_or_insert(JobStatus::Active);
        job.created_at.get_or_insert_with(now_ms);
        self.create(&job).await
    }

    pub async fn patch(&self, id: &str, patch: &JobPatch) -> Result<Job, ClientError> {
        let options = RequestOptions::with_method(Method::PATCH).body(json_body(patch)?);
        self.client.request_as(&format!("jobs/{id}"), options).await
    }

    pub async fn reorder(
        &self,
        id: &str,
        from_order: i64,
        to_order: i64,
    ) -> Result<SuccessResponse, ClientError> {
        let options = RequestOptions::with_method(Method::PATCH).body(serde_json::json!({
            "fromOrder": from_order,
            "toOrder": to_order,
        }));
        self.client
            .request_as(&format!("jobs/{id}/reorder"), options)
            .await
    }

    pub async fn archive(&self, id: &str) -> Result<Job, ClientError> {
        self.set_status(id, JobStatus::Archived).await
    }

    pub async fn restore(&self, id: &str) -> Result<Job, ClientError> {
        self.set_status(id, JobStatus::Active).await
    }

    /// Archives an active job or restores an archived one. A job without a
    /// status counts as active.
    pub async fn toggle_archived(&self, job: &Job) -> Result<Job, ClientError> {
        let next = job.status.unwrap_or(JobStatus::Active).toggled();
        self.set_status(&job.id, next).await
    }

    async fn set_status(&self, id: &str, status: JobStatus) -> Result<Job, ClientError> {
        self.patch(
            id,
            &JobPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }
}

pub struct CandidatesService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CandidatesService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &CandidateListParams) -> Result<Page<Candidate>, ClientError> {
        let options = RequestOptions::get()
            .param("page", params.page)
            .param("pageSize", params.page_size)
            .param("search", params.search.as_deref())
            .param("stage", params.stage.as_deref())
            .param("jobId", params.job_id.as_deref());
        self.client.request_as("candidates", options).await
    }

    pub async fn get(&self, id: &str) -> Result<Candidate, ClientError> {
        self.client
            .request_as(&format!("candidates/{id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, candidate: &NewCandidate) -> Result<Candidate, ClientError> {
        let options = RequestOptions::with_method(Method::POST).body(json_body(candidate)?);
        self.client.request_as("candidates", options).await
    }

    pub async fn patch(&self, id: &str, patch: &CandidatePatch) -> Result<Candidate, ClientError> {
        let options = RequestOptions::with_method(Method::PATCH).body(json_body(patch)?);
        self.client
            .request_as(&format!("candidates/{id}"), options)
            .await
    }

    pub async fn timeline(&self, id: &str) -> Result<Vec<TimelineEvent>, ClientError> {
        let response: TimelineResponse = self
            .client
            .request_as(&format!("candidates/{id}/timeline"), RequestOptions::get())
            .await?;
        Ok(response.timeline)
    }
}

pub struct AssessmentsService<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> AssessmentsService<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Assessment>, ClientError> {
        self.client
            .request_as("assessments", RequestOptions::get())
            .await
    }

    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Assessment>, ClientError> {
        self.client
            .request_as(&format!("assessments/job/{job_id}"), RequestOptions::get())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Assessment, ClientError> {
        self.client
            .request_as(&format!("assessments/{id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, assessment: &NewAssessment) -> Result<Assessment, ClientError> {
        let options = RequestOptions::with_method(Method::POST).body(json_body(assessment)?);
        self.client.request_as("assessments", options).await
    }

    pub async fn replace(
        &self,
        job_id: &str,
        assessment: &AssessmentUpsert,
    ) -> Result<Assessment, ClientError> {
        let options = RequestOptions::with_method(Method::PUT).body(json_body(assessment)?);
        self.client
            .request_as(&format!("assessments/{job_id}"), options)
            .await
    }

    pub async fn submit(&self, job_id: &str, response: &Value) -> Result<(), ClientError> {
        let options = RequestOptions::with_method(Method::POST).body(response.clone());
        self.client
            .request(&format!("assessments/{job_id}/submit"), options)
            .await?;
        Ok(())
    }
}
