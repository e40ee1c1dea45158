// Assessment builder: many assessments per job, each identified by its own id.
// Submissions are appended to the newest assessment of the job.

pub mod handlers;

use anyhow::anyhow;
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{Assessment, AssessmentResponse};
use crate::store::{Store, StoreError};

/// Inserts `assessment`; on an id collision regenerates the id via `next_id`
/// and tries exactly once more.
pub async fn insert_with_retry(
    store: &Store,
    mut assessment: Assessment,
    mut next_id: impl FnMut() -> String,
) -> Result<Assessment, AppError> {
    match store.add(&assessment).await {
        Ok(()) => return Ok(assessment),
        Err(StoreError::Constraint { id, .. }) => {
            warn!("Assessment id {id} already taken, retrying with a fresh id");
            assessment.id = next_id();
        }
        Err(e) => return Err(e.into()),
    }

    match store.add(&assessment).await {
        Ok(()) => Ok(assessment),
        Err(e) => {
            error!("Retry of assessment insert failed: {e}");
            Err(AppError::Internal(anyhow!("Failed to create assessment: {e}")))
        }
    }
}

/// Newest assessment attached to `job_id`, by `createdAt`.
pub async fn latest_for_job(store: &Store, job_id: &str) -> Result<Option<Assessment>, StoreError> {
    let assessments = store.index::<Assessment>("jobId")?.equals(job_id).await?;
    Ok(assessments.into_iter().max_by_key(|a| a.created_at))
}

/// Records a submission on the job's newest assessment, creating an empty
/// shell assessment for the job if it has none yet.
pub async fn record_submission(
    store: &Store,
    job_id: &str,
    response: Value,
    now_ms: i64,
) -> Result<Assessment, StoreError> {
    let mut assessment = match latest_for_job(store, job_id).await? {
        Some(existing) => existing,
        None => Assessment {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            title: String::new(),
            sections: vec![],
            created_at: now_ms,
            responses: vec![],
        },
    };
    assessment.responses.push(AssessmentResponse {
        id: Uuid::new_v4().to_string(),
        created_at: now_ms,
        response,
    });
    store.put(&assessment).await?;
    Ok(assessment)
}
