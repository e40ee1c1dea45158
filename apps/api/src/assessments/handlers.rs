//! Axum route handlers for the Assessments API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::assessments::{insert_with_retry, record_submission};
use crate::errors::AppError;
use crate::models::assessment::{validate_sections, Assessment, AssessmentUpsert, NewAssessment};
use crate::models::now_ms;
use crate::models::SuccessResponse;
use crate::state::AppState;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// GET /api/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Assessment>>, AppError> {
    let assessments: Vec<Assessment> = state.store.to_array().await?;
    Ok(Json(assessments))
}

/// GET /api/assessments/job/:jobId
pub async fn handle_list_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<Assessment>>, AppError> {
    let assessments = state
        .store
        .index::<Assessment>("jobId")?
        .equals(job_id)
        .await?;
    Ok(Json(assessments))
}

/// GET /api/assessments/:id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assessment>, AppError> {
    let assessment = state
        .store
        .get::<Assessment>(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    Ok(Json(assessment))
}

/// POST /api/assessments
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    Json(payload): Json<NewAssessment>,
) -> Result<(StatusCode, Json<Assessment>), AppError> {
    state.simulation.check_write("create assessment")?;

    let job_id = payload
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job ID is required".to_string()))?;
    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Assessment title is required".to_string()))?;
    let sections = payload.sections.unwrap_or_default();
    validate_sections(&sections).map_err(AppError::Validation)?;

    let assessment = Assessment {
        id: new_id(),
        job_id,
        title,
        sections,
        created_at: now_ms(),
        responses: vec![],
    };
    let created = insert_with_retry(&state.store, assessment, new_id).await?;

    info!(
        "Created assessment {} for job {} with {} sections",
        created.id,
        created.job_id,
        created.sections.len()
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/assessments/:jobId
///
/// Wholesale upsert keyed by the body's `id`. The job id always comes from
/// the path. Responses already stored survive when the body omits them.
/// Sections are stored as sent; only create checks condition order and ranges.
pub async fn handle_replace_assessment(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(payload): Json<AssessmentUpsert>,
) -> Result<Json<Assessment>, AppError> {
    state.simulation.check_write("replace assessment")?;

    let id = payload.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id);
    let existing = state.store.get::<Assessment>(&id).await?;

    let responses = match (payload.responses, &existing) {
        (Some(responses), _) => responses,
        (None, Some(previous)) => previous.responses.clone(),
        (None, None) => vec![],
    };
    let created_at = payload
        .created_at
        .or_else(|| existing.as_ref().map(|a| a.created_at))
        .unwrap_or_else(now_ms);

    let assessment = Assessment {
        id,
        job_id,
        title: payload.title,
        sections: payload.sections,
        created_at,
        responses,
    };
    state.store.put(&assessment).await?;

    info!(
        "Saved assessment {} for job {}",
        assessment.id, assessment.job_id
    );
    Ok(Json(assessment))
}

/// POST /api/assessments/:jobId/submit
pub async fn handle_submit_response(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(response): Json<Value>,
) -> Result<(StatusCode, Json<SuccessResponse>), AppError> {
    state.simulation.check_write("submit assessment")?;

    let assessment = record_submission(&state.store, &job_id, response, now_ms()).await?;

    info!(
        "Recorded response #{} on assessment {} (job {job_id})",
        assessment.responses.len(),
        assessment.id
    );
    Ok((StatusCode::CREATED, Json(SuccessResponse::ok())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::services::AssessmentsService;
    use crate::client::ClientError;
    use crate::models::assessment::{
        Assessment, AssessmentResponse, AssessmentSection, AssessmentUpsert, ChoiceOption,
        NewAssessment, Question, QuestionCondition, QuestionType,
    };
    use crate::testing::{test_app, test_app_failing};

    fn yes_no(id: &str, condition: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            label: format!("Question {id}"),
            question_type: QuestionType::SingleChoice,
            required: true,
            options: vec![
                ChoiceOption {
                    value: "Yes".to_string(),
                },
                ChoiceOption {
                    value: "No".to_string(),
                },
            ],
            min: None,
            max: None,
            condition: condition.map(|q| QuestionCondition {
                question_id: q.to_string(),
                value: "Yes".to_string(),
            }),
            file_types: None,
            max_file_size: None,
            allow_multiple: None,
        }
    }

    fn sections(questions: Vec<Question>) -> Vec<AssessmentSection> {
        vec![AssessmentSection {
            id: "s1".to_string(),
            title: "Basics".to_string(),
            questions,
        }]
    }

    fn new_assessment(job_id: &str, title: &str) -> NewAssessment {
        NewAssessment {
            job_id: Some(job_id.to_string()),
            title: Some(title.to_string()),
            sections: Some(sections(vec![yes_no("q1", None), yes_no("q2", Some("q1"))])),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_by_id_and_job() {
        let (_state, client) = test_app().await;
        let assessments = AssessmentsService::new(&client);

        let created = assessments
            .create(&new_assessment("j1", "Screening"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert!(created.created_at > 0);
        assert_eq!(created.sections[0].questions.len(), 2);

        assert_eq!(assessments.get(&created.id).await.unwrap(), created);
        let for_job = assessments.list_for_job("j1").await.unwrap();
        assert_eq!(for_job, vec![created.clone()]);
        assert!(assessments.list_for_job("j2").await.unwrap().is_empty());
        assert_eq!(assessments.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_job_and_title() {
        let (state, client) = test_app().await;
        let assessments = AssessmentsService::new(&client);

        for (payload, expected) in [
            (
                NewAssessment {
                    title: Some("Screening".to_string()),
                    ..Default::default()
                },
                "Job ID is required",
            ),
            (
                NewAssessment {
                    job_id: Some("j1".to_string()),
                    title: Some("  ".to_string()),
                    ..Default::default()
                },
                "Assessment title is required",
            ),
        ] {
            match assessments.create(&payload).await.unwrap_err() {
                ClientError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, expected);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(state.store.count::<Assessment>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_forward_condition() {
        let (_state, client) = test_app().await;
        let err = AssessmentsService::new(&client)
            .create(&NewAssessment {
                job_id: Some("j1".to_string()),
                title: Some("Broken".to_string()),
                sections: Some(sections(vec![yes_no("q1", Some("q2")), yes_no("q2", None)])),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_get_missing_assessment_is_404() {
        let (_state, client) = test_app().await;
        let err = AssessmentsService::new(&client)
            .get("ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_replace_forces_path_job_and_keeps_responses() {
        let (_state, client) = test_app().await;
        let assessments = AssessmentsService::new(&client);
        let created = assessments
            .create(&new_assessment("j1", "Screening"))
            .await
            .unwrap();
        assessments
            .submit("j1", &json!({"q1": "Yes"}))
            .await
            .unwrap();

        let replaced = assessments
            .replace(
                "j1",
                &AssessmentUpsert {
                    id: Some(created.id.clone()),
                    job_id: Some("someone-else".to_string()),
                    title: "Screening v2".to_string(),
                    sections: sections(vec![yes_no("q1", None)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.job_id, "j1");
        assert_eq!(replaced.title, "Screening v2");
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(replaced.responses.len(), 1);
        assert_eq!(assessments.get(&created.id).await.unwrap(), replaced);
    }

    #[tokio::test]
    async fn test_replace_stores_sections_unchecked() {
        let (_state, client) = test_app().await;
        let saved = AssessmentsService::new(&client)
            .replace(
                "j1",
                &AssessmentUpsert {
                    title: "Draft".to_string(),
                    sections: sections(vec![yes_no("q1", Some("q2")), yes_no("q2", None)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            saved.sections[0].questions[0]
                .condition
                .as_ref()
                .map(|c| c.question_id.as_str()),
            Some("q2")
        );
    }

    #[tokio::test]
    async fn test_replace_without_id_inserts() {
        let (_state, client) = test_app().await;
        let assessments = AssessmentsService::new(&client);
        let saved = assessments
            .replace(
                "j9",
                &AssessmentUpsert {
                    title: "Fresh".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.job_id, "j9");
        assert_eq!(assessments.list_for_job("j9").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_assessment_creates_shell() {
        let (state, client) = test_app().await;
        AssessmentsService::new(&client)
            .submit("j5", &json!({"q1": "No", "notes": "n/a"}))
            .await
            .unwrap();

        let stored = state
            .store
            .index::<Assessment>("jobId")
            .unwrap()
            .equals("j5")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "");
        let AssessmentResponse { response, .. } = &stored[0].responses[0];
        assert_eq!(response["notes"], "n/a");
    }

    #[tokio::test]
    async fn test_failed_submit_records_nothing() {
        let (state, client) = test_app_failing().await;
        let err = AssessmentsService::new(&client)
            .submit("j1", &json!({"q1": "Yes"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert_eq!(state.store.count::<Assessment>().await.unwrap(), 0);
    }
}
