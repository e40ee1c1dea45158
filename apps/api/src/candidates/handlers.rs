use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::candidates::timeline::{apply_patch, new_candidate};
use crate::errors::AppError;
use crate::models::candidate::{
    Candidate, CandidatePatch, ListCandidatesQuery, NewCandidate, TimelineResponse,
};
use crate::models::now_ms;
use crate::models::page::{paginate, Page};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;

fn candidate_not_found() -> AppError {
    AppError::NotFound("Candidate not found".to_string())
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ListCandidatesQuery>,
) -> Result<Json<Page<Candidate>>, AppError> {
    let mut candidates: Vec<Candidate> = match params.job_id.filter(|id| !id.is_empty()) {
        Some(job_id) => state.store.index::<Candidate>("jobId")?.equals(job_id).await?,
        None => state.store.to_array().await?,
    };

    let search = params.search.unwrap_or_default().to_lowercase();
    if !search.is_empty() {
        candidates.retain(|c| c.matches_search(&search));
    }
    if let Some(stage) = params.stage.filter(|s| !s.is_empty()) {
        candidates.retain(|c| c.stage.as_str() == stage);
    }

    Ok(Json(paginate(
        candidates,
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )))
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let candidate = state
        .store
        .get::<Candidate>(&id)
        .await?
        .ok_or_else(candidate_not_found)?;
    Ok(Json(candidate))
}

/// POST /api/candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<NewCandidate>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    state.simulation.check_write("create candidate")?;

    let candidate = new_candidate(payload, now_ms());
    state.store.add(&candidate).await?;

    info!(
        "Created candidate {} at stage {}",
        candidate.id,
        candidate.stage.as_str()
    );
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// PATCH /api/candidates/:id
///
/// Stage changes append to the timeline; see [`apply_patch`].
pub async fn handle_patch_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CandidatePatch>,
) -> Result<Json<Candidate>, AppError> {
    state.simulation.check_write("patch candidate")?;

    let existing = state
        .store
        .get::<Candidate>(&id)
        .await?
        .ok_or_else(candidate_not_found)?;
    let previous_stage = existing.stage;
    let updated = apply_patch(existing, patch, now_ms());
    state.store.put(&updated).await?;

    if updated.stage != previous_stage {
        info!(
            "Candidate {id} moved {} -> {}",
            previous_stage.as_str(),
            updated.stage.as_str()
        );
    }
    Ok(Json(updated))
}

/// GET /api/candidates/:id/timeline
pub async fn handle_get_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimelineResponse>, AppError> {
    let candidate = state
        .store
        .get::<Candidate>(&id)
        .await?
        .ok_or_else(candidate_not_found)?;
    Ok(Json(TimelineResponse {
        timeline: candidate.timeline,
    }))
}

#[cfg(test)]
mod tests {
    use crate::client::services::{CandidateListParams, CandidatesService};
    use crate::client::ClientError;
    use crate::models::candidate::{Candidate, CandidatePatch, NewCandidate, Stage};
    use crate::testing::{test_app, test_app_failing};

    fn payload(name: &str, email: &str, job_id: &str) -> NewCandidate {
        NewCandidate {
            name: name.to_string(),
            email: email.to_string(),
            job_id: Some(job_id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_stage_and_seeds_timeline() {
        let (_state, client) = test_app().await;
        let created = CandidatesService::new(&client)
            .create(&payload("Leo Chen", "leo.chen@gmail.com", "j1"))
            .await
            .unwrap();
        assert_eq!(created.stage, Stage::Applied);
        assert_eq!(created.timeline.len(), 1);
        assert_eq!(created.timeline[0].to, Stage::Applied);
        assert_eq!(created.timeline[0].note.as_deref(), Some("Candidate added"));
    }

    #[tokio::test]
    async fn test_stage_patch_appends_timeline_entry() {
        let (_state, client) = test_app().await;
        let candidates = CandidatesService::new(&client);
        let created = candidates
            .create(&payload("Alice Moore", "alice.moore@gmail.com", "j1"))
            .await
            .unwrap();

        let updated = candidates
            .patch(
                &created.id,
                &CandidatePatch {
                    stage: Some(Stage::Offer),
                    note: Some("@alice approved".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.timeline.len(), 2);
        let last = &updated.timeline[1];
        assert_eq!(last.from, Some(Stage::Applied));
        assert_eq!(last.to, Stage::Offer);
        assert_eq!(last.note.as_deref(), Some("@alice approved"));

        let timeline = candidates.timeline(&created.id).await.unwrap();
        assert_eq!(timeline, updated.timeline);
    }

    #[tokio::test]
    async fn test_unchanged_stage_patch_keeps_timeline() {
        let (_state, client) = test_app().await;
        let candidates = CandidatesService::new(&client);
        let created = candidates
            .create(&payload("Sam Hall", "sam.hall@gmail.com", "j1"))
            .await
            .unwrap();
        let updated = candidates
            .patch(
                &created.id,
                &CandidatePatch {
                    stage: Some(Stage::Applied),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.timeline.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_job_search_and_stage() {
        let (state, client) = test_app().await;
        let candidates = CandidatesService::new(&client);
        for (name, email, job) in [
            ("Mia Khan", "mia.khan@gmail.com", "j1"),
            ("Noah Lee", "noah.lee@gmail.com", "j1"),
            ("Mia Scott", "mia.scott@gmail.com", "j2"),
        ] {
            candidates.create(&payload(name, email, job)).await.unwrap();
        }
        let noah = state
            .store
            .index::<Candidate>("email")
            .unwrap()
            .equals("noah.lee@gmail.com")
            .await
            .unwrap()
            .remove(0);
        candidates
            .patch(
                &noah.id,
                &CandidatePatch {
                    stage: Some(Stage::Tech),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let for_j1 = candidates
            .list(&CandidateListParams {
                job_id: Some("j1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_j1.total, 2);

        let mias = candidates
            .list(&CandidateListParams {
                search: Some("MIA".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mias.total, 2);

        let by_email = candidates
            .list(&CandidateListParams {
                search: Some("scott@".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.total, 1);

        let tech = candidates
            .list(&CandidateListParams {
                stage: Some("tech".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(tech.total, 1);
        assert_eq!(tech.items[0].name, "Noah Lee");

        let paged = candidates
            .list(&CandidateListParams {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.items.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_candidate_routes_404() {
        let (_state, client) = test_app().await;
        let candidates = CandidatesService::new(&client);
        for err in [
            candidates.get("ghost").await.unwrap_err(),
            candidates.timeline("ghost").await.unwrap_err(),
            candidates
                .patch("ghost", &CandidatePatch::default())
                .await
                .unwrap_err(),
        ] {
            assert!(matches!(err, ClientError::Api { status: 404, .. }));
        }
    }

    #[tokio::test]
    async fn test_failed_patch_leaves_candidate_untouched() {
        let (state, client) = test_app_failing().await;
        let stored = crate::candidates::timeline::new_candidate(
            payload("Ava Young", "ava.young@gmail.com", "j1"),
            5,
        );
        state.store.add(&stored).await.unwrap();

        let err = CandidatesService::new(&client)
            .patch(
                &stored.id,
                &CandidatePatch {
                    stage: Some(Stage::Hired),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));

        let after: Candidate = state.store.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(after, stored);
    }
}
