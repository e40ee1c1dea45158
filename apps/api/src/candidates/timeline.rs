use uuid::Uuid;

use crate::models::candidate::{Candidate, CandidatePatch, NewCandidate, Stage, TimelineEvent};

pub const CANDIDATE_ADDED_NOTE: &str = "Candidate added";

/// Builds a fresh candidate whose timeline records its entry stage.
pub fn new_candidate(payload: NewCandidate, now_ms: i64) -> Candidate {
    let stage = payload.stage.unwrap_or(Stage::Applied);
    Candidate {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        email: payload.email,
        job_id: payload.job_id.filter(|id| !id.is_empty()),
        stage,
        timeline: vec![TimelineEvent {
            timestamp: now_ms,
            from: None,
            to: stage,
            note: Some(CANDIDATE_ADDED_NOTE.to_string()),
        }],
        profile: payload.profile,
        note: payload.note,
    }
}

/// Field-by-field merge of `patch` into `existing`. A stage that differs from
/// the stored one appends exactly one transition event; an unchanged or
/// absent stage leaves the timeline as it was.
pub fn apply_patch(existing: Candidate, patch: CandidatePatch, now_ms: i64) -> Candidate {
    let mut updated = existing;

    if let Some(stage) = patch.stage {
        if stage != updated.stage {
            updated.timeline.push(TimelineEvent {
                timestamp: now_ms,
                from: Some(updated.stage),
                to: stage,
                note: Some(patch.note.clone().unwrap_or_default()),
            });
            updated.stage = stage;
        }
    }
    if let Some(name) = patch.name {
        updated.name = name;
    }
    if let Some(email) = patch.email {
        updated.email = email;
    }
    if let Some(job_id) = patch.job_id {
        updated.job_id = Some(job_id).filter(|id| !id.is_empty());
    }
    if let Some(profile) = patch.profile {
        updated.profile = profile;
    }
    if let Some(note) = patch.note {
        updated.note = Some(note);
    }
    updated
}
