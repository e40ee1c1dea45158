// Synthetic data for first runs: jobs from the catalog, a large candidate pool
// spread across them, and a few multi-section assessments.

pub mod catalog;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::candidates::timeline::CANDIDATE_ADDED_NOTE;
use crate::jobs::slug::slugify;
use crate::models::assessment::{Assessment, AssessmentSection};
use crate::models::candidate::{Candidate, Stage, TimelineEvent};
use crate::models::job::{Job, JobStatus};
use crate::models::now_ms;
use crate::store::{Store, StoreResult};

use self::catalog::Catalog;

pub const DEFAULT_CANDIDATE_COUNT: usize = 1000;

/// A store holding at least this many assessments counts as fully seeded.
pub const MIN_SEEDED_ASSESSMENTS: usize = 3;

const FALLBACK_PROFILE: &str = "Generalist with experience in multiple areas.";
const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SeedOutcome {
    Skipped { jobs: usize, assessments: usize },
    Seeded { jobs: usize, candidates: usize, assessments: usize },
}

/// Everything one seeding run inserts.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
    pub assessments: Vec<Assessment>,
}

/// Seeds `store` unless it already holds jobs and enough assessments.
///
/// A partially seeded store (jobs present, assessments missing) is wiped and
/// rebuilt from scratch. The wipe and all inserts share one transaction.
pub async fn seed_db<R: Rng + Send>(
    store: &Store,
    catalog: &Catalog,
    rng: &mut R,
    candidate_count: usize,
) -> StoreResult<SeedOutcome> {
    let jobs = store.count::<Job>().await?;
    let assessments = store.count::<Assessment>().await?;

    if jobs > 0 && assessments >= MIN_SEEDED_ASSESSMENTS {
        info!("Store already seeded ({jobs} jobs, {assessments} assessments), skipping");
        return Ok(SeedOutcome::Skipped { jobs, assessments });
    }
    if jobs > 0 {
        info!("Store has {jobs} jobs but only {assessments} assessments, reseeding everything");
    }

    let data = generate(catalog, rng, candidate_count, now_ms());

    let mut tx = store.transaction().await?;
    tx.clear::<Assessment>().await?;
    tx.clear::<Candidate>().await?;
    tx.clear::<Job>().await?;
    tx.bulk_add(&data.jobs).await?;
    tx.bulk_add(&data.candidates).await?;
    tx.bulk_add(&data.assessments).await?;
    tx.commit().await?;

    info!(
        "Seeded {} jobs, {} candidates, {} assessments",
        data.jobs.len(),
        data.candidates.len(),
        data.assessments.len()
    );
    Ok(SeedOutcome::Seeded {
        jobs: data.jobs.len(),
        candidates: data.candidates.len(),
        assessments: data.assessments.len(),
    })
}

/// Builds a seeding run's documents without touching the store.
pub fn generate<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
    candidate_count: usize,
    now_ms: i64,
) -> SeedData {
    let jobs = generate_jobs(catalog, now_ms);
    let candidates = generate_candidates(catalog, &jobs, rng, candidate_count, now_ms);
    let assessments = generate_assessments(catalog, &jobs, now_ms);
    SeedData {
        jobs,
        candidates,
        assessments,
    }
}

fn generate_jobs(catalog: &Catalog, now_ms: i64) -> Vec<Job> {
    catalog
        .jobs
        .iter()
        .enumerate()
        .map(|(i, template)| Job {
            id: Uuid::new_v4().to_string(),
            title: template.title.clone(),
            slug: slugify(&template.title),
            status: Some(if i % 5 == 0 {
                JobStatus::Archived
            } else {
                JobStatus::Active
            }),
            tags: template.tags.clone(),
            order: i as i64 + 1,
            created_at: now_ms - i as i64 * HOUR_MS,
            summary: template.summary.clone(),
        })
        .collect()
}

fn generate_candidates<R: Rng + ?Sized>(
    catalog: &Catalog,
    jobs: &[Job],
    rng: &mut R,
    count: usize,
    now_ms: i64,
) -> Vec<Candidate> {
    let mut emails: HashSet<String> = HashSet::with_capacity(count);
    let mut candidates = Vec::with_capacity(count);

    for _ in 0..count {
        let (Some(first), Some(last), Some(job)) = (
            catalog.first_names.choose(rng),
            catalog.last_names.choose(rng),
            jobs.choose(rng),
        ) else {
            break;
        };

        let profile = job
            .tags
            .first()
            .and_then(|tag| catalog.profiles.get(tag))
            .and_then(|profiles| profiles.choose(rng))
            .map(String::as_str)
            .unwrap_or(FALLBACK_PROFILE);
        let email = unique_email(first, last, &mut emails);
        let stage = *Stage::ALL.choose(rng).unwrap_or(&Stage::Applied);

        candidates.push(Candidate {
            id: Uuid::new_v4().to_string(),
            name: format!("{first} {last}"),
            email,
            job_id: Some(job.id.clone()),
            stage,
            timeline: vec![TimelineEvent {
                timestamp: now_ms,
                from: None,
                to: stage,
                note: Some(CANDIDATE_ADDED_NOTE.to_string()),
            }],
            profile: profile.to_string(),
            note: None,
        });
    }
    candidates
}

/// `first.last@gmail.com`, or `first.lastN@gmail.com` with the smallest
/// `N >= 1` not yet in `seen`. Records the result in `seen`.
fn unique_email(first: &str, last: &str, seen: &mut HashSet<String>) -> String {
    let local = format!("{}.{}", first.to_lowercase(), last.to_lowercase());
    let mut email = format!("{local}@gmail.com");
    let mut counter = 1;
    while seen.contains(&email) {
        email = format!("{local}{counter}@gmail.com");
        counter += 1;
    }
    seen.insert(email.clone());
    email
}

fn generate_assessments(catalog: &Catalog, jobs: &[Job], now_ms: i64) -> Vec<Assessment> {
    catalog
        .assessments
        .iter()
        .filter_map(|template| {
            let job = jobs.iter().find(|j| j.title == template.job_title)?;
            let sections = template
                .sections
                .iter()
                .map(|section| AssessmentSection {
                    id: Uuid::new_v4().to_string(),
                    title: section.title.clone(),
                    questions: section
                        .questions
                        .iter()
                        .map(|q| q.instantiate(Uuid::new_v4().to_string()))
                        .collect(),
                })
                .collect();
            Some(Assessment {
                id: Uuid::new_v4().to_string(),
                job_id: job.id.clone(),
                title: template.title.clone(),
                sections,
                created_at: now_ms - template.age_days * DAY_MS,
                responses: vec![],
            })
        })
        .collect()
}
