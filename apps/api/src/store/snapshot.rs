//! Whole-store maintenance: status, export/import and reset.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::assessment::Assessment;
use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::now_ms;
use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub jobs: usize,
    pub candidates: usize,
    pub assessments: usize,
    pub schema_version: i64,
}

/// Full copy of all three collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub exported_at: i64,
}

impl Store {
    pub async fn status(&self) -> StoreResult<StoreStatus> {
        Ok(StoreStatus {
            jobs: self.count::<Job>().await?,
            candidates: self.count::<Candidate>().await?,
            assessments: self.count::<Assessment>().await?,
            schema_version: self.schema_version().await?,
        })
    }

    pub async fn export_snapshot(&self) -> StoreResult<Snapshot> {
        let snapshot = Snapshot {
            jobs: self.to_array().await?,
            candidates: self.to_array().await?,
            assessments: self.to_array().await?,
            exported_at: now_ms(),
        };
        info!(
            "Exported snapshot: {} jobs, {} candidates, {} assessments",
            snapshot.jobs.len(),
            snapshot.candidates.len(),
            snapshot.assessments.len()
        );
        Ok(snapshot)
    }

    /// Replaces the contents of every collection with `snapshot`, atomically.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let mut tx = self.transaction().await?;
        tx.clear::<Assessment>().await?;
        tx.clear::<Candidate>().await?;
        tx.clear::<Job>().await?;
        tx.bulk_add(&snapshot.jobs).await?;
        tx.bulk_add(&snapshot.candidates).await?;
        tx.bulk_add(&snapshot.assessments).await?;
        tx.commit().await?;
        info!(
            "Imported snapshot: {} jobs, {} candidates, {} assessments",
            snapshot.jobs.len(),
            snapshot.candidates.len(),
            snapshot.assessments.len()
        );
        Ok(())
    }

    pub async fn reset(&self) -> StoreResult<()> {
        let mut tx = self.transaction().await?;
        tx.clear::<Assessment>().await?;
        tx.clear::<Candidate>().await?;
        tx.clear::<Job>().await?;
        tx.commit().await?;
        info!("Store reset: all collections cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::Stage;
    use crate::models::job::JobStatus;

    fn sample() -> Snapshot {
        Snapshot {
            jobs: vec![Job {
                id: "j1".to_string(),
                title: "Technical Writer".to_string(),
                slug: "technical-writer".to_string(),
                status: Some(JobStatus::Active),
                tags: vec!["documentation".to_string()],
                order: 1,
                created_at: 10,
                summary: String::new(),
            }],
            candidates: vec![Candidate {
                id: "c1".to_string(),
                name: "Nora Hill".to_string(),
                email: "nora.hill@gmail.com".to_string(),
                job_id: Some("j1".to_string()),
                stage: Stage::Offer,
                timeline: vec![],
                profile: String::new(),
                note: None,
            }],
            assessments: vec![],
            exported_at: 0,
        }
    }

    #[tokio::test]
    async fn test_import_replaces_existing_data() {
        let source = Store::in_memory().await.unwrap();
        source.import_snapshot(&sample()).await.unwrap();
        let exported = source.export_snapshot().await.unwrap();
        assert_eq!(exported.jobs, sample().jobs);
        assert_eq!(exported.candidates, sample().candidates);

        let target = Store::in_memory().await.unwrap();
        target
            .add(&Job {
                id: "stale".to_string(),
                ..sample().jobs[0].clone()
            })
            .await
            .unwrap();
        target.import_snapshot(&exported).await.unwrap();

        let status = target.status().await.unwrap();
        assert_eq!(status.jobs, 1);
        assert_eq!(status.candidates, 1);
        assert!(target.get::<Job>("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_import_keeps_previous_contents() {
        let store = Store::in_memory().await.unwrap();
        store.import_snapshot(&sample()).await.unwrap();

        let mut broken = sample();
        broken.jobs.push(broken.jobs[0].clone());
        assert!(store.import_snapshot(&broken).await.is_err());

        let status = store.status().await.unwrap();
        assert_eq!(status.jobs, 1);
        assert_eq!(status.candidates, 1);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = Store::in_memory().await.unwrap();
        store.import_snapshot(&sample()).await.unwrap();
        store.reset().await.unwrap();
        let status = store.status().await.unwrap();
        assert_eq!((status.jobs, status.candidates, status.assessments), (0, 0, 0));
        assert_eq!(status.schema_version, crate::store::SCHEMA_VERSION);
    }
}
