use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::database::JobRepository;
use crate::dto::job_dto::{CreateJobPayload, JobView};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct JobService {
    repo: Arc<dyn JobRepository>,
}

impl JobService {
    pub fn new(repo: Arc<dyn JobRepository>) -> Self {
        Self { repo }
    }

    /// Every job by ascending type code, codes resolved to labels. One
    /// unmapped code fails the whole listing.
    pub async fn list_jobs(&self) -> Result<Vec<JobView>> {
        self.repo
            .list_by_type()
            .await?
            .iter()
            .map(JobView::try_from)
            .collect()
    }

    pub async fn job_detail(&self, id: i64) -> Result<JobView> {
        let job = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Job does not exist".to_string()))?;
        JobView::try_from(&job)
    }

    pub async fn create_job(&self, payload: CreateJobPayload, acting_user: &str) -> Result<JobView> {
        payload.validate()?;
        let new_job = payload.into_new_job(acting_user)?;
        let job = self.repo.insert(&new_job).await?;
        info!(id = job.id, user = acting_user, "Job created");
        JobView::try_from(&job)
    }
}
