use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::job::{City, Job, JobType, NewJob};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobPayload {
    pub job_type: i16,
    #[validate(length(min = 1, max = 250))]
    pub job_name: String,
    pub job_city: i16,
    #[serde(default)]
    pub job_responsibility: String,
    #[serde(default)]
    pub job_requirement: String,
}

impl CreateJobPayload {
    /// Rejects codes outside the fixed mappings.
    pub fn into_new_job(self, creator: &str) -> Result<NewJob> {
        let job_type =
            JobType::from_code(self.job_type).map_err(|e| Error::BadRequest(e.to_string()))?;
        let job_city =
            City::from_code(self.job_city).map_err(|e| Error::BadRequest(e.to_string()))?;
        Ok(NewJob {
            job_type,
            job_name: self.job_name,
            job_city,
            job_responsibility: self.job_responsibility,
            job_requirement: self.job_requirement,
            creator: Some(creator.to_string()),
        })
    }
}

/// A job with its coded fields resolved to display labels.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobView {
    pub id: i64,
    pub job_name: String,
    pub job_type: String,
    pub job_type_code: i16,
    pub city_name: String,
    pub job_city: i16,
    pub job_responsibility: String,
    pub job_requirement: String,
    pub modified_date: DateTime<Utc>,
}

impl TryFrom<&Job> for JobView {
    type Error = Error;

    fn try_from(job: &Job) -> Result<Self> {
        let job_type = JobType::from_code(job.job_type)?;
        let city = City::from_code(job.job_city)?;
        Ok(Self {
            id: job.id,
            job_name: job.job_name.clone(),
            job_type: job_type.label().to_string(),
            job_type_code: job.job_type,
            city_name: city.label().to_string(),
            job_city: job.job_city,
            job_responsibility: job.job_responsibility.clone(),
            job_requirement: job.job_requirement.clone(),
            modified_date: job.modified_date,
        })
    }
}
