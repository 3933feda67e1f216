use async_trait::async_trait;

use crate::dto::candidate_dto::CandidateListQuery;
use crate::error::Result;
use crate::models::candidate::{AuditStamp, Candidate, CandidateFields};
use crate::models::job::{Job, NewJob};

/// Candidate storage. Candidates are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn insert(&self, fields: &CandidateFields, audit: &AuditStamp) -> Result<Candidate>;

    /// Overwrites the editable fields and `last_editor` of `candidate.id`.
    /// `created_date` is untouched. A non-empty stored `creator` is kept, and
    /// the stored `modified_date` is at least one microsecond past its
    /// previous value.
    async fn update(&self, candidate: &Candidate) -> Result<Candidate>;

    async fn get(&self, id: i64) -> Result<Option<Candidate>>;

    /// All candidates by ascending id.
    async fn list(&self) -> Result<Vec<Candidate>>;

    /// Candidates matching `query` in admin list order.
    async fn search(&self, query: &CandidateListQuery) -> Result<Vec<Candidate>>;

    /// Candidates with the given ids in the order given. Unknown and
    /// repeated ids are skipped.
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Candidate>>;

    async fn count(&self) -> Result<i64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &NewJob) -> Result<Job>;

    /// All jobs by ascending `job_type`, ties broken by id.
    async fn list_by_type(&self) -> Result<Vec<Job>>;

    async fn get(&self, id: i64) -> Result<Option<Job>>;
}
