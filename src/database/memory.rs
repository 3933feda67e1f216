use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use crate::dto::candidate_dto::{admin_order, CandidateListQuery};
use crate::error::{Error, Result};
use crate::models::candidate::{AuditStamp, Candidate, CandidateFields};
use crate::models::job::{Job, NewJob};
use crate::utils::time::now;

use super::repository::{CandidateRepository, JobRepository};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local candidate store used when no database is configured.
#[derive(Default, Clone)]
pub struct InMemoryCandidateRepository {
    table: Arc<Mutex<Table<Candidate>>>,
}

impl InMemoryCandidateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateRepository for InMemoryCandidateRepository {
    async fn insert(&self, fields: &CandidateFields, audit: &AuditStamp) -> Result<Candidate> {
        let mut guard = self.table.lock().expect("candidate table mutex poisoned");
        let id = guard.allocate_id();
        let candidate = Candidate {
            id,
            fields: fields.clone(),
            creator: audit.creator.clone(),
            last_editor: audit.last_editor.clone(),
            created_date: audit.at,
            modified_date: audit.at,
        };
        guard.rows.insert(id, candidate.clone());
        Ok(candidate)
    }

    async fn update(&self, candidate: &Candidate) -> Result<Candidate> {
        let mut guard = self.table.lock().expect("candidate table mutex poisoned");
        let stored = guard
            .rows
            .get_mut(&candidate.id)
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", candidate.id)))?;
        // a creator already on the row wins over the caller's copy
        let creator = match stored.creator.as_deref() {
            Some(existing) if !existing.is_empty() => stored.creator.clone(),
            _ => candidate.creator.clone(),
        };
        let modified_date = candidate
            .modified_date
            .max(stored.modified_date + Duration::microseconds(1));
        *stored = Candidate {
            creator,
            created_date: stored.created_date,
            modified_date,
            ..candidate.clone()
        };
        Ok(stored.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Candidate>> {
        let guard = self.table.lock().expect("candidate table mutex poisoned");
        Ok(guard.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Candidate>> {
        let guard = self.table.lock().expect("candidate table mutex poisoned");
        Ok(guard.rows.values().cloned().collect())
    }

    async fn search(&self, query: &CandidateListQuery) -> Result<Vec<Candidate>> {
        let guard = self.table.lock().expect("candidate table mutex poisoned");
        let mut hits: Vec<Candidate> = guard
            .rows
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        hits.sort_by(admin_order);
        Ok(hits)
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Candidate>> {
        let guard = self.table.lock().expect("candidate table mutex poisoned");
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| guard.rows.get(id).cloned())
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let guard = self.table.lock().expect("candidate table mutex poisoned");
        Ok(guard.rows.len() as i64)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    table: Arc<Mutex<Table<Job>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn insert(&self, job: &NewJob) -> Result<Job> {
        let mut guard = self.table.lock().expect("job table mutex poisoned");
        let id = guard.allocate_id();
        let at = now();
        let stored = Job {
            id,
            job_type: job.job_type.code(),
            job_name: job.job_name.clone(),
            job_city: job.job_city.code(),
            job_responsibility: job.job_responsibility.clone(),
            job_requirement: job.job_requirement.clone(),
            creator: job.creator.clone(),
            created_date: at,
            modified_date: at,
        };
        guard.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_by_type(&self) -> Result<Vec<Job>> {
        let guard = self.table.lock().expect("job table mutex poisoned");
        let mut jobs: Vec<Job> = guard.rows.values().cloned().collect();
        // rows iterate by id, so a stable sort keeps id order within a type
        jobs.sort_by_key(|job| job.job_type);
        Ok(jobs)
    }

    async fn get(&self, id: i64) -> Result<Option<Job>> {
        let guard = self.table.lock().expect("job table mutex poisoned");
        Ok(guard.rows.get(&id).cloned())
    }
}

impl InMemoryJobRepository {
    /// Stores a row verbatim, bypassing code validation. Lets callers load
    /// legacy rows whose codes may no longer be mapped.
    pub fn insert_raw(&self, mut job: Job) -> Job {
        let mut guard = self.table.lock().expect("job table mutex poisoned");
        job.id = guard.allocate_id();
        guard.rows.insert(job.id, job.clone());
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{City, JobType};

    fn new_job(job_type: JobType, name: &str) -> NewJob {
        NewJob {
            job_type,
            job_name: name.to_string(),
            job_city: City::Beijing,
            job_responsibility: String::new(),
            job_requirement: String::new(),
            creator: None,
        }
    }

    #[tokio::test]
    async fn jobs_list_by_type_then_id() {
        let repo = InMemoryJobRepository::new();
        repo.insert(&new_job(JobType::Design, "a")).await.unwrap();
        repo.insert(&new_job(JobType::Technical, "b")).await.unwrap();
        repo.insert(&new_job(JobType::Technical, "c")).await.unwrap();

        let names: Vec<String> = repo
            .list_by_type()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.job_name)
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn update_keeps_created_date_and_rejects_unknown_ids() {
        let repo = InMemoryCandidateRepository::new();
        let t0 = now();
        let stored = repo
            .insert(&CandidateFields::default(), &AuditStamp::anonymous(t0))
            .await
            .unwrap();

        let mut changed = stored.clone();
        changed.created_date = t0 + chrono::Duration::days(1);
        changed.fields.city = "上海".into();
        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.created_date, t0);
        assert_eq!(updated.fields.city, "上海");

        changed.id = 99;
        assert!(matches!(
            repo.update(&changed).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stale_update_cannot_replace_creator_or_rewind_modified_date() {
        let repo = InMemoryCandidateRepository::new();
        let t0 = now();
        let imported = repo
            .insert(&CandidateFields::default(), &AuditStamp::anonymous(t0))
            .await
            .unwrap();

        // both editors loaded the row while it had no creator
        let mut first = imported.clone();
        first.stamp_save("alice", t0 + chrono::Duration::seconds(2));
        let mut second = imported.clone();
        second.stamp_save("bob", t0 + chrono::Duration::seconds(1));

        let after_first = repo.update(&first).await.unwrap();
        assert_eq!(after_first.creator.as_deref(), Some("alice"));

        let after_second = repo.update(&second).await.unwrap();
        assert_eq!(after_second.creator.as_deref(), Some("alice"));
        assert_eq!(after_second.last_editor.as_deref(), Some("bob"));
        assert!(after_second.modified_date > after_first.modified_date);
    }

    #[tokio::test]
    async fn blank_creator_is_filled_on_update() {
        let repo = InMemoryCandidateRepository::new();
        let t0 = now();
        let mut stored = repo
            .insert(
                &CandidateFields::default(),
                &AuditStamp {
                    creator: Some(String::new()),
                    last_editor: None,
                    at: t0,
                },
            )
            .await
            .unwrap();

        stored.creator = Some("carol".into());
        let updated = repo.update(&stored).await.unwrap();
        assert_eq!(updated.creator.as_deref(), Some("carol"));
    }
}
