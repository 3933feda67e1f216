pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use crate::database::{
    CandidateRepository, InMemoryCandidateRepository, InMemoryJobRepository, JobRepository,
    PgCandidateRepository, PgJobRepository,
};
use crate::services::{candidate_service::CandidateService, job_service::JobService};
use sqlx::PgPool;

/// Which backend the repositories talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub candidate_service: CandidateService,
    pub job_service: JobService,
    pub jwt_secret: String,
    pub store: StoreKind,
}

impl AppState {
    pub fn new(
        candidates: Arc<dyn CandidateRepository>,
        jobs: Arc<dyn JobRepository>,
        jwt_secret: String,
        store: StoreKind,
    ) -> Self {
        Self {
            candidate_service: CandidateService::new(candidates),
            job_service: JobService::new(jobs),
            jwt_secret,
            store,
        }
    }

    pub fn postgres(pool: PgPool, jwt_secret: String) -> Self {
        Self::new(
            Arc::new(PgCandidateRepository::new(pool.clone())),
            Arc::new(PgJobRepository::new(pool)),
            jwt_secret,
            StoreKind::Postgres,
        )
    }

    pub fn in_memory(jwt_secret: String) -> Self {
        Self::new(
            Arc::new(InMemoryCandidateRepository::new()),
            Arc::new(InMemoryJobRepository::new()),
            jwt_secret,
            StoreKind::Memory,
        )
    }
}
