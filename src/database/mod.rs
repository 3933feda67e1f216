pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::{InMemoryCandidateRepository, InMemoryJobRepository};
pub use postgres::{PgCandidateRepository, PgJobRepository};
pub use repository::{CandidateRepository, JobRepository};
