pub mod candidate_service;
pub mod export_service;
pub mod import_service;
pub mod job_service;
