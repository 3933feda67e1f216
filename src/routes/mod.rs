pub mod admin;
pub mod export;
pub mod health;
pub mod jobs;

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::dto::candidate_dto::{
    CandidateForm, CandidateSummary, ExportRequest, FormField, FormSection,
};
use crate::dto::job_dto::{CreateJobPayload, JobView};
use crate::middleware::auth::require_staff;
use crate::models::candidate::{Candidate, CandidateFields, Grade, StageResult};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        jobs::job_list,
        jobs::job_detail,
        admin::list_candidates,
        admin::get_candidate_form,
        admin::create_candidate,
        admin::update_candidate,
        admin::create_job,
        export::export_candidates,
    ),
    components(schemas(
        Candidate,
        CandidateFields,
        StageResult,
        Grade,
        CandidateSummary,
        CandidateForm,
        FormSection,
        FormField,
        ExportRequest,
        CreateJobPayload,
        JobView,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Public pages plus the token-protected admin API.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/joblist/", get(jobs::job_list))
        .route("/job/:id/", get(jobs::job_detail))
        .route("/api-docs/openapi.json", get(openapi_json));

    let admin = Router::new()
        .route(
            "/api/admin/candidates",
            get(admin::list_candidates).post(admin::create_candidate),
        )
        .route(
            "/api/admin/candidates/export",
            post(export::export_candidates),
        )
        .route(
            "/api/admin/candidates/:id",
            get(admin::get_candidate_form).put(admin::update_candidate),
        )
        .route("/api/admin/jobs", post(admin::create_job))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_staff,
        ));

    public.merge(admin).with_state(state)
}
