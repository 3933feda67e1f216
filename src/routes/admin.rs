use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{
        candidate_dto::{CandidateListQuery, CandidateSummary},
        job_dto::{CreateJobPayload, JobView},
    },
    error::Result,
    middleware::auth::ActingUser,
    models::candidate::CandidateFields,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/candidates",
    params(CandidateListQuery),
    responses(
        (status = 200, description = "Matching candidates", body = Vec<CandidateSummary>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list_candidates(&query).await?;
    let summaries: Vec<CandidateSummary> = candidates.iter().map(CandidateSummary::from).collect();
    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/admin/candidates/{id}",
    params(("id" = i64, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Grouped candidate form", body = CandidateForm),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let form = state.candidate_service.candidate_form(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/admin/candidates",
    request_body = CandidateFields,
    responses(
        (status = 201, description = "Candidate created", body = Candidate),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<ActingUser>,
    Json(fields): Json<CandidateFields>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .create_candidate(fields, user.username())
        .await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    put,
    path = "/api/admin/candidates/{id}",
    params(("id" = i64, Path, description = "Candidate ID")),
    request_body = CandidateFields,
    responses(
        (status = 200, description = "Candidate saved", body = Candidate),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<ActingUser>,
    Path(id): Path<i64>,
    Json(fields): Json<CandidateFields>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .save_candidate(id, fields, user.username())
        .await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobView),
        (status = 400, description = "Invalid payload or unmapped code")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(user): Extension<ActingUser>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    let job: JobView = state.job_service.create_job(payload, user.username()).await?;
    Ok((StatusCode::CREATED, Json(job)))
}
