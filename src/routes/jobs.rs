use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use crate::error::Error;
use crate::render;
use crate::AppState;

fn html_error(err: Error) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(status = %status, error = %err, "job page failed");
    }
    (status, Html(render::error_page(status, &err.public_message()))).into_response()
}

#[utoipa::path(
    get,
    path = "/joblist/",
    responses(
        (status = 200, description = "All open jobs, by job type", content_type = "text/html", body = String),
        (status = 500, description = "A job carries an unmapped code")
    )
)]
#[axum::debug_handler]
pub async fn job_list(State(state): State<AppState>) -> Response {
    match state.job_service.list_jobs().await {
        Ok(jobs) => Html(render::job_list_page(&jobs)).into_response(),
        Err(e) => html_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/job/{id}/",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job detail page", content_type = "text/html", body = String),
        (status = 404, description = "Job does not exist")
    )
)]
#[axum::debug_handler]
pub async fn job_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    // only plain digits name a job
    let id = match raw_id.bytes().all(|b| b.is_ascii_digit()) {
        true => raw_id.parse::<i64>().ok(),
        false => None,
    };
    let Some(id) = id else {
        return html_error(Error::NotFound("Job does not exist".to_string()));
    };

    match state.job_service.job_detail(id).await {
        Ok(job) => Html(render::job_detail_page(&job)).into_response(),
        Err(e) => html_error(e),
    }
}
