use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Local;

use crate::{
    dto::candidate_dto::ExportRequest, error::Result, middleware::auth::ActingUser,
    services::export_service::ExportService, AppState,
};

/// Export the selected candidates as CSV
#[utoipa::path(
    post,
    path = "/api/admin/candidates/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "CSV file with a UTF-8 byte-order mark", content_type = "text/csv"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn export_candidates(
    State(state): State<AppState>,
    Extension(user): Extension<ActingUser>,
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse> {
    let candidates = state
        .candidate_service
        .select_for_export(payload.candidate_ids.as_deref())
        .await?;

    let export = ExportService::export(&candidates, user.username(), Local::now())?;
    let disposition = format!("attachment; filename={}", export.filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    ))
}
