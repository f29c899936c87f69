use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::careers::{
    JobApplication, JobApplicationFilterParams, PaginatedJobApplicationsResponse,
    UpdateApplicationStatusDto,
};

use crate::state::AppState;
use crate::validator::FormPayload;

use super::service::CareerService;

/// Public job application.
///
/// `multipart/form-data` with `name`, `email`, `mobile`, `position`,
/// `experience`, `cover_letter` and an optional `resume` file.
#[utoipa::path(
    post,
    path = "/api/careers/apply",
    responses(
        (status = 201, description = "Application received", body = JobApplication),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Careers"
)]
#[instrument(skip(state, payload))]
pub async fn apply_for_job(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<JobApplication>), AppError> {
    let application = CareerService::apply(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/careers",
    params(JobApplicationFilterParams, PaginationParams),
    responses((status = 200, description = "Job applications", body = PaginatedJobApplicationsResponse)),
    tag = "Careers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(filters): Query<JobApplicationFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedJobApplicationsResponse>, AppError> {
    Ok(Json(CareerService::list(&state.db, filters, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/careers/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Job application", body = JobApplication),
        (status = 404, description = "Application not found")
    ),
    tag = "Careers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobApplication>, AppError> {
    Ok(Json(CareerService::get(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/careers/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusDto,
    responses(
        (status = 200, description = "Status updated", body = JobApplication),
        (status = 404, description = "Application not found")
    ),
    tag = "Careers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateApplicationStatusDto>,
) -> Result<Json<JobApplication>, AppError> {
    Ok(Json(CareerService::set_status(&state.db, id, dto.status).await?))
}

#[utoipa::path(
    delete,
    path = "/api/careers/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application and resume deleted", body = MessageResponse),
        (status = 404, description = "Application not found")
    ),
    tag = "Careers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    CareerService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Job application deleted")))
}
