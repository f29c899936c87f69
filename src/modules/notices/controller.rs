use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::notices::{Notice, PaginatedNoticesResponse};

use crate::state::AppState;
use crate::validator::FormPayload;

use super::service::NoticeService;

/// Publish a notice.
///
/// `multipart/form-data` with `title`, `body`, `status`, `published_on` and an
/// optional `attachment` file, or the same fields as JSON.
#[utoipa::path(
    post,
    path = "/api/notices",
    responses(
        (status = 201, description = "Notice created", body = Notice),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Notices",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_notice(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Notice>), AppError> {
    let notice = NoticeService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

#[utoipa::path(
    get,
    path = "/api/notices",
    params(PaginationParams),
    responses((status = 200, description = "Active notices", body = PaginatedNoticesResponse)),
    tag = "Notices"
)]
#[instrument(skip(state))]
pub async fn list_notices(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedNoticesResponse>, AppError> {
    Ok(Json(NoticeService::list(&state.db, pagination, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/notices/all",
    params(PaginationParams),
    responses((status = 200, description = "All notices", body = PaginatedNoticesResponse)),
    tag = "Notices",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_notices(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedNoticesResponse>, AppError> {
    Ok(Json(NoticeService::list(&state.db, pagination, true).await?))
}

#[utoipa::path(
    get,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice", body = Notice),
        (status = 404, description = "Notice not found")
    ),
    tag = "Notices"
)]
#[instrument(skip(state))]
pub async fn get_notice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notice>, AppError> {
    Ok(Json(NoticeService::get(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice updated", body = Notice),
        (status = 400, description = "Validation failed or bad upload"),
        (status = 404, description = "Notice not found")
    ),
    tag = "Notices",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_notice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<Notice>, AppError> {
    Ok(Json(NoticeService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice and its attachment deleted", body = MessageResponse),
        (status = 404, description = "Notice not found")
    ),
    tag = "Notices",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_notice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    NoticeService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Notice deleted")))
}
