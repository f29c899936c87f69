use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::live_classes::{
    CreateLiveClassDto, LiveClass, LiveClassFilterParams, PaginatedLiveClassesResponse,
    UpdateLiveClassDto,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::LiveClassService;

#[utoipa::path(
    post,
    path = "/api/live-classes",
    request_body = CreateLiveClassDto,
    responses(
        (status = 201, description = "Live class scheduled", body = LiveClass),
        (status = 400, description = "Validation error, bad time window or unknown course")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_live_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateLiveClassDto>,
) -> Result<(StatusCode, Json<LiveClass>), AppError> {
    let class = LiveClassService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/live-classes",
    params(LiveClassFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Live classes", body = PaginatedLiveClassesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_live_classes(
    State(state): State<AppState>,
    Query(filters): Query<LiveClassFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedLiveClassesResponse>, AppError> {
    Ok(Json(LiveClassService::list(&state.db, filters, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/live-classes/{id}",
    params(("id" = Uuid, Path, description = "Live class ID")),
    responses(
        (status = 200, description = "Live class", body = LiveClass),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_live_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LiveClass>, AppError> {
    Ok(Json(LiveClassService::get(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/live-classes/{id}",
    params(("id" = Uuid, Path, description = "Live class ID")),
    request_body = UpdateLiveClassDto,
    responses(
        (status = 200, description = "Live class updated", body = LiveClass),
        (status = 400, description = "Validation error or bad time window"),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_live_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateLiveClassDto>,
) -> Result<Json<LiveClass>, AppError> {
    Ok(Json(LiveClassService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/live-classes/{id}",
    params(("id" = Uuid, Path, description = "Live class ID")),
    responses(
        (status = 200, description = "Live class deleted", body = MessageResponse),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_live_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    LiveClassService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Live class deleted")))
}
