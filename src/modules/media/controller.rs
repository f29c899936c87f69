use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::media::{GalleryItem, PaginatedGalleryResponse, Slider};

use crate::state::AppState;
use crate::validator::FormPayload;

use super::service::{GalleryService, SliderService};

/// Add a gallery image: `title`, `album`, `status` and an `image` file.
#[utoipa::path(
    post,
    path = "/api/gallery",
    responses(
        (status = 201, description = "Image added", body = GalleryItem),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_gallery_item(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<GalleryItem>), AppError> {
    let item = GalleryService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/gallery",
    params(PaginationParams),
    responses((status = 200, description = "Active gallery images", body = PaginatedGalleryResponse)),
    tag = "Media"
)]
#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedGalleryResponse>, AppError> {
    Ok(Json(GalleryService::list(&state.db, pagination, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/gallery/all",
    params(PaginationParams),
    responses((status = 200, description = "All gallery images", body = PaginatedGalleryResponse)),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_gallery(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedGalleryResponse>, AppError> {
    Ok(Json(GalleryService::list(&state.db, pagination, true).await?))
}

#[utoipa::path(
    put,
    path = "/api/gallery/{id}",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Image updated", body = GalleryItem),
        (status = 404, description = "Gallery item not found")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<GalleryItem>, AppError> {
    Ok(Json(GalleryService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    params(("id" = Uuid, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 404, description = "Gallery item not found")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    GalleryService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Gallery image deleted")))
}

/// Add a home page slider: `title`, `subtitle`, `link`, `position`, `status`
/// and an `image` file.
#[utoipa::path(
    post,
    path = "/api/sliders",
    responses(
        (status = 201, description = "Slider added", body = Slider),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_slider(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Slider>), AppError> {
    let slider = SliderService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(slider)))
}

#[utoipa::path(
    get,
    path = "/api/sliders",
    responses((status = 200, description = "Active sliders in display order", body = Vec<Slider>)),
    tag = "Media"
)]
#[instrument(skip(state))]
pub async fn list_sliders(State(state): State<AppState>) -> Result<Json<Vec<Slider>>, AppError> {
    Ok(Json(SliderService::list(&state.db, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/sliders/all",
    responses((status = 200, description = "All sliders in display order", body = Vec<Slider>)),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_sliders(State(state): State<AppState>) -> Result<Json<Vec<Slider>>, AppError> {
    Ok(Json(SliderService::list(&state.db, true).await?))
}

#[utoipa::path(
    put,
    path = "/api/sliders/{id}",
    params(("id" = Uuid, Path, description = "Slider ID")),
    responses(
        (status = 200, description = "Slider updated", body = Slider),
        (status = 404, description = "Slider not found")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_slider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<Slider>, AppError> {
    Ok(Json(SliderService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/sliders/{id}",
    params(("id" = Uuid, Path, description = "Slider ID")),
    responses(
        (status = 200, description = "Slider deleted", body = MessageResponse),
        (status = 404, description = "Slider not found")
    ),
    tag = "Media",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_slider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    SliderService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Slider deleted")))
}
