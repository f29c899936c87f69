use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::{
    CreateDeliveryDto, Delivery, DeliveryFilterParams, DeliveryId, MessageResponse,
    PaginatedDeliveriesResponse, UpdateDeliveryDto,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::DeliveryService;

#[utoipa::path(
    post,
    path = "/api/deliveries",
    request_body = CreateDeliveryDto,
    responses(
        (status = 201, description = "Delivery recorded", body = Delivery),
        (status = 400, description = "Validation error or duplicate consignment ID")
    ),
    tag = "Deliveries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_delivery(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDeliveryDto>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    let delivery = DeliveryService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

#[utoipa::path(
    get,
    path = "/api/deliveries",
    params(DeliveryFilterParams, PaginationParams),
    responses((status = 200, description = "Deliveries", body = PaginatedDeliveriesResponse)),
    tag = "Deliveries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_deliveries(
    State(state): State<AppState>,
    Query(filters): Query<DeliveryFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedDeliveriesResponse>, AppError> {
    Ok(Json(DeliveryService::list(&state.db, filters, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/{id}",
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery", body = Delivery),
        (status = 404, description = "Delivery not found")
    ),
    tag = "Deliveries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<DeliveryId>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(DeliveryService::get(&state.db, id).await?))
}

/// Public consignment tracking.
#[utoipa::path(
    get,
    path = "/api/deliveries/track/{consignment_id}",
    params(("consignment_id" = String, Path, description = "Courier consignment ID")),
    responses(
        (status = 200, description = "Delivery", body = Delivery),
        (status = 404, description = "No delivery with this consignment ID")
    ),
    tag = "Deliveries"
)]
#[instrument(skip(state))]
pub async fn track_delivery(
    State(state): State<AppState>,
    Path(consignment_id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(DeliveryService::track(&state.db, &consignment_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{id}",
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = UpdateDeliveryDto,
    responses(
        (status = 200, description = "Delivery updated", body = Delivery),
        (status = 400, description = "Validation error or duplicate consignment ID"),
        (status = 404, description = "Delivery not found")
    ),
    tag = "Deliveries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<DeliveryId>,
    ValidatedJson(dto): ValidatedJson<UpdateDeliveryDto>,
) -> Result<Json<Delivery>, AppError> {
    Ok(Json(DeliveryService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/deliveries/{id}",
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery deleted", body = MessageResponse),
        (status = 404, description = "Delivery not found")
    ),
    tag = "Deliveries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<DeliveryId>,
) -> Result<Json<MessageResponse>, AppError> {
    DeliveryService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Delivery deleted")))
}
