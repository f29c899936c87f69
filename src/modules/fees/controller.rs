use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_auth::Role;
use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::fees::{CreateFeeDto, Fee, FeeFilterParams, PaginatedFeesResponse, UpdateFeeDto};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::FeeService;

/// Centre logins read only their own receipts.
fn centre_pin(auth_user: &AuthUser) -> Result<Option<&str>, AppError> {
    match auth_user.role() {
        Role::Admin | Role::Staff => Ok(None),
        Role::Center => auth_user
            .centre_code()
            .map(Some)
            .ok_or_else(|| AppError::forbidden("Centre token carries no centre code".to_string())),
        Role::Student => Err(AppError::forbidden("Students cannot access fee records".to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/api/fees",
    request_body = CreateFeeDto,
    responses(
        (status = 201, description = "Fee recorded", body = Fee),
        (status = 400, description = "Validation error or unknown student")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_fee(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFeeDto>,
) -> Result<(StatusCode, Json<Fee>), AppError> {
    let fee = FeeService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(fee)))
}

#[utoipa::path(
    get,
    path = "/api/fees",
    params(FeeFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Fee records visible to the caller", body = PaginatedFeesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_fees(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<FeeFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedFeesResponse>, AppError> {
    let centre = centre_pin(&auth_user)?;
    Ok(Json(FeeService::list(&state.db, filters, pagination, centre).await?))
}

#[utoipa::path(
    get,
    path = "/api/fees/{id}",
    params(("id" = Uuid, Path, description = "Fee record ID")),
    responses(
        (status = 200, description = "Fee record", body = Fee),
        (status = 404, description = "Fee record not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_fee(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Fee>, AppError> {
    let centre = centre_pin(&auth_user)?;
    Ok(Json(FeeService::get(&state.db, id, centre).await?))
}

#[utoipa::path(
    put,
    path = "/api/fees/{id}",
    params(("id" = Uuid, Path, description = "Fee record ID")),
    request_body = UpdateFeeDto,
    responses(
        (status = 200, description = "Fee record updated", body = Fee),
        (status = 404, description = "Fee record not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_fee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeDto>,
) -> Result<Json<Fee>, AppError> {
    Ok(Json(FeeService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/fees/{id}",
    params(("id" = Uuid, Path, description = "Fee record ID")),
    responses(
        (status = 200, description = "Fee record deleted", body = MessageResponse),
        (status = 404, description = "Fee record not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_fee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    FeeService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Fee record deleted")))
}
