use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use edunexus_auth::Role;
use edunexus_core::{AppError, PaginationParams};
use edunexus_models::{
    ApproveCentreDto, Centre, CentreFilterParams, CentreId, CentreRegistrationResponse,
    CentreSource, PaginatedCentresResponse, RestoreCentreDto, SetRenewalDto,
    UpdateCentreStatusDto,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{ADMIN_ONLY, check_any_role};
use crate::state::AppState;
use crate::validator::{FormPayload, ValidatedJson};

use super::service::CentreService;

/// Register a centre (admin form).
///
/// Accepts `multipart/form-data` (fields plus `owner_photo`, `centre_photo`,
/// `id_proof`, `address_proof`, `signature` files) or a flat JSON object.
#[utoipa::path(
    post,
    path = "/api/centres",
    responses(
        (status = 201, description = "Centre registered", body = CentreRegistrationResponse),
        (status = 400, description = "Validation failed, duplicate identifier or bad upload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn register_centre(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<CentreRegistrationResponse>), AppError> {
    let response =
        CentreService::register(&state.db, &state.storage, payload, CentreSource::Admin).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Public centre application.
///
/// Identifiers and a temporary password are generated when not supplied; the
/// temporary password is returned once in the response.
#[utoipa::path(
    post,
    path = "/api/centres/apply",
    responses(
        (status = 201, description = "Application received", body = CentreRegistrationResponse),
        (status = 400, description = "Validation failed or bad upload"),
        (status = 409, description = "Could not allocate unique identifiers")
    ),
    tag = "Centres"
)]
#[instrument(skip(state, payload))]
pub async fn apply_centre(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<CentreRegistrationResponse>), AppError> {
    let response =
        CentreService::register(&state.db, &state.storage, payload, CentreSource::Online).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/centres",
    params(CentreFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Centres", body = PaginatedCentresResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_centres(
    State(state): State<AppState>,
    Query(filters): Query<CentreFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedCentresResponse>, AppError> {
    let centres = CentreService::list(&state.db, filters, pagination, false).await?;
    Ok(Json(centres))
}

#[utoipa::path(
    get,
    path = "/api/centres/trash",
    params(CentreFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Soft-deleted centres", body = PaginatedCentresResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_deleted_centres(
    State(state): State<AppState>,
    Query(filters): Query<CentreFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedCentresResponse>, AppError> {
    let centres = CentreService::list(&state.db, filters, pagination, true).await?;
    Ok(Json(centres))
}

#[utoipa::path(
    get,
    path = "/api/centres/{id}",
    params(("id" = Uuid, Path, description = "Centre ID")),
    responses(
        (status = 200, description = "Centre details", body = Centre),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_centre(
    State(state): State<AppState>,
    Path(id): Path<CentreId>,
) -> Result<Json<Centre>, AppError> {
    Ok(Json(CentreService::get(&state.db, id).await?))
}

/// The signed-in centre's own record.
#[utoipa::path(
    get,
    path = "/api/centres/me",
    responses(
        (status = 200, description = "Centre details", body = Centre),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a centre login")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, &[Role::Center])?;
    let id = CentreId::from(auth_user.subject_id()?);
    Ok(Json(CentreService::get(&state.db, id).await?))
}

/// Full-form update with the admin rule set.
#[utoipa::path(
    put,
    path = "/api/centres/{id}",
    params(("id" = Uuid, Path, description = "Centre ID")),
    responses(
        (status = 200, description = "Centre updated", body = Centre),
        (status = 400, description = "Validation failed, duplicate identifier or bad upload"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_centre(
    State(state): State<AppState>,
    Path(id): Path<CentreId>,
    payload: FormPayload,
) -> Result<Json<Centre>, AppError> {
    let centre = CentreService::update(&state.db, &state.storage, id, payload).await?;
    Ok(Json(centre))
}

/// Soft delete: status becomes `Deleted`; the renewal window is kept.
#[utoipa::path(
    delete,
    path = "/api/centres/{id}",
    params(("id" = Uuid, Path, description = "Centre ID")),
    responses(
        (status = 200, description = "Centre moved to trash", body = Centre),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::soft_delete(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/centres/{id}/restore",
    params(("id" = Uuid, Path, description = "Centre ID")),
    request_body(content = Option<RestoreCentreDto>, description = "Status to restore into, defaults to Active"),
    responses(
        (status = 200, description = "Centre restored", body = Centre),
        (status = 400, description = "Invalid target status"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn restore_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
    body: Option<Json<RestoreCentreDto>>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    let status = body.and_then(|Json(dto)| dto.status);
    Ok(Json(CentreService::restore(&state.db, id, status).await?))
}

#[utoipa::path(
    patch,
    path = "/api/centres/{id}/approve",
    params(("id" = Uuid, Path, description = "Centre ID")),
    request_body = ApproveCentreDto,
    responses(
        (status = 200, description = "Approval updated", body = Centre),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
    Json(dto): Json<ApproveCentreDto>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::approve(&state.db, id, dto.approved).await?))
}

#[utoipa::path(
    patch,
    path = "/api/centres/{id}/status",
    params(("id" = Uuid, Path, description = "Centre ID")),
    request_body = UpdateCentreStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Centre),
        (status = 400, description = "Deleted is not a valid target; use DELETE"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_centre_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
    Json(dto): Json<UpdateCentreStatusDto>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::set_status(&state.db, id, dto.status).await?))
}

/// Explicit renewal window; the start must be in the future and before the end.
#[utoipa::path(
    put,
    path = "/api/centres/{id}/renewal",
    params(("id" = Uuid, Path, description = "Centre ID")),
    request_body = SetRenewalDto,
    responses(
        (status = 200, description = "Renewal window set", body = Centre),
        (status = 400, description = "Invalid window"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn set_centre_renewal(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
    ValidatedJson(dto): ValidatedJson<SetRenewalDto>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::set_renewal(&state.db, id, dto).await?))
}

/// Extends `renewal_to` by two years and marks the renewal active.
#[utoipa::path(
    post,
    path = "/api/centres/{id}/renew",
    params(("id" = Uuid, Path, description = "Centre ID")),
    responses(
        (status = 200, description = "Centre renewed", body = Centre),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn renew_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::renew(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/centres/{id}/expire",
    params(("id" = Uuid, Path, description = "Centre ID")),
    responses(
        (status = 200, description = "Renewal marked expired", body = Centre),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Centre not found")
    ),
    tag = "Centres",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn expire_centre(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<CentreId>,
) -> Result<Json<Centre>, AppError> {
    check_any_role(&auth_user, ADMIN_ONLY)?;
    Ok(Json(CentreService::expire(&state.db, id).await?))
}
