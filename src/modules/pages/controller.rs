use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::AppError;
use edunexus_models::MessageResponse;
use edunexus_models::pages::{CreatePageDto, Page, TeamMember, UpdatePageDto};

use crate::state::AppState;
use crate::validator::{FormPayload, ValidatedJson};

use super::service::{PageService, TeamService};

#[utoipa::path(
    post,
    path = "/api/pages",
    request_body = CreatePageDto,
    responses(
        (status = 201, description = "Page created", body = Page),
        (status = 400, description = "Validation error or duplicate slug")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_page(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePageDto>,
) -> Result<(StatusCode, Json<Page>), AppError> {
    let page = PageService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

#[utoipa::path(
    get,
    path = "/api/pages",
    responses((status = 200, description = "All pages", body = Vec<Page>)),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_pages(State(state): State<AppState>) -> Result<Json<Vec<Page>>, AppError> {
    Ok(Json(PageService::list(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page", body = Page),
        (status = 404, description = "Page not found or inactive")
    ),
    tag = "Pages"
)]
#[instrument(skip(state))]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, AppError> {
    Ok(Json(PageService::get_by_slug(&state.db, &slug, false).await?))
}

#[utoipa::path(
    put,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    request_body = UpdatePageDto,
    responses(
        (status = 200, description = "Page updated", body = Page),
        (status = 404, description = "Page not found")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdatePageDto>,
) -> Result<Json<Page>, AppError> {
    Ok(Json(PageService::update(&state.db, &slug, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page deleted", body = MessageResponse),
        (status = 404, description = "Page not found")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    PageService::delete(&state.db, &slug).await?;
    Ok(Json(MessageResponse::new("Page deleted")))
}

/// Add a team member: `name`, `designation`, `bio`, `position`, `status` and
/// an optional `photo` file.
#[utoipa::path(
    post,
    path = "/api/team",
    responses(
        (status = 201, description = "Team member added", body = TeamMember),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_team_member(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<TeamMember>), AppError> {
    let member = TeamService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    get,
    path = "/api/team",
    responses((status = 200, description = "Active team members in display order", body = Vec<TeamMember>)),
    tag = "Pages"
)]
#[instrument(skip(state))]
pub async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, AppError> {
    Ok(Json(TeamService::list(&state.db, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/team/all",
    responses((status = 200, description = "All team members", body = Vec<TeamMember>)),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, AppError> {
    Ok(Json(TeamService::list(&state.db, true).await?))
}

#[utoipa::path(
    put,
    path = "/api/team/{id}",
    params(("id" = Uuid, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Team member updated", body = TeamMember),
        (status = 404, description = "Team member not found")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_team_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<TeamMember>, AppError> {
    Ok(Json(TeamService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/team/{id}",
    params(("id" = Uuid, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Team member removed", body = MessageResponse),
        (status = 404, description = "Team member not found")
    ),
    tag = "Pages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    TeamService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Team member removed")))
}
