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
use edunexus_models::messages::{
    Message, MessageFilterParams, PaginatedMessagesResponse, UpdateMessageStatusDto,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{STAFF_ROLES, check_any_role};
use crate::state::AppState;
use crate::validator::FormPayload;

use super::service::{MessageScope, MessageService};

fn scope_of(auth_user: &AuthUser) -> Result<MessageScope<'_>, AppError> {
    match auth_user.role() {
        Role::Admin | Role::Staff => Ok(MessageScope::All),
        Role::Center => auth_user
            .centre_code()
            .map(MessageScope::Centre)
            .ok_or_else(|| AppError::forbidden("Centre token carries no centre code".to_string())),
        Role::Student => Err(AppError::forbidden("Students cannot access messages".to_string())),
    }
}

/// Send a message to the head office.
///
/// `multipart/form-data` with `subject`, `body`, optional `sender` and an
/// optional `attachment` file, or the same fields as JSON.
#[utoipa::path(
    post,
    path = "/api/messages",
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Validation failed or bad upload"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Messages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let scope = scope_of(&auth_user)?;
    let message =
        MessageService::create(&state.db, &state.storage, payload, scope, auth_user.login()).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    params(MessageFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Messages visible to the caller", body = PaginatedMessagesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Messages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<MessageFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedMessagesResponse>, AppError> {
    let scope = scope_of(&auth_user)?;
    Ok(Json(MessageService::list(&state.db, filters, pagination, scope).await?))
}

#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 404, description = "Message not found")
    ),
    tag = "Messages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    let scope = scope_of(&auth_user)?;
    Ok(Json(MessageService::get(&state.db, id, scope).await?))
}

#[utoipa::path(
    patch,
    path = "/api/messages/{id}/status",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = UpdateMessageStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Message),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Message not found")
    ),
    tag = "Messages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_message_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateMessageStatusDto>,
) -> Result<Json<Message>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(MessageService::set_status(&state.db, id, dto.status).await?))
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message deleted", body = MessageResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Message not found")
    ),
    tag = "Messages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    MessageService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Message deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_auth::Claims;

    fn user(role: Role, centre_code: Option<&str>) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            role,
            login: "someone".to_string(),
            centre_code: centre_code.map(str::to_string),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn scopes_follow_role() {
        assert_eq!(scope_of(&user(Role::Staff, None)).unwrap(), MessageScope::All);
        let centre = user(Role::Center, Some("CEN-001"));
        assert_eq!(scope_of(&centre).unwrap(), MessageScope::Centre("CEN-001"));
        assert_eq!(scope_of(&user(Role::Center, None)).unwrap_err().status.as_u16(), 403);
        assert_eq!(scope_of(&user(Role::Student, None)).unwrap_err().status.as_u16(), 403);
    }
}
