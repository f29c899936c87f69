//! Role-based authorization middleware.
//!
//! Routers are layered with one of the `require_*` functions below; each
//! compares the token's role against a fixed allow-list (401 for a missing or
//! invalid token, 403 for a role outside the list) and stores the
//! [`AuthUser`] in the request extensions for handlers to pick up.
//!
//! ```rust,ignore
//! let routes = init_deliveries_router()
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use edunexus_auth::Role;
use edunexus_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Staff];
pub const CENTRE_ROLES: &[Role] = &[Role::Admin, Role::Staff, Role::Center];
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Staff, Role::Center, Role::Student];

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &'static [Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    parts.extensions.insert(auth_user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn gate(state: AppState, req: Request, next: Next, allowed: &'static [Role]) -> Response {
    match require_roles(State(state), req, next, allowed).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, ADMIN_ONLY).await
}

/// Admin and staff accounts.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, STAFF_ROLES).await
}

/// Staff plus centre logins.
pub async fn require_centre_access(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, CENTRE_ROLES).await
}

/// Any valid token.
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, ANY_ROLE).await
}

pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !auth_user.0.has_role(allowed_roles) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}, but user has role: {}",
            role_list(allowed_roles),
            auth_user.role()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_auth::Claims;

    fn user(role: Role) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            role,
            login: "someone".to_string(),
            centre_code: None,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn allow_lists_nest() {
        for roles in [ADMIN_ONLY, STAFF_ROLES, CENTRE_ROLES] {
            assert!(roles.iter().all(|r| ANY_ROLE.contains(r)));
        }
        assert!(!STAFF_ROLES.contains(&Role::Center));
        assert!(!CENTRE_ROLES.contains(&Role::Student));
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let err = check_any_role(&user(Role::Student), STAFF_ROLES).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert!(err.error.to_string().contains("admin, staff"));
        assert!(err.error.to_string().contains("student"));
    }

    #[test]
    fn matching_role_passes() {
        assert!(check_any_role(&user(Role::Staff), STAFF_ROLES).is_ok());
        assert!(check_any_role(&user(Role::Center), CENTRE_ROLES).is_ok());
    }
}
