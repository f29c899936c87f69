use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use edunexus_auth::{Claims, Role, verify_token};
use edunexus_core::AppError;

use crate::state::AppState;

/// Extractor that validates the bearer token and exposes its claims.
///
/// When a role layer already ran, the claims it stored in the request
/// extensions are reused instead of decoding the token a second time.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Admin or staff account
    pub fn is_staff(&self) -> bool {
        self.0.role.is_staff_account()
    }

    pub fn subject_id(&self) -> Result<Uuid, AppError> {
        self.0
            .subject_id()
            .ok_or_else(|| AppError::unauthorized("Invalid subject in token".to_string()))
    }

    /// Centre code carried by centre tokens.
    pub fn centre_code(&self) -> Option<&str> {
        self.0.centre_code.as_deref()
    }

    pub fn login(&self) -> &str {
        &self.0.login
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, centre_code: Option<&str>) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            role,
            login: "CTR12345678".to_string(),
            centre_code: centre_code.map(str::to_string),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn staff_accounts() {
        assert!(user(Role::Admin, None).is_staff());
        assert!(user(Role::Staff, None).is_staff());
        assert!(!user(Role::Center, Some("CEN-1")).is_staff());
        assert!(!user(Role::Student, None).is_staff());
    }

    #[test]
    fn centre_code_is_exposed() {
        assert_eq!(user(Role::Center, Some("CEN-1")).centre_code(), Some("CEN-1"));
        assert_eq!(user(Role::Admin, None).centre_code(), None);
    }

    #[test]
    fn invalid_subject_is_unauthorized() {
        let mut auth = user(Role::Admin, None);
        auth.0.sub = "not-a-uuid".to_string();
        assert_eq!(auth.subject_id().unwrap_err().status.as_u16(), 401);
    }
}
