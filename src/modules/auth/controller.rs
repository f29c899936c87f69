use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use edunexus_auth::{Claims, Role};
use edunexus_core::AppError;
use edunexus_models::{CentreLoginRequest, LoginResponse, StaffLoginRequest, StudentLoginRequest};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

/// Error body returned by every endpoint.
#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Present for validation failures: field name to message
    #[schema(value_type = Option<Object>)]
    pub errors: Option<std::collections::BTreeMap<String, String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub subject_id: String,
    pub role: Role,
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centre_code: Option<String>,
    pub expires_at: usize,
}

impl From<Claims> for SessionResponse {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role,
            login: claims.login,
            centre_code: claims.centre_code,
            expires_at: claims.exp,
        }
    }
}

/// Admin and staff login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = StaffLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_staff(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<StaffLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(AuthService::login_staff(&state.db, dto, &state.jwt_config).await?))
}

/// Centre login with the issued login ID
#[utoipa::path(
    post,
    path = "/api/auth/centre/login",
    request_body = CentreLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Centre inactive or deleted", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_centre(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CentreLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(AuthService::login_centre(&state.db, dto, &state.jwt_config).await?))
}

/// Student login with enrollment number and date of birth
#[utoipa::path(
    post,
    path = "/api/auth/student/login",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<StudentLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(AuthService::login_student(&state.db, dto, &state.jwt_config).await?))
}

/// Claims of the presented token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn current_session(auth_user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse::from(auth_user.0))
}
