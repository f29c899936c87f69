//! Login requests and responses for the four kinds of principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use edunexus_core::non_blank;

pub use edunexus_auth::{Claims, Role};

/// Admin and staff sign-in.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StaffLoginRequest {
    #[serde(default)]
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Centre sign-in with the login id issued at registration.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CentreLoginRequest {
    #[serde(default, alias = "login_id")]
    #[validate(custom(function = "non_blank", message = "Login ID is required"))]
    pub login_id: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Password is required"))]
    pub password: String,
}

/// Student sign-in with enrollment number and date of birth (`YYYY-MM-DD`).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    #[serde(default, alias = "enrollment_no")]
    #[validate(custom(function = "non_blank", message = "Enrollment number is required"))]
    pub enrollment_no: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Date of birth is required"))]
    #[schema(example = "2004-08-15")]
    pub dob: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
    pub subject_id: Uuid,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_rejected() {
        let req: CentreLoginRequest =
            serde_json::from_str(r#"{"loginId":"   ","password":"\t"}"#).unwrap();
        let fields = edunexus_core::FieldErrors::from(req.validate().unwrap_err());
        assert_eq!(fields.get("login_id"), Some("Login ID is required"));
        assert_eq!(fields.get("password"), Some("Password is required"));

        let req: StudentLoginRequest = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(req.validate().unwrap_err());
        assert_eq!(fields.len(), 2);
    }
}
