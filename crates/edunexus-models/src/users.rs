//! Staff accounts (`admin` and `staff` roles).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use edunexus_core::non_blank;

use crate::ids::UserId;
use edunexus_auth::Role;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Name is required"),
        length(max = 120, message = "Name must be at most 120 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(required(message = "Role is required"))]
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateUserDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("name"), Some("Name is required"));
        assert!(fields.contains("email"));
        assert!(fields.contains("password"));
        assert_eq!(fields.get("role"), Some("Role is required"));
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let dto: CreateUserDto = serde_json::from_str(
            r#"{"name":" ","email":"ops@example.com","password":"secret123","role":"staff"}"#,
        )
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.len(), 1);
        assert!(fields.contains("name"));
    }
}
