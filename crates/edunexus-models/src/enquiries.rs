//! Contact enquiries and public feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};

use crate::common::PublishStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "enquiry_status")]
pub enum EnquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub mobile: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactDto {
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Name is required"),
        length(max = 120, message = "Name must be at most 120 characters")
    )]
    pub name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default, alias = "phone")]
    #[validate(length(min = 10, max = 15, message = "Mobile must be at least 10 digits"))]
    pub mobile: String,
    pub subject: Option<String>,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Message is required"),
        length(max = 5000, message = "Message must be at most 5000 characters")
    )]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContactFilterParams {
    pub status: Option<EnquiryStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateContactStatusDto {
    pub status: EnquiryStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedContactsResponse {
    pub data: Vec<Contact>,
    pub meta: PaginationMeta,
}

/// Public feedback. New entries start `Inactive` until an admin publishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Feedback {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub rating: i32,
    pub message: String,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeedbackDto {
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Name is required"),
        length(max = 120, message = "Name must be at most 120 characters")
    )]
    pub name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Message is required"),
        length(max = 2000, message = "Message must be at most 2000 characters")
    )]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePublishStatusDto {
    pub status: PublishStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedFeedbackResponse {
    pub data: Vec<Feedback>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_rating_bounds() {
        let dto: CreateFeedbackDto =
            serde_json::from_str(r#"{"name":"Asha","rating":6,"message":"Great"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rating"));
    }

    #[test]
    fn contact_accepts_phone_alias() {
        let dto: CreateContactDto = serde_json::from_str(
            r#"{"name":"Ravi","phone":"9876543210","message":"Admission query"}"#,
        )
        .unwrap();
        assert_eq!(dto.mobile, "9876543210");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn whitespace_name_and_message_are_rejected() {
        let dto: CreateContactDto = serde_json::from_str(
            r#"{"name":"  ","mobile":"9876543210","message":"   "}"#,
        )
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("name"), Some("Name is required"));
        assert_eq!(fields.get("message"), Some("Message is required"));
    }

    #[test]
    fn empty_feedback_lists_all_fields() {
        let dto: CreateFeedbackDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert!(fields.contains("name"));
        assert!(fields.contains("rating"));
        assert!(fields.contains("message"));
    }
}
