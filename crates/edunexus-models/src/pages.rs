//! CMS pages and team members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use edunexus_core::non_blank;

use crate::common::PublishStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePageDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_slug"),
        length(max = 120, message = "Slug must be at most 120 characters")
    )]
    #[schema(example = "about-us")]
    pub slug: String,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub status: PublishStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePageDto {
    #[validate(
        custom(function = "non_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "non_blank", message = "Content cannot be empty"))]
    pub content: Option<String>,
    pub status: Option<PublishStatus>,
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if let Err(mut err) = non_blank(slug) {
        err.message = Some("Slug is required".into());
        return Err(err);
    }
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok && !slug.starts_with('-') && !slug.ends_with('-') {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("slug");
        err.message = Some("Slug may contain only lowercase letters, digits and dashes".into());
        Err(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub designation: String,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub position: i32,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("about-us").is_ok());
        assert!(validate_slug("About Us").is_err());
        assert!(validate_slug("-terms").is_err());
        assert!(validate_slug("   ").is_err());
    }

    #[test]
    fn blank_page_fields_are_rejected() {
        let dto: CreatePageDto = serde_json::from_value(serde_json::json!({
            "slug": "faq",
            "title": "  ",
            "content": "\n\t",
        }))
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("title"), Some("Title is required"));
        assert_eq!(fields.get("content"), Some("Content is required"));
        assert!(fields.get("slug").is_none());
    }
}
