//! Live class schedule. The course name is joined at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};
use edunexus_core::serde::deserialize_optional_flag;

use crate::ids::CourseId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LiveClass {
    pub id: Uuid,
    pub course_id: CourseId,
    #[sqlx(default)]
    pub course_name: Option<String>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub description: Option<String>,
    pub video_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLiveClassDto {
    #[serde(default, alias = "courseId")]
    #[validate(required(message = "Course is required"))]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[serde(default, alias = "startsAt", alias = "startTime")]
    #[validate(required(message = "Start time is required"))]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "endsAt", alias = "endTime")]
    #[validate(required(message = "End time is required"))]
    pub ends_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(default, alias = "videoLink")]
    #[validate(url(message = "Video link must be a valid URL"))]
    pub video_link: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLiveClassDto {
    #[serde(alias = "courseId")]
    pub course_id: Option<CourseId>,
    #[validate(
        custom(function = "non_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    #[serde(alias = "startsAt", alias = "startTime")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(alias = "endsAt", alias = "endTime")]
    pub ends_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(alias = "videoLink")]
    #[validate(url(message = "Video link must be a valid URL"))]
    pub video_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LiveClassFilterParams {
    pub course_id: Option<CourseId>,
    /// Only classes that have not ended yet
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub upcoming: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedLiveClassesResponse {
    pub data: Vec<LiveClass>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateLiveClassDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("course_id"), Some("Course is required"));
        assert_eq!(fields.get("title"), Some("Title is required"));
        assert_eq!(fields.get("starts_at"), Some("Start time is required"));
        assert_eq!(fields.get("ends_at"), Some("End time is required"));
        assert!(fields.contains("video_link"));
    }
}
