//! Online exam metadata. The course is a reference; its name is joined at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};

use crate::ids::CourseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "exam_status")]
pub enum ExamStatus {
    #[default]
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OnlineExam {
    pub id: Uuid,
    pub course_id: CourseId,
    #[sqlx(default)]
    pub course_name: Option<String>,
    pub title: String,
    pub exam_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub total_marks: i32,
    pub pass_marks: i32,
    pub instructions: Option<String>,
    pub status: ExamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOnlineExamDto {
    #[serde(default, alias = "courseId")]
    #[validate(required(message = "Course is required"))]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[serde(default, alias = "examDate")]
    #[validate(required(message = "Exam date is required"))]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "durationMinutes", alias = "duration")]
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: i32,
    #[serde(default, alias = "totalMarks")]
    #[validate(range(min = 1, message = "Total marks must be a positive number"))]
    pub total_marks: i32,
    #[serde(default, alias = "passMarks")]
    #[validate(
        required(message = "Pass marks are required"),
        range(min = 0, message = "Pass marks cannot be negative")
    )]
    pub pass_marks: Option<i32>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub status: ExamStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOnlineExamDto {
    #[serde(alias = "courseId")]
    pub course_id: Option<CourseId>,
    #[validate(
        custom(function = "non_blank", message = "Title cannot be empty"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: Option<String>,
    #[serde(alias = "examDate")]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(alias = "durationMinutes", alias = "duration")]
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: Option<i32>,
    #[serde(alias = "totalMarks")]
    #[validate(range(min = 1, message = "Total marks must be a positive number"))]
    pub total_marks: Option<i32>,
    #[serde(alias = "passMarks")]
    #[validate(range(min = 0, message = "Pass marks cannot be negative"))]
    pub pass_marks: Option<i32>,
    pub instructions: Option<String>,
    pub status: Option<ExamStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedOnlineExamsResponse {
    pub data: Vec<OnlineExam>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateOnlineExamDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        for key in ["course_id", "title", "exam_date", "duration_minutes", "total_marks", "pass_marks"] {
            assert!(fields.contains(key), "missing error for {key}");
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let dto: UpdateOnlineExamDto = serde_json::from_str(r#"{"title":"   "}"#).unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("title"), Some("Title cannot be empty"));
    }
}
