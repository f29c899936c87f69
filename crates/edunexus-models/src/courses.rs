//! Course categories and courses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};
use edunexus_core::serde::deserialize_optional_flag;

use crate::ids::{CategoryId, CourseId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Name is required"),
        length(max = 120, message = "Name must be at most 120 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Code is required"),
        length(max = 30, message = "Code must be at most 30 characters")
    )]
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(
        custom(function = "non_blank", message = "Name cannot be empty"),
        length(max = 120, message = "Name must be at most 120 characters")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "non_blank", message = "Code cannot be empty"),
        length(max = 30, message = "Code must be at most 30 characters")
    )]
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Subject template copied onto a student's admit card and marksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CourseSubject {
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Subject name is required"))]
    pub name: String,
    #[serde(default, alias = "fullMarks")]
    #[validate(range(min = 1, message = "Full marks must be a positive number"))]
    pub full_marks: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub category_id: Option<CategoryId>,
    /// Joined from `categories` at read time
    #[sqlx(default)]
    pub category_name: Option<String>,
    pub name: String,
    pub code: String,
    pub duration: String,
    pub fee: f64,
    pub exam_fee: f64,
    pub description: Option<String>,
    #[schema(value_type = Vec<CourseSubject>)]
    pub subjects: Json<Vec<CourseSubject>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Name is required"),
        length(max = 200, message = "Name must be at most 200 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Code is required"),
        length(max = 30, message = "Code must be at most 30 characters")
    )]
    pub code: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Duration is required"))]
    pub duration: String,
    #[serde(default)]
    #[validate(
        required(message = "Fee is required"),
        range(min = 0.0, message = "Fee must be zero or more")
    )]
    pub fee: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Exam fee must be zero or more"))]
    pub exam_fee: f64,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub subjects: Vec<CourseSubject>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    pub category_id: Option<CategoryId>,
    #[validate(
        custom(function = "non_blank", message = "Name cannot be empty"),
        length(max = 200, message = "Name must be at most 200 characters")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "non_blank", message = "Code cannot be empty"),
        length(max = 30, message = "Code must be at most 30 characters")
    )]
    pub code: Option<String>,
    #[validate(custom(function = "non_blank", message = "Duration cannot be empty"))]
    pub duration: Option<String>,
    #[validate(range(min = 0.0, message = "Fee must be zero or more"))]
    pub fee: Option<f64>,
    #[validate(range(min = 0.0, message = "Exam fee must be zero or more"))]
    pub exam_fee: Option<f64>,
    pub description: Option<String>,
    #[validate(nested)]
    pub subjects: Option<Vec<CourseSubject>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CourseFilterParams {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Include soft-deleted courses
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<Course>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateCourseDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        for key in ["name", "code", "duration", "fee"] {
            assert!(fields.contains(key), "missing error for {key}");
        }
        assert!(!fields.contains("exam_fee"));
    }

    #[test]
    fn blank_subject_name_is_keyed_by_row() {
        let dto: CreateCourseDto = serde_json::from_str(
            r#"{"name":"DCA","code":"DCA","duration":"6 Months","fee":4500,
                "subjects":[{"name":"Tally","fullMarks":100},{"name":"  ","fullMarks":50}]}"#,
        )
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("subjects[1].name"), Some("Subject name is required"));
    }
}
