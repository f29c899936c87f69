//! Student models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};
use edunexus_core::serde::{deserialize_optional_flag, deserialize_optional_uuid};

use crate::ids::{CourseId, StudentId};

/// Admin registrations require the full form; online ones use a looser set
/// and get generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "registration_type")]
pub enum RegistrationType {
    Admin,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "student_status")]
pub enum StudentStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Dropped,
}

impl StudentStatus {
    pub const NAMES: &'static [&'static str] = &["Pending", "Active", "Completed", "Dropped"];
}

/// Scheduled exam paper printed on the admit card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct AdmitSubject {
    #[serde(default, alias = "subjectName", alias = "subject")]
    #[validate(custom(function = "non_blank", message = "Subject name is required"))]
    pub name: String,
    #[serde(default, alias = "fullMarks")]
    #[validate(range(min = 1, message = "Full marks must be a positive number"))]
    pub full_marks: i32,
    #[serde(default, alias = "examDate")]
    pub exam_date: Option<String>,
    #[serde(default, alias = "examTime")]
    pub exam_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct SubjectMark {
    #[serde(default, alias = "subjectName", alias = "subject")]
    #[validate(custom(function = "non_blank", message = "Subject name is required"))]
    pub name: String,
    #[serde(default, alias = "fullMarks")]
    #[validate(range(min = 1, message = "Full marks must be a positive number"))]
    pub full_marks: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Obtained marks cannot be negative"))]
    pub obtained: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub registration_type: RegistrationType,
    pub enrollment_no: String,
    pub roll_no: String,

    pub student_name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub mobile: String,
    pub email: Option<String>,
    pub education: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,

    pub course_id: Option<CourseId>,
    /// Joined from `courses` at read time
    #[sqlx(default)]
    pub course_name: Option<String>,
    pub centre_code: Option<String>,
    pub session: Option<String>,
    pub admission_date: NaiveDate,
    pub duration: Option<String>,
    pub total_fee: f64,
    pub paid_fee: f64,

    #[schema(value_type = Vec<AdmitSubject>)]
    pub admit_subjects: Json<Vec<AdmitSubject>>,
    #[schema(value_type = Vec<SubjectMark>)]
    pub marks: Json<Vec<SubjectMark>>,

    pub photo: Option<String>,
    pub id_proof: Option<String>,
    pub qualification_proof: Option<String>,
    pub question_paper: Option<String>,
    pub answer_sheet: Option<String>,

    pub admit_issued: bool,
    pub marksheet_issued: bool,
    pub certificate_issued: bool,
    pub semester_issued: bool,
    pub student_status: StudentStatus,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn document_keys(&self) -> Vec<(&'static str, &str)> {
        [
            ("photo", self.photo.as_deref()),
            ("id_proof", self.id_proof.as_deref()),
            ("qualification_proof", self.qualification_proof.as_deref()),
            ("question_paper", self.question_paper.as_deref()),
            ("answer_sheet", self.answer_sheet.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, key)| key.map(|k| (field, k)))
        .collect()
    }

    pub fn due_fee(&self) -> f64 {
        (self.total_fee - self.paid_fee).max(0.0)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Matches name, enrollment number, roll number or mobile
    pub search: Option<String>,
    pub centre_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub course_id: Option<Uuid>,
    pub student_status: Option<StudentStatus>,
    pub registration_type: Option<RegistrationType>,
    pub session: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub admit_issued: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub certificate_issued: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetAdmitSubjectsDto {
    #[serde(default, alias = "admitSubjects")]
    #[validate(length(min = 1, message = "At least one subject is required"), nested)]
    pub subjects: Vec<AdmitSubject>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetMarksDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one subject is required"), nested)]
    pub marks: Vec<SubjectMark>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStudentStatusDto {
    #[serde(alias = "studentStatus")]
    pub student_status: StudentStatus,
}

/// Workflow flags that can be toggled directly.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IssueFlagsDto {
    pub admit_issued: Option<bool>,
    pub marksheet_issued: Option<bool>,
    pub certificate_issued: Option<bool>,
    pub semester_issued: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_subject_accepts_camel_case() {
        let subject: AdmitSubject = serde_json::from_str(
            r#"{"subjectName":"Computer Fundamentals","fullMarks":100,"examDate":"2025-03-10"}"#,
        )
        .unwrap();
        assert_eq!(subject.name, "Computer Fundamentals");
        assert_eq!(subject.full_marks, 100);
        assert_eq!(subject.exam_time, None);
    }

    #[test]
    fn marks_validation_is_nested() {
        let dto: SetMarksDto =
            serde_json::from_str(r#"{"marks":[{"name":"","fullMarks":0,"obtained":-1}]}"#).unwrap();
        assert!(dto.validate().is_err());

        let dto: SetMarksDto =
            serde_json::from_str(r#"{"marks":[{"name":"Tally","fullMarks":100,"obtained":72}]}"#)
                .unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn mark_errors_are_keyed_by_row() {
        let dto: SetMarksDto = serde_json::from_str(
            r#"{"marks":[{"name":"Tally","fullMarks":100},{"name":"  ","fullMarks":0}]}"#,
        )
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("marks[1].name"), Some("Subject name is required"));
        assert_eq!(fields.get("marks[1].full_marks"), Some("Full marks must be a positive number"));
        assert!(!fields.contains("marks[0].name"));

        let dto: SetAdmitSubjectsDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("subjects"), Some("At least one subject is required"));
    }
}
