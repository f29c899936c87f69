//! Fee receipts recorded against students.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use edunexus_core::PaginationMeta;

use crate::ids::StudentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "fee_status")]
pub enum FeeStatus {
    #[default]
    Paid,
    Partial,
    Due,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fee {
    pub id: Uuid,
    pub student_id: Option<StudentId>,
    pub centre_code: Option<String>,
    pub amount: f64,
    pub paid_on: NaiveDate,
    pub mode: Option<String>,
    pub receipt_no: Option<String>,
    pub remarks: Option<String>,
    pub status: FeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeDto {
    #[serde(default, alias = "studentId")]
    #[validate(required(message = "Student is required"))]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "Amount must be a positive number"))]
    pub amount: f64,
    #[serde(default, alias = "paidOn")]
    #[validate(required(message = "Payment date is required"))]
    pub paid_on: Option<NaiveDate>,
    pub mode: Option<String>,
    #[serde(alias = "receiptNo")]
    pub receipt_no: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub status: FeeStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeDto {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be a positive number"))]
    pub amount: Option<f64>,
    #[serde(alias = "paidOn")]
    pub paid_on: Option<NaiveDate>,
    pub mode: Option<String>,
    #[serde(alias = "receiptNo")]
    pub receipt_no: Option<String>,
    pub remarks: Option<String>,
    pub status: Option<FeeStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct FeeFilterParams {
    pub student_id: Option<StudentId>,
    pub centre_code: Option<String>,
    pub status: Option<FeeStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedFeesResponse {
    pub data: Vec<Fee>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateFeeDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("student_id"), Some("Student is required"));
        assert_eq!(fields.get("amount"), Some("Amount must be a positive number"));
        assert_eq!(fields.get("paid_on"), Some("Payment date is required"));
        assert_eq!(dto.status, FeeStatus::Paid);
    }
}
