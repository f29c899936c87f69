//! Centre (franchise location) models and DTOs.
//!
//! A centre carries its own login credentials, an approval flag, a lifecycle
//! `status` and an independent renewal window. Soft deletion is a status
//! transition (`Deleted`) rather than row removal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};
use edunexus_core::serde::deserialize_optional_flag;

use crate::ids::CentreId;

/// How the centre entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "centre_source", rename_all = "lowercase")]
pub enum CentreSource {
    Admin,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "centre_status")]
pub enum CentreStatus {
    Active,
    Inactive,
    Pending,
    Deleted,
}

impl CentreStatus {
    pub const NAMES: &'static [&'static str] = &["Active", "Inactive", "Pending", "Deleted"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "renewal_status")]
pub enum RenewalStatus {
    Active,
    Pending,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Centre {
    pub id: CentreId,
    pub centre_name: String,
    pub centre_code: String,
    pub login_id: String,
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password: String,

    pub owner_name: String,
    pub father_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub pan_no: Option<String>,
    pub aadhar_no: Option<String>,
    pub education: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,

    pub centre_address: Option<String>,
    pub centre_city: Option<String>,
    pub centre_district: Option<String>,
    pub centre_state: Option<String>,
    pub centre_pincode: Option<String>,

    pub theory_room: bool,
    pub practical_room: bool,
    pub internet: bool,
    pub reception: bool,
    pub toilet: bool,
    pub power_backup: bool,
    pub computer_count: Option<i32>,
    pub centre_area: Option<f64>,
    pub staff_count: Option<i32>,

    pub offers_computer: bool,
    pub offers_vocational: bool,
    pub offers_language: bool,
    pub offers_typing: bool,

    pub owner_photo: Option<String>,
    pub centre_photo: Option<String>,
    pub id_proof: Option<String>,
    pub address_proof: Option<String>,
    pub signature: Option<String>,

    pub source: CentreSource,
    pub status: CentreStatus,
    pub approved: bool,

    pub renewal_from: DateTime<Utc>,
    pub renewal_to: DateTime<Utc>,
    pub renewal_status: RenewalStatus,
    pub renewed_at: Option<DateTime<Utc>>,

    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Centre {
    /// Document file keys currently attached, for cleanup on replacement.
    pub fn document_keys(&self) -> Vec<(&'static str, &str)> {
        [
            ("owner_photo", self.owner_photo.as_deref()),
            ("centre_photo", self.centre_photo.as_deref()),
            ("id_proof", self.id_proof.as_deref()),
            ("address_proof", self.address_proof.as_deref()),
            ("signature", self.signature.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, key)| key.map(|k| (field, k)))
        .collect()
    }
}

/// Result of a registration. The temporary password is present only when
/// one was generated for an online applicant and is never stored in clear.
#[derive(Debug, Serialize, ToSchema)]
pub struct CentreRegistrationResponse {
    pub centre: Centre,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCentresResponse {
    pub data: Vec<Centre>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CentreFilterParams {
    /// Matches centre name, code, login id, owner name or mobile
    pub search: Option<String>,
    pub status: Option<CentreStatus>,
    pub source: Option<CentreSource>,
    pub renewal_status: Option<RenewalStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub approved: Option<bool>,
    pub state: Option<String>,
}

/// Explicit renewal window. `renewal_from` must be in the future and before `renewal_to`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRenewalDto {
    #[serde(default, alias = "renewalFrom")]
    #[validate(custom(function = "non_blank", message = "Renewal start date is required"))]
    #[schema(example = "2026-01-01")]
    pub renewal_from: String,
    #[serde(default, alias = "renewalTo")]
    #[validate(custom(function = "non_blank", message = "Renewal end date is required"))]
    #[schema(example = "2028-01-01")]
    pub renewal_to: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RestoreCentreDto {
    /// Status to restore into; defaults to `Active`
    pub status: Option<CentreStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCentreStatusDto {
    pub status: CentreStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApproveCentreDto {
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_title_case() {
        assert_eq!(serde_json::to_string(&CentreStatus::Deleted).unwrap(), r#""Deleted""#);
        assert_eq!(serde_json::to_string(&CentreSource::Online).unwrap(), r#""online""#);
    }

    #[test]
    fn renewal_dto_accepts_camel_case() {
        let dto: SetRenewalDto =
            serde_json::from_str(r#"{"renewalFrom":"2026-01-01","renewalTo":"2028-01-01"}"#)
                .unwrap();
        assert_eq!(dto.renewal_from, "2026-01-01");
        assert!(dto.validate().is_ok());

        let dto: SetRenewalDto = serde_json::from_str(r#"{"renewalFrom":" "}"#).unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert!(fields.contains("renewal_from"));
        assert!(fields.contains("renewal_to"));
    }
}
