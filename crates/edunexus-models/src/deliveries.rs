//! Study-material deliveries to centres.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use edunexus_core::{PaginationMeta, non_blank};

use crate::ids::DeliveryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "delivery_status")]
pub enum DeliveryStatus {
    #[default]
    Active,
    Delivered,
    #[serde(rename = "In Transit")]
    #[sqlx(rename = "In Transit")]
    InTransit,
    Returned,
}

/// `centre_name` is free text; it is not checked against the centres table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Delivery {
    pub id: DeliveryId,
    pub centre_name: String,
    pub consignment_id: String,
    pub courier: String,
    pub status: DeliveryStatus,
    pub tracking_link: Option<String>,
    pub dispatched_on: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDeliveryDto {
    #[serde(default, alias = "centreName", alias = "centerName", alias = "centre")]
    #[validate(custom(function = "non_blank", message = "Centre name is required"))]
    pub centre_name: String,
    #[serde(default, alias = "consignmentId")]
    #[validate(
        custom(function = "non_blank", message = "Consignment ID is required"),
        length(max = 64, message = "Consignment ID must be at most 64 characters")
    )]
    pub consignment_id: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Courier is required"))]
    pub courier: String,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default, alias = "trackingLink")]
    #[validate(url(message = "Tracking link must be a valid URL"))]
    pub tracking_link: Option<String>,
    #[serde(default, alias = "dispatchedOn")]
    pub dispatched_on: Option<NaiveDate>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDeliveryDto {
    #[serde(alias = "centreName", alias = "centerName")]
    #[validate(custom(function = "non_blank", message = "Centre name cannot be empty"))]
    pub centre_name: Option<String>,
    #[serde(alias = "consignmentId")]
    #[validate(
        custom(function = "non_blank", message = "Consignment ID cannot be empty"),
        length(max = 64, message = "Consignment ID must be at most 64 characters")
    )]
    pub consignment_id: Option<String>,
    #[validate(custom(function = "non_blank", message = "Courier cannot be empty"))]
    pub courier: Option<String>,
    pub status: Option<DeliveryStatus>,
    #[serde(alias = "trackingLink")]
    #[validate(url(message = "Tracking link must be a valid URL"))]
    pub tracking_link: Option<String>,
    #[serde(alias = "dispatchedOn")]
    pub dispatched_on: Option<NaiveDate>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DeliveryFilterParams {
    pub search: Option<String>,
    pub status: Option<DeliveryStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedDeliveriesResponse {
    pub data: Vec<Delivery>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_transit_uses_spaced_name() {
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::InTransit).unwrap(),
            r#""In Transit""#
        );
        let parsed: DeliveryStatus = serde_json::from_str(r#""In Transit""#).unwrap();
        assert_eq!(parsed, DeliveryStatus::InTransit);
    }

    #[test]
    fn create_dto_requires_consignment_id() {
        let dto: CreateDeliveryDto = serde_json::from_str(
            r#"{"centreName":"Alpha","consignmentId":"","courier":"DTDC"}"#,
        )
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("consignment_id"));
        assert_eq!(dto.status, DeliveryStatus::Active);
    }

    #[test]
    fn empty_body_reports_every_required_field() {
        let dto: CreateDeliveryDto = serde_json::from_str("{}").unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("centre_name"), Some("Centre name is required"));
        assert_eq!(fields.get("consignment_id"), Some("Consignment ID is required"));
        assert_eq!(fields.get("courier"), Some("Courier is required"));
    }

    #[test]
    fn whitespace_only_values_are_blank() {
        let dto: CreateDeliveryDto = serde_json::from_str(
            r#"{"centreName":"   ","consignmentId":"\t","courier":"DTDC"}"#,
        )
        .unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert!(fields.contains("centre_name"));
        assert!(fields.contains("consignment_id"));
        assert!(!fields.contains("courier"));

        let dto: UpdateDeliveryDto = serde_json::from_str(r#"{"courier":"  "}"#).unwrap();
        let fields = edunexus_core::FieldErrors::from(dto.validate().unwrap_err());
        assert_eq!(fields.get("courier"), Some("Courier cannot be empty"));
    }
}
