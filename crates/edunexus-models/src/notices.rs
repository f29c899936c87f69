use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use edunexus_core::PaginationMeta;

use crate::common::PublishStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    /// Upload key of an optional attachment
    pub attachment: Option<String>,
    pub status: PublishStatus,
    pub published_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedNoticesResponse {
    pub data: Vec<Notice>,
    pub meta: PaginationMeta,
}
