//! Library books and downloadable files. Each row owns its uploaded file(s).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use edunexus_core::PaginationMeta;
use edunexus_core::serde::deserialize_optional_uuid;

use crate::common::PublishStatus;
use crate::ids::CourseId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub course_id: Option<CourseId>,
    pub file: String,
    pub cover_image: Option<String>,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn file_keys(&self) -> Vec<&str> {
        std::iter::once(self.file.as_str())
            .chain(self.cover_image.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Download {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file: String,
    pub status: PublishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookFilterParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub course_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedBooksResponse {
    pub data: Vec<Book>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedDownloadsResponse {
    pub data: Vec<Download>,
    pub meta: PaginationMeta,
}
