//! Types shared by several modules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Visibility of site content (notices, gallery, sliders, pages, library files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "publish_status")]
pub enum PublishStatus {
    #[default]
    Active,
    Inactive,
}

impl PublishStatus {
    pub const NAMES: &'static [&'static str] = &["Active", "Inactive"];
}
