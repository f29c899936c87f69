//! Pagination utilities for list endpoints.
//!
//! Lists accept either `limit` + `offset` or `limit` + `page` query
//! parameters. When `page` is given it takes precedence over `offset`.
//!
//! ```ignore
//! async fn list_centres(
//!     State(state): State<AppState>,
//!     Query(params): Query<PaginationParams>,
//! ) -> Result<Json<PaginatedCentresResponse>, AppError> {
//!     let rows = fetch(params.limit(), params.offset()).await?;
//!     let total = count().await?;
//!     Ok(Json(PaginatedCentresResponse { data: rows, meta: PaginationMeta::new(total, &params) }))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query strings arrive as text; empty strings count as absent.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items
    pub total: i64,
    /// Limit that was applied
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether more items follow this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        Self {
            total,
            limit,
            offset: Some(offset),
            page: params.page(),
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// Query parameters for pagination.
///
/// `limit` is clamped to [1, 100], `offset` to at least 0 and `page` to at
/// least 1.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams { limit, offset, page }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_boundary_cases() {
        for (input, expected) in [(Some(1), 1), (Some(100), 100), (Some(101), 100), (Some(0), 1), (Some(-1), 1)] {
            assert_eq!(params(input, None, None).limit(), expected);
        }
    }

    #[test]
    fn test_negative_offset_clamped() {
        assert_eq!(params(Some(10), Some(-5), None).offset(), 0);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(5), Some(3));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page(), Some(3));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        assert_eq!(params(Some(10), None, Some(0)).offset(), 0);
    }

    #[test]
    fn test_huge_page_and_offset_saturate() {
        let p = params(Some(10), None, Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
        assert!(!PaginationMeta::new(25, &p).has_more);

        let p = params(Some(100), Some(i64::MAX), None);
        assert_eq!(p.offset(), i64::MAX);
        let meta = PaginationMeta::new(i64::MAX, &p);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_strings_and_empty() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"25","offset":""}"#).unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 0);

        let p: PaginationParams = serde_json::from_str(r#"{"page":2}"#).unwrap();
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_meta_has_more() {
        let meta = PaginationMeta::new(25, &params(Some(10), None, Some(2)));
        assert!(meta.has_more);
        assert_eq!(meta.offset, Some(10));

        let meta = PaginationMeta::new(25, &params(Some(10), None, Some(3)));
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_serialize_skips_missing_page() {
        let meta = PaginationMeta::new(5, &PaginationParams::default());
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains(r#""total":5"#));
        assert!(!json.contains("page"));
    }
}
