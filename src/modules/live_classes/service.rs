use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::{AppError, FieldErrors, PaginationMeta, PaginationParams};
use edunexus_models::live_classes::{
    CreateLiveClassDto, LiveClass, LiveClassFilterParams, PaginatedLiveClassesResponse,
    UpdateLiveClassDto,
};

use crate::utils::sql::map_write_error;

const SELECT_LIVE_CLASS: &str = "SELECT lc.*, co.name AS course_name FROM live_classes lc \
                                 LEFT JOIN courses co ON co.id = lc.course_id";

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Live class not found"))
}

fn write_error(err: sqlx::Error) -> AppError {
    map_write_error(err, "course_id", "Selected course does not exist", &[])
}

/// `ends_at` must fall strictly after `starts_at`.
pub fn check_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), AppError> {
    if ends_at > starts_at {
        return Ok(());
    }
    let mut errors = FieldErrors::new();
    errors.add("ends_at", "End time must be after the start time");
    Err(AppError::validation(errors))
}

pub struct LiveClassService;

impl LiveClassService {
    #[instrument(skip(db, dto), fields(db.table = "live_classes", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateLiveClassDto) -> Result<LiveClass, AppError> {
        if let (Some(starts_at), Some(ends_at)) = (dto.starts_at, dto.ends_at) {
            check_window(starts_at, ends_at)?;
        }

        let class = sqlx::query_as::<_, LiveClass>(
            r#"WITH lc AS (
                   INSERT INTO live_classes (id, course_id, title, starts_at, ends_at, description, video_link)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   RETURNING *
               )
               SELECT lc.*, co.name AS course_name FROM lc
               LEFT JOIN courses co ON co.id = lc.course_id"#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.course_id)
        .bind(dto.title.trim())
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .bind(dto.description)
        .bind(dto.video_link.trim())
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        info!(live_class_id = %class.id, course_id = %class.course_id, "Live class scheduled");
        Ok(class)
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        filters: &LiveClassFilterParams,
        now: DateTime<Utc>,
    ) {
        qb.push(" WHERE 1=1");
        if let Some(course_id) = filters.course_id {
            qb.push(" AND lc.course_id = ").push_bind(course_id);
        }
        if filters.upcoming.unwrap_or(false) {
            qb.push(" AND lc.ends_at > ").push_bind(now);
        }
    }

    #[instrument(skip(db), fields(db.table = "live_classes", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: LiveClassFilterParams,
        pagination: PaginationParams,
    ) -> Result<PaginatedLiveClassesResponse, AppError> {
        let now = Utc::now();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM live_classes lc");
        Self::push_filters(&mut count, &filters, now);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_LIVE_CLASS);
        Self::push_filters(&mut query, &filters, now);
        query
            .push(" ORDER BY lc.starts_at LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<LiveClass>().fetch_all(db).await?;

        Ok(PaginatedLiveClassesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "live_classes", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<LiveClass, AppError> {
        sqlx::query_as::<_, LiveClass>(&format!("{} WHERE lc.id = $1", SELECT_LIVE_CLASS))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Partial update; the window is checked against the merged times.
    #[instrument(skip(db, dto), fields(db.table = "live_classes", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateLiveClassDto) -> Result<LiveClass, AppError> {
        let current = Self::get(db, id).await?;
        let starts_at = dto.starts_at.unwrap_or(current.starts_at);
        let ends_at = dto.ends_at.unwrap_or(current.ends_at);
        check_window(starts_at, ends_at)?;

        sqlx::query_as::<_, LiveClass>(
            r#"WITH lc AS (
                   UPDATE live_classes
                   SET course_id = COALESCE($2, course_id),
                       title = COALESCE($3, title),
                       starts_at = $4,
                       ends_at = $5,
                       description = COALESCE($6, description),
                       video_link = COALESCE($7, video_link),
                       updated_at = NOW()
                   WHERE id = $1
                   RETURNING *
               )
               SELECT lc.*, co.name AS course_name FROM lc
               LEFT JOIN courses co ON co.id = lc.course_id"#,
        )
        .bind(id)
        .bind(dto.course_id)
        .bind(dto.title.map(|t| t.trim().to_string()))
        .bind(starts_at)
        .bind(ends_at)
        .bind(dto.description)
        .bind(dto.video_link.map(|v| v.trim().to_string()))
        .fetch_optional(db)
        .await
        .map_err(write_error)?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db), fields(db.table = "live_classes", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM live_classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(live_class_id = %id, "Live class deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_must_move_forward() {
        let start = Utc::now();
        assert!(check_window(start, start + Duration::minutes(45)).is_ok());

        let err = check_window(start, start).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(err.fields.unwrap().contains("ends_at"));
        assert!(check_window(start, start - Duration::minutes(1)).is_err());
    }

    #[test]
    fn upcoming_filter_compares_end_time() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM live_classes lc");
        let filters = LiveClassFilterParams {
            upcoming: Some(true),
            ..Default::default()
        };
        LiveClassService::push_filters(&mut qb, &filters, Utc::now());
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM live_classes lc WHERE 1=1 AND lc.ends_at > $1"
        );
    }
}
