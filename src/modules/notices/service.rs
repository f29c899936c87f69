use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldRule, PaginationMeta, PaginationParams};
use edunexus_models::PublishStatus;
use edunexus_models::notices::{Notice, PaginatedNoticesResponse};

use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub const ATTACHMENT: &str = "attachment";
const FILE_ALIASES: &[(&str, &str)] = &[("notice_file", ATTACHMENT), ("file", ATTACHMENT)];

const CREATE_RULES: &[FieldRule] = &[
    FieldRule::required("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("status", "Status").with(&[Check::OneOf(PublishStatus::NAMES)]),
    FieldRule::optional("published_on", "Published on").with(&[Check::Date]),
];

const UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("status", "Status").with(&[Check::OneOf(PublishStatus::NAMES)]),
    FieldRule::optional("published_on", "Published on").with(&[Check::Date]),
];

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Notice not found"))
}

fn prepare(payload: &mut FormPayload, rules: &[FieldRule]) -> Result<(), AppError> {
    payload.alias_files(FILE_ALIASES);
    payload.ensure_file_fields(&[ATTACHMENT])?;
    payload.validate(rules, &[], Utc::now().date_naive())
}

pub struct NoticeService;

impl NoticeService {
    #[instrument(skip(db, storage, payload), fields(db.table = "notices", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<Notice, AppError> {
        prepare(&mut payload, CREATE_RULES)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, Notice>(
            r#"INSERT INTO notices (id, title, body, attachment, status, published_on)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("title"))
        .bind(form.text("body"))
        .bind(stored.key(ATTACHMENT))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .bind(form.date("published_on").unwrap_or_else(|| Utc::now().date_naive()))
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let notice = stored.settle(result).await?;

        info!(notice_id = %notice.id, "Notice published");
        Ok(notice)
    }

    /// `include_inactive` is for staff listings; the public board shows active notices only.
    #[instrument(skip(db), fields(db.table = "notices", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        pagination: PaginationParams,
        include_inactive: bool,
    ) -> Result<PaginatedNoticesResponse, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notices WHERE $1 OR status = 'Active'",
        )
        .bind(include_inactive)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Notice>(
            r#"SELECT * FROM notices
               WHERE $1 OR status = 'Active'
               ORDER BY published_on DESC NULLS LAST, created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(include_inactive)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedNoticesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "notices", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Notice, AppError> {
        sqlx::query_as::<_, Notice>("SELECT * FROM notices WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Fields not sent keep their value; a new attachment replaces the old file.
    #[instrument(skip(db, storage, payload), fields(db.table = "notices", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<Notice, AppError> {
        prepare(&mut payload, UPDATE_RULES)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded = stored.supersedes(ATTACHMENT, current.attachment.as_deref());
        let result = sqlx::query_as::<_, Notice>(
            r#"UPDATE notices
               SET title = COALESCE($2, title),
                   body = COALESCE($3, body),
                   attachment = COALESCE($4, attachment),
                   status = COALESCE($5, status),
                   published_on = COALESCE($6, published_on),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("title"))
        .bind(form.text("body"))
        .bind(stored.key(ATTACHMENT))
        .bind(form.choice::<PublishStatus>("status"))
        .bind(form.date("published_on"))
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
        .and_then(|row| row.ok_or_else(not_found));
        let notice = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.as_deref()).await;
        Ok(notice)
    }

    #[instrument(skip(db, storage), fields(db.table = "notices", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let notice = sqlx::query_as::<_, Notice>("DELETE FROM notices WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)?;

        remove_files(storage.as_ref(), notice.attachment.as_deref()).await;
        info!(notice_id = %id, "Notice deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_core::FormData;

    #[test]
    fn create_requires_title_and_valid_status() {
        let mut payload = FormPayload::from_form(FormData::from_pairs([("status", "Archived")]));
        let err = prepare(&mut payload, CREATE_RULES).unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.contains("title"));
        assert!(fields.contains("status"));
    }

    #[test]
    fn update_accepts_an_empty_form() {
        let mut payload = FormPayload::default();
        assert!(prepare(&mut payload, UPDATE_RULES).is_ok());
    }
}
