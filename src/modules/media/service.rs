use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldRule, PaginationMeta, PaginationParams};
use edunexus_models::PublishStatus;
use edunexus_models::media::{GalleryItem, PaginatedGalleryResponse, Slider};

use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub const GALLERY_IMAGE: &str = "gallery_image";
pub const SLIDER_IMAGE: &str = "slider_image";

const STATUS: &[Check] = &[Check::OneOf(PublishStatus::NAMES)];

const GALLERY_RULES: &[FieldRule] = &[
    FieldRule::required("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("album", "Album").with(&[Check::MaxLen(120)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const GALLERY_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("album", "Album").with(&[Check::MaxLen(120)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const SLIDER_RULES: &[FieldRule] = &[
    FieldRule::required("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("position", "Position").with(&[Check::NonNegative]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const SLIDER_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("position", "Position").with(&[Check::NonNegative]),
    FieldRule::optional("status", "Status").with(STATUS),
];

fn prepare(
    payload: &mut FormPayload,
    field: &str,
    rules: &[FieldRule],
    image_required: bool,
) -> Result<(), AppError> {
    payload.alias_files(&[("image", field), ("photo", field), ("file", field)]);
    payload.ensure_file_fields(&[field])?;
    let image = [(field, "Image")];
    let required: &[(&str, &str)] = if image_required { &image } else { &[] };
    payload.validate(rules, required, Utc::now().date_naive())
}

pub struct GalleryService;

impl GalleryService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Gallery item not found"))
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "gallery_items", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<GalleryItem, AppError> {
        prepare(&mut payload, GALLERY_IMAGE, GALLERY_RULES, true)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, GalleryItem>(
            r#"INSERT INTO gallery_items (id, title, image, album, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("title"))
        .bind(stored.key(GALLERY_IMAGE))
        .bind(form.text("album"))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let item = stored.settle(result).await?;

        info!(gallery_item_id = %item.id, "Gallery image added");
        Ok(item)
    }

    #[instrument(skip(db), fields(db.table = "gallery_items", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        pagination: PaginationParams,
        include_inactive: bool,
    ) -> Result<PaginatedGalleryResponse, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM gallery_items WHERE $1 OR status = 'Active'",
        )
        .bind(include_inactive)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, GalleryItem>(
            r#"SELECT * FROM gallery_items
               WHERE $1 OR status = 'Active'
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(include_inactive)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedGalleryResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    async fn get(db: &PgPool, id: Uuid) -> Result<GalleryItem, AppError> {
        sqlx::query_as::<_, GalleryItem>("SELECT * FROM gallery_items WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "gallery_items", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<GalleryItem, AppError> {
        prepare(&mut payload, GALLERY_IMAGE, GALLERY_UPDATE_RULES, false)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded = stored.supersedes(GALLERY_IMAGE, Some(&current.image));
        let result = sqlx::query_as::<_, GalleryItem>(
            r#"UPDATE gallery_items
               SET title = COALESCE($2, title),
                   image = COALESCE($3, image),
                   album = COALESCE($4, album),
                   status = COALESCE($5, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("title"))
        .bind(stored.key(GALLERY_IMAGE))
        .bind(form.text("album"))
        .bind(form.choice::<PublishStatus>("status"))
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
        .and_then(|row| row.ok_or_else(Self::not_found));
        let item = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.as_deref()).await;
        Ok(item)
    }

    #[instrument(skip(db, storage), fields(db.table = "gallery_items", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let item = sqlx::query_as::<_, GalleryItem>(
            "DELETE FROM gallery_items WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)?;

        remove_files(storage.as_ref(), [item.image.as_str()]).await;
        info!(gallery_item_id = %id, "Gallery image deleted");
        Ok(())
    }
}

pub struct SliderService;

impl SliderService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Slider not found"))
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "sliders", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<Slider, AppError> {
        prepare(&mut payload, SLIDER_IMAGE, SLIDER_RULES, true)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, Slider>(
            r#"INSERT INTO sliders (id, title, subtitle, image, link, position, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("title"))
        .bind(form.text("subtitle"))
        .bind(stored.key(SLIDER_IMAGE))
        .bind(form.text("link"))
        .bind(form.number::<i32>("position").unwrap_or(0))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let slider = stored.settle(result).await?;

        info!(slider_id = %slider.id, "Slider added");
        Ok(slider)
    }

    /// Sliders in display order.
    #[instrument(skip(db), fields(db.table = "sliders", db.operation = "SELECT"))]
    pub async fn list(db: &PgPool, include_inactive: bool) -> Result<Vec<Slider>, AppError> {
        let sliders = sqlx::query_as::<_, Slider>(
            "SELECT * FROM sliders WHERE $1 OR status = 'Active' ORDER BY position, created_at",
        )
        .bind(include_inactive)
        .fetch_all(db)
        .await?;
        Ok(sliders)
    }

    async fn get(db: &PgPool, id: Uuid) -> Result<Slider, AppError> {
        sqlx::query_as::<_, Slider>("SELECT * FROM sliders WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "sliders", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<Slider, AppError> {
        prepare(&mut payload, SLIDER_IMAGE, SLIDER_UPDATE_RULES, false)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded = stored.supersedes(SLIDER_IMAGE, Some(&current.image));
        let result = sqlx::query_as::<_, Slider>(
            r#"UPDATE sliders
               SET title = COALESCE($2, title),
                   subtitle = COALESCE($3, subtitle),
                   image = COALESCE($4, image),
                   link = COALESCE($5, link),
                   position = COALESCE($6, position),
                   status = COALESCE($7, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("title"))
        .bind(form.text("subtitle"))
        .bind(stored.key(SLIDER_IMAGE))
        .bind(form.text("link"))
        .bind(form.number::<i32>("position"))
        .bind(form.choice::<PublishStatus>("status"))
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
        .and_then(|row| row.ok_or_else(Self::not_found));
        let slider = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.as_deref()).await;
        Ok(slider)
    }

    #[instrument(skip(db, storage), fields(db.table = "sliders", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let slider = sqlx::query_as::<_, Slider>("DELETE FROM sliders WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)?;

        remove_files(storage.as_ref(), [slider.image.as_str()]).await;
        info!(slider_id = %id, "Slider deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use edunexus_core::FormData;

    use crate::validator::UploadedFile;

    fn image(field: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: "banner.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn image_part_is_renamed_for_its_folder() {
        let mut payload = FormPayload {
            form: FormData::from_pairs([("title", "Admissions open")]),
            files: vec![image("image")],
        };
        prepare(&mut payload, SLIDER_IMAGE, SLIDER_RULES, true).unwrap();
        assert_eq!(payload.files[0].field, SLIDER_IMAGE);
    }

    #[test]
    fn create_requires_an_image() {
        let mut payload = FormPayload::from_form(FormData::from_pairs([("title", "Annual day")]));
        let err = prepare(&mut payload, GALLERY_IMAGE, GALLERY_RULES, true).unwrap_err();
        assert_eq!(err.fields.unwrap().get(GALLERY_IMAGE), Some("Image is required"));

        let mut payload = FormPayload::from_form(FormData::from_pairs([("title", "Annual day")]));
        assert!(prepare(&mut payload, GALLERY_IMAGE, GALLERY_UPDATE_RULES, false).is_ok());
    }
}
