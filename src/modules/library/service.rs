use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldErrors, FieldRule, PaginationMeta, PaginationParams};
use edunexus_models::PublishStatus;
use edunexus_models::library::{
    Book, BookFilterParams, Download, PaginatedBooksResponse, PaginatedDownloadsResponse,
};

use crate::utils::sql::{map_write_error, push_search};
use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub const BOOK_FILE: &str = "book_file";
pub const COVER_IMAGE: &str = "cover_image";
pub const DOWNLOAD_FILE: &str = "download_file";

const STATUS: &[Check] = &[Check::OneOf(PublishStatus::NAMES)];

const BOOK_RULES: &[FieldRule] = &[
    FieldRule::required("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("author", "Author").with(&[Check::MaxLen(120)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const BOOK_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("author", "Author").with(&[Check::MaxLen(120)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const DOWNLOAD_RULES: &[FieldRule] = &[
    FieldRule::required("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

const DOWNLOAD_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("title", "Title").with(&[Check::MaxLen(200)]),
    FieldRule::optional("status", "Status").with(STATUS),
];

fn prepare_book(payload: &mut FormPayload, creating: bool) -> Result<(), AppError> {
    payload.alias_files(&[("file", BOOK_FILE), ("pdf", BOOK_FILE), ("cover", COVER_IMAGE)]);
    payload.ensure_file_fields(&[BOOK_FILE, COVER_IMAGE])?;

    let today = Utc::now().date_naive();
    let result = if creating {
        payload.validate(BOOK_RULES, &[(BOOK_FILE, "Book file")], today)
    } else {
        payload.validate(BOOK_UPDATE_RULES, &[], today)
    };

    // course_id is optional but must name a course when present
    let mut errors = match result {
        Ok(()) => FieldErrors::new(),
        Err(err) => err.fields.unwrap_or_default(),
    };
    if payload.form.get("course_id").is_some() && payload.form.number::<Uuid>("course_id").is_none() {
        errors.add("course_id", "Course must be a valid course id");
    }
    errors.into_result()
}

fn prepare_download(payload: &mut FormPayload, creating: bool) -> Result<(), AppError> {
    payload.alias_files(&[("file", DOWNLOAD_FILE)]);
    payload.ensure_file_fields(&[DOWNLOAD_FILE])?;

    let today = Utc::now().date_naive();
    if creating {
        payload.validate(DOWNLOAD_RULES, &[(DOWNLOAD_FILE, "File")], today)
    } else {
        payload.validate(DOWNLOAD_UPDATE_RULES, &[], today)
    }
}

fn book_write_error(err: sqlx::Error) -> AppError {
    map_write_error(err, "course_id", "Selected course does not exist", &[])
}

pub struct BookService;

impl BookService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Book not found"))
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "books", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<Book, AppError> {
        prepare_book(&mut payload, true)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, Book>(
            r#"INSERT INTO books (id, title, author, course_id, file, cover_image, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("title"))
        .bind(form.text("author"))
        .bind(form.number::<Uuid>("course_id"))
        .bind(stored.key(BOOK_FILE))
        .bind(stored.key(COVER_IMAGE))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(book_write_error);
        let book = stored.settle(result).await?;

        info!(book_id = %book.id, "Book added to library");
        Ok(book)
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        filters: &BookFilterParams,
        include_inactive: bool,
    ) {
        qb.push(" WHERE 1=1");
        if !include_inactive {
            qb.push(" AND status = 'Active'");
        }
        if let Some(course_id) = filters.course_id {
            qb.push(" AND course_id = ").push_bind(course_id);
        }
        if let Some(search) = &filters.search {
            push_search(qb, &["title", "author"], search);
        }
    }

    #[instrument(skip(db), fields(db.table = "books", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: BookFilterParams,
        pagination: PaginationParams,
        include_inactive: bool,
    ) -> Result<PaginatedBooksResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        Self::push_filters(&mut count, &filters, include_inactive);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM books");
        Self::push_filters(&mut query, &filters, include_inactive);
        query
            .push(" ORDER BY title LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Book>().fetch_all(db).await?;

        Ok(PaginatedBooksResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "books", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<Book, AppError> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "books", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<Book, AppError> {
        prepare_book(&mut payload, false)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded: Vec<String> = [
            stored.supersedes(BOOK_FILE, Some(&current.file)),
            stored.supersedes(COVER_IMAGE, current.cover_image.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        let result = sqlx::query_as::<_, Book>(
            r#"UPDATE books
               SET title = COALESCE($2, title),
                   author = COALESCE($3, author),
                   course_id = COALESCE($4, course_id),
                   file = COALESCE($5, file),
                   cover_image = COALESCE($6, cover_image),
                   status = COALESCE($7, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("title"))
        .bind(form.text("author"))
        .bind(form.number::<Uuid>("course_id"))
        .bind(stored.key(BOOK_FILE))
        .bind(stored.key(COVER_IMAGE))
        .bind(form.choice::<PublishStatus>("status"))
        .fetch_optional(db)
        .await
        .map_err(book_write_error)
        .and_then(|row| row.ok_or_else(Self::not_found));
        let book = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.iter().map(String::as_str)).await;
        Ok(book)
    }

    /// Deletes the row, then its book file and cover.
    #[instrument(skip(db, storage), fields(db.table = "books", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let book = sqlx::query_as::<_, Book>("DELETE FROM books WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)?;

        remove_files(storage.as_ref(), book.file_keys()).await;
        info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

pub struct DownloadService;

impl DownloadService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Download not found"))
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "downloads", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<Download, AppError> {
        prepare_download(&mut payload, true)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, Download>(
            r#"INSERT INTO downloads (id, title, description, file, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("title"))
        .bind(form.text("description"))
        .bind(stored.key(DOWNLOAD_FILE))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let download = stored.settle(result).await?;

        info!(download_id = %download.id, "Download added");
        Ok(download)
    }

    #[instrument(skip(db), fields(db.table = "downloads", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        pagination: PaginationParams,
        include_inactive: bool,
    ) -> Result<PaginatedDownloadsResponse, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM downloads WHERE $1 OR status = 'Active'",
        )
        .bind(include_inactive)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Download>(
            r#"SELECT * FROM downloads
               WHERE $1 OR status = 'Active'
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(include_inactive)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedDownloadsResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    async fn get(db: &PgPool, id: Uuid) -> Result<Download, AppError> {
        sqlx::query_as::<_, Download>("SELECT * FROM downloads WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "downloads", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<Download, AppError> {
        prepare_download(&mut payload, false)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded = stored.supersedes(DOWNLOAD_FILE, Some(&current.file));
        let result = sqlx::query_as::<_, Download>(
            r#"UPDATE downloads
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   file = COALESCE($4, file),
                   status = COALESCE($5, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("title"))
        .bind(form.text("description"))
        .bind(stored.key(DOWNLOAD_FILE))
        .bind(form.choice::<PublishStatus>("status"))
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
        .and_then(|row| row.ok_or_else(Self::not_found));
        let download = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.as_deref()).await;
        Ok(download)
    }

    #[instrument(skip(db, storage), fields(db.table = "downloads", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let download = sqlx::query_as::<_, Download>(
            "DELETE FROM downloads WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)?;

        remove_files(storage.as_ref(), [download.file.as_str()]).await;
        info!(download_id = %id, "Download deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_core::FormData;

    #[test]
    fn book_needs_file_and_a_real_course_id() {
        let mut payload = FormPayload::from_form(FormData::from_pairs([
            ("title", "Fundamentals of Computers"),
            ("courseId", "dca"),
        ]));
        let err = prepare_book(&mut payload, true).unwrap_err();
        let fields = err.fields.unwrap();
        assert_eq!(fields.get(BOOK_FILE), Some("Book file is required"));
        assert!(fields.contains("course_id"));
        assert!(!fields.contains("title"));
    }

    #[test]
    fn public_book_listing_hides_inactive() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        BookService::push_filters(&mut qb, &BookFilterParams::default(), false);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM books WHERE 1=1 AND status = 'Active'");
    }

    #[test]
    fn download_update_needs_nothing() {
        let mut payload = FormPayload::default();
        assert!(prepare_download(&mut payload, false).is_ok());
        let mut payload = FormPayload::default();
        let err = prepare_download(&mut payload, true).unwrap_err();
        assert_eq!(err.fields.unwrap().len(), 2);
    }
}
