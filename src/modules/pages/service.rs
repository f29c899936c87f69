use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldRule};
use edunexus_models::PublishStatus;
use edunexus_models::pages::{CreatePageDto, Page, TeamMember, UpdatePageDto};

use crate::utils::sql::{UniqueField, map_unique_violation};
use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub struct PageService;

impl PageService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Page not found"))
    }

    #[instrument(skip(db, dto), fields(db.table = "pages", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreatePageDto) -> Result<Page, AppError> {
        let page = sqlx::query_as::<_, Page>(
            r#"INSERT INTO pages (id, slug, title, content, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&dto.slug)
        .bind(dto.title.trim())
        .bind(dto.content)
        .bind(dto.status)
        .fetch_one(db)
        .await
        .map_err(|e| {
            map_unique_violation(e, &[UniqueField::new("pages_slug_key", "slug", "Slug", &dto.slug)])
        })?;

        info!(page_id = %page.id, slug = %page.slug, "Page created");
        Ok(page)
    }

    #[instrument(skip(db), fields(db.table = "pages", db.operation = "SELECT"))]
    pub async fn list(db: &PgPool) -> Result<Vec<Page>, AppError> {
        let pages = sqlx::query_as::<_, Page>("SELECT * FROM pages ORDER BY title")
            .fetch_all(db)
            .await?;
        Ok(pages)
    }

    /// Public lookups see active pages only.
    #[instrument(skip(db), fields(db.table = "pages", db.operation = "SELECT"))]
    pub async fn get_by_slug(db: &PgPool, slug: &str, include_inactive: bool) -> Result<Page, AppError> {
        sqlx::query_as::<_, Page>(
            "SELECT * FROM pages WHERE slug = $1 AND ($2 OR status = 'Active')",
        )
        .bind(slug)
        .bind(include_inactive)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, dto), fields(db.table = "pages", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, slug: &str, dto: UpdatePageDto) -> Result<Page, AppError> {
        sqlx::query_as::<_, Page>(
            r#"UPDATE pages
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   status = COALESCE($4, status),
                   updated_at = NOW()
               WHERE slug = $1
               RETURNING *"#,
        )
        .bind(slug)
        .bind(dto.title.map(|t| t.trim().to_string()))
        .bind(dto.content)
        .bind(dto.status)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db), fields(db.table = "pages", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, slug: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM pages WHERE slug = $1")
            .bind(slug)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }
        info!(slug = %slug, "Page deleted");
        Ok(())
    }
}

pub const TEAM_PHOTO: &str = "team_photo";

const TEAM_RULES: &[FieldRule] = &[
    FieldRule::required("name", "Name").with(&[Check::MaxLen(120)]),
    FieldRule::required("designation", "Designation").with(&[Check::MaxLen(120)]),
    FieldRule::optional("position", "Position").with(&[Check::NonNegative]),
    FieldRule::optional("status", "Status").with(&[Check::OneOf(PublishStatus::NAMES)]),
];

const TEAM_UPDATE_RULES: &[FieldRule] = &[
    FieldRule::optional("name", "Name").with(&[Check::MaxLen(120)]),
    FieldRule::optional("designation", "Designation").with(&[Check::MaxLen(120)]),
    FieldRule::optional("position", "Position").with(&[Check::NonNegative]),
    FieldRule::optional("status", "Status").with(&[Check::OneOf(PublishStatus::NAMES)]),
];

fn prepare_team(payload: &mut FormPayload, rules: &[FieldRule]) -> Result<(), AppError> {
    payload.alias_files(&[("photo", TEAM_PHOTO), ("image", TEAM_PHOTO)]);
    payload.ensure_file_fields(&[TEAM_PHOTO])?;
    payload.validate(rules, &[], Utc::now().date_naive())
}

pub struct TeamService;

impl TeamService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Team member not found"))
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "team_members", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<TeamMember, AppError> {
        prepare_team(&mut payload, TEAM_RULES)?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, TeamMember>(
            r#"INSERT INTO team_members (id, name, designation, bio, photo, position, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("name"))
        .bind(form.text("designation"))
        .bind(form.text("bio"))
        .bind(stored.key(TEAM_PHOTO))
        .bind(form.number::<i32>("position").unwrap_or(0))
        .bind(form.choice::<PublishStatus>("status").unwrap_or_default())
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let member = stored.settle(result).await?;

        info!(team_member_id = %member.id, "Team member added");
        Ok(member)
    }

    #[instrument(skip(db), fields(db.table = "team_members", db.operation = "SELECT"))]
    pub async fn list(db: &PgPool, include_inactive: bool) -> Result<Vec<TeamMember>, AppError> {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE $1 OR status = 'Active' ORDER BY position, name",
        )
        .bind(include_inactive)
        .fetch_all(db)
        .await?;
        Ok(members)
    }

    async fn get(db: &PgPool, id: Uuid) -> Result<TeamMember, AppError> {
        sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db, storage, payload), fields(db.table = "team_members", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: Uuid,
        mut payload: FormPayload,
    ) -> Result<TeamMember, AppError> {
        prepare_team(&mut payload, TEAM_UPDATE_RULES)?;
        let current = Self::get(db, id).await?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let superseded = stored.supersedes(TEAM_PHOTO, current.photo.as_deref());
        let result = sqlx::query_as::<_, TeamMember>(
            r#"UPDATE team_members
               SET name = COALESCE($2, name),
                   designation = COALESCE($3, designation),
                   bio = COALESCE($4, bio),
                   photo = COALESCE($5, photo),
                   position = COALESCE($6, position),
                   status = COALESCE($7, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(form.text("name"))
        .bind(form.text("designation"))
        .bind(form.text("bio"))
        .bind(stored.key(TEAM_PHOTO))
        .bind(form.number::<i32>("position"))
        .bind(form.choice::<PublishStatus>("status"))
        .fetch_optional(db)
        .await
        .map_err(AppError::database)
        .and_then(|row| row.ok_or_else(Self::not_found));
        let member = stored.settle(result).await?;

        remove_files(storage.as_ref(), superseded.as_deref()).await;
        Ok(member)
    }

    #[instrument(skip(db, storage), fields(db.table = "team_members", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let member = sqlx::query_as::<_, TeamMember>(
            "DELETE FROM team_members WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)?;

        remove_files(storage.as_ref(), member.photo.as_deref()).await;
        info!(team_member_id = %id, "Team member removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_core::FormData;

    #[test]
    fn team_member_needs_name_and_designation() {
        let mut payload = FormPayload::from_form(FormData::from_pairs([("position", "-1")]));
        let err = prepare_team(&mut payload, TEAM_RULES).unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("designation"));
        assert_eq!(fields.get("position"), Some("Position must be zero or more"));
    }
}
