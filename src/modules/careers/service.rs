use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldRule, PaginationMeta, PaginationParams};
use edunexus_models::careers::{
    ApplicationStatus, JobApplication, JobApplicationFilterParams,
    PaginatedJobApplicationsResponse,
};

use crate::utils::sql::push_search;
use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub const RESUME: &str = "resume";
const FILE_ALIASES: &[(&str, &str)] = &[("cv", RESUME), ("file", RESUME)];
const FORM_ALIASES: &[(&str, &str)] = &[
    ("full_name", "name"),
    ("phone", "mobile"),
    ("post", "position"),
    ("job_title", "position"),
    ("message", "cover_letter"),
];

const RULES: &[FieldRule] = &[
    FieldRule::required("name", "Name").with(&[Check::MaxLen(120)]),
    FieldRule::required("email", "Email").with(&[Check::Email]),
    FieldRule::required("mobile", "Mobile").with(&[Check::MinDigits(10)]),
    FieldRule::required("position", "Position").with(&[Check::MaxLen(120)]),
];

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Job application not found"))
}

pub struct CareerService;

impl CareerService {
    #[instrument(skip(db, storage, payload), fields(db.table = "job_applications", db.operation = "INSERT"))]
    pub async fn apply(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
    ) -> Result<JobApplication, AppError> {
        payload.form.apply_aliases(FORM_ALIASES);
        payload.alias_files(FILE_ALIASES);
        payload.ensure_file_fields(&[RESUME])?;
        payload.validate(RULES, &[], Utc::now().date_naive())?;
        let form = &payload.form;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, JobApplication>(
            r#"INSERT INTO job_applications
                   (id, name, email, mobile, position, experience, cover_letter, resume)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(form.text("name"))
        .bind(form.get("email").map(str::to_ascii_lowercase))
        .bind(form.text("mobile"))
        .bind(form.text("position"))
        .bind(form.text("experience"))
        .bind(form.text("cover_letter"))
        .bind(stored.key(RESUME))
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let application = stored.settle(result).await?;

        info!(application_id = %application.id, position = %application.position, "Job application received");
        Ok(application)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &JobApplicationFilterParams) {
        qb.push(" WHERE 1=1");
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(position) = &filters.position {
            push_search(qb, &["position"], position);
        }
    }

    #[instrument(skip(db), fields(db.table = "job_applications", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: JobApplicationFilterParams,
        pagination: PaginationParams,
    ) -> Result<PaginatedJobApplicationsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_applications");
        Self::push_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM job_applications");
        Self::push_filters(&mut query, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<JobApplication>().fetch_all(db).await?;

        Ok(PaginatedJobApplicationsResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "job_applications", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<JobApplication, AppError> {
        sqlx::query_as::<_, JobApplication>("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(db), fields(db.table = "job_applications", db.operation = "UPDATE"))]
    pub async fn set_status(
        db: &PgPool,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<JobApplication, AppError> {
        sqlx::query_as::<_, JobApplication>(
            "UPDATE job_applications SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db, storage), fields(db.table = "job_applications", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let application = sqlx::query_as::<_, JobApplication>(
            "DELETE FROM job_applications WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)?;

        remove_files(storage.as_ref(), application.resume.as_deref()).await;
        info!(application_id = %id, "Job application deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_core::{FormData, validate_rules};

    #[test]
    fn aliases_feed_the_required_fields() {
        let mut form = FormData::from_pairs([
            ("fullName", "Meena Rao"),
            ("email", "meena@example.com"),
            ("phone", "9876501234"),
            ("jobTitle", "Computer Instructor"),
        ]);
        form.apply_aliases(FORM_ALIASES);
        let today = Utc::now().date_naive();
        assert!(validate_rules(&form, RULES, today).is_empty());

        let errors = validate_rules(&FormData::new(), RULES, today);
        assert_eq!(errors.len(), 4);
    }
}
