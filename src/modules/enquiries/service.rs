use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::{AppError, PaginationMeta, PaginationParams};
use edunexus_models::PublishStatus;
use edunexus_models::enquiries::{
    Contact, ContactFilterParams, CreateContactDto, CreateFeedbackDto, EnquiryStatus, Feedback,
    PaginatedContactsResponse, PaginatedFeedbackResponse,
};

pub struct ContactService;

impl ContactService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Enquiry not found"))
    }

    #[instrument(skip(db, dto), fields(db.table = "contacts", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateContactDto) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"INSERT INTO contacts (id, name, email, mobile, subject, message)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.name.trim())
        .bind(dto.email.map(|e| e.trim().to_ascii_lowercase()))
        .bind(dto.mobile.trim())
        .bind(dto.subject)
        .bind(dto.message)
        .fetch_one(db)
        .await?;

        info!(contact_id = %contact.id, "Enquiry received");
        Ok(contact)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ContactFilterParams) {
        qb.push(" WHERE 1=1");
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
    }

    #[instrument(skip(db), fields(db.table = "contacts", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: ContactFilterParams,
        pagination: PaginationParams,
    ) -> Result<PaginatedContactsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts");
        Self::push_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM contacts");
        Self::push_filters(&mut query, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Contact>().fetch_all(db).await?;

        Ok(PaginatedContactsResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "contacts", db.operation = "UPDATE"))]
    pub async fn set_status(db: &PgPool, id: Uuid, status: EnquiryStatus) -> Result<Contact, AppError> {
        sqlx::query_as::<_, Contact>(
            "UPDATE contacts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db), fields(db.table = "contacts", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

pub struct FeedbackService;

impl FeedbackService {
    fn not_found() -> AppError {
        AppError::not_found(anyhow!("Feedback not found"))
    }

    /// New feedback stays hidden until staff publish it.
    #[instrument(skip(db, dto), fields(db.table = "feedback", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateFeedbackDto) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"INSERT INTO feedback (id, name, email, rating, message, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.name.trim())
        .bind(dto.email.map(|e| e.trim().to_ascii_lowercase()))
        .bind(dto.rating)
        .bind(dto.message)
        .bind(PublishStatus::Inactive)
        .fetch_one(db)
        .await?;

        info!(feedback_id = %feedback.id, rating = feedback.rating, "Feedback received");
        Ok(feedback)
    }

    #[instrument(skip(db), fields(db.table = "feedback", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        pagination: PaginationParams,
        include_inactive: bool,
    ) -> Result<PaginatedFeedbackResponse, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM feedback WHERE $1 OR status = 'Active'",
        )
        .bind(include_inactive)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Feedback>(
            r#"SELECT * FROM feedback
               WHERE $1 OR status = 'Active'
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(include_inactive)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedFeedbackResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "feedback", db.operation = "UPDATE"))]
    pub async fn set_status(db: &PgPool, id: Uuid, status: PublishStatus) -> Result<Feedback, AppError> {
        sqlx::query_as::<_, Feedback>(
            "UPDATE feedback SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(Self::not_found)
    }

    #[instrument(skip(db), fields(db.table = "feedback", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
