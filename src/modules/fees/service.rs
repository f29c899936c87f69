use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::{AppError, FieldErrors, PaginationMeta, PaginationParams};
use edunexus_models::fees::{CreateFeeDto, Fee, FeeFilterParams, PaginatedFeesResponse, UpdateFeeDto};

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Fee record not found"))
}

pub struct FeeService;

impl FeeService {
    /// Records a receipt. The student's centre code is copied onto the row so
    /// centre logins can list their own receipts.
    #[instrument(skip(db, dto), fields(db.table = "fees", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateFeeDto) -> Result<Fee, AppError> {
        let centre_code: Option<Option<String>> = sqlx::query_scalar(
            "SELECT centre_code FROM students WHERE id = $1 AND NOT is_deleted",
        )
        .bind(dto.student_id)
        .fetch_optional(db)
        .await?;

        let Some(centre_code) = centre_code else {
            let mut errors = FieldErrors::new();
            errors.add("student_id", "Selected student does not exist");
            return Err(AppError::validation(errors));
        };

        let fee = sqlx::query_as::<_, Fee>(
            r#"INSERT INTO fees (id, student_id, centre_code, amount, paid_on, mode, receipt_no, remarks, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.student_id)
        .bind(centre_code)
        .bind(dto.amount)
        .bind(dto.paid_on)
        .bind(dto.mode)
        .bind(dto.receipt_no)
        .bind(dto.remarks)
        .bind(dto.status)
        .fetch_one(db)
        .await?;

        info!(fee_id = %fee.id, student_id = ?fee.student_id, amount = fee.amount, "Fee recorded");
        Ok(fee)
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        filters: &FeeFilterParams,
        centre: Option<&str>,
    ) {
        qb.push(" WHERE 1=1");
        if let Some(code) = centre.map(str::to_string).or_else(|| filters.centre_code.clone()) {
            qb.push(" AND centre_code = ").push_bind(code);
        }
        if let Some(student_id) = filters.student_id {
            qb.push(" AND student_id = ").push_bind(student_id);
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
    }

    /// `centre` pins the listing to one centre regardless of the filters.
    #[instrument(skip(db), fields(db.table = "fees", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: FeeFilterParams,
        pagination: PaginationParams,
        centre: Option<&str>,
    ) -> Result<PaginatedFeesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM fees");
        Self::push_filters(&mut count, &filters, centre);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM fees");
        Self::push_filters(&mut query, &filters, centre);
        query
            .push(" ORDER BY paid_on DESC, created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Fee>().fetch_all(db).await?;

        Ok(PaginatedFeesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "fees", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid, centre: Option<&str>) -> Result<Fee, AppError> {
        let fee = sqlx::query_as::<_, Fee>("SELECT * FROM fees WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)?;
        match centre {
            Some(code) if fee.centre_code.as_deref() != Some(code) => Err(not_found()),
            _ => Ok(fee),
        }
    }

    #[instrument(skip(db, dto), fields(db.table = "fees", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateFeeDto) -> Result<Fee, AppError> {
        sqlx::query_as::<_, Fee>(
            r#"UPDATE fees
               SET amount = COALESCE($2, amount),
                   paid_on = COALESCE($3, paid_on),
                   mode = COALESCE($4, mode),
                   receipt_no = COALESCE($5, receipt_no),
                   remarks = COALESCE($6, remarks),
                   status = COALESCE($7, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.amount)
        .bind(dto.paid_on)
        .bind(dto.mode)
        .bind(dto.receipt_no)
        .bind(dto.remarks)
        .bind(dto.status)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db), fields(db.table = "fees", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fees WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(fee_id = %id, "Fee record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_pin_overrides_requested_centre() {
        let filters = FeeFilterParams {
            centre_code: Some("CEN-OTHER".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM fees");
        FeeService::push_filters(&mut qb, &filters, Some("CEN-001"));
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM fees WHERE 1=1 AND centre_code = $1");
    }
}
