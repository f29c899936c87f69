use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use edunexus_core::{AppError, PaginationMeta, PaginationParams};
use edunexus_models::{
    CreateDeliveryDto, Delivery, DeliveryFilterParams, DeliveryId, PaginatedDeliveriesResponse,
    UpdateDeliveryDto,
};

use crate::utils::sql::{UniqueField, map_unique_violation, push_search};

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Delivery not found"))
}

fn write_error(err: sqlx::Error, consignment_id: &str) -> AppError {
    map_unique_violation(
        err,
        &[UniqueField::new(
            "deliveries_consignment_id_key",
            "consignment_id",
            "Consignment ID",
            consignment_id,
        )],
    )
}

pub struct DeliveryService;

impl DeliveryService {
    #[instrument(skip(db, dto), fields(db.table = "deliveries", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateDeliveryDto) -> Result<Delivery, AppError> {
        let consignment_id = dto.consignment_id.trim().to_string();

        let delivery = sqlx::query_as::<_, Delivery>(
            r#"INSERT INTO deliveries
                   (id, centre_name, consignment_id, courier, status, tracking_link, dispatched_on, remarks)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(DeliveryId::new())
        .bind(dto.centre_name.trim())
        .bind(&consignment_id)
        .bind(dto.courier.trim())
        .bind(dto.status)
        .bind(dto.tracking_link)
        .bind(dto.dispatched_on)
        .bind(dto.remarks)
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, &consignment_id))?;

        info!(delivery_id = %delivery.id, consignment_id = %delivery.consignment_id, "Delivery recorded");
        Ok(delivery)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &DeliveryFilterParams) {
        qb.push(" WHERE 1=1");
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &filters.search {
            push_search(qb, &["centre_name", "consignment_id", "courier"], search);
        }
    }

    #[instrument(skip(db), fields(db.table = "deliveries", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: DeliveryFilterParams,
        pagination: PaginationParams,
    ) -> Result<PaginatedDeliveriesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM deliveries");
        Self::push_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM deliveries");
        Self::push_filters(&mut query, &filters);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Delivery>().fetch_all(db).await?;

        Ok(PaginatedDeliveriesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "deliveries", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: DeliveryId) -> Result<Delivery, AppError> {
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Public tracking lookup.
    #[instrument(skip(db), fields(db.table = "deliveries", db.operation = "SELECT"))]
    pub async fn track(db: &PgPool, consignment_id: &str) -> Result<Delivery, AppError> {
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE consignment_id = $1")
            .bind(consignment_id.trim())
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No delivery found for this consignment ID")))
    }

    #[instrument(skip(db, dto), fields(db.table = "deliveries", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: DeliveryId, dto: UpdateDeliveryDto) -> Result<Delivery, AppError> {
        let consignment_id = dto.consignment_id.map(|c| c.trim().to_string());

        sqlx::query_as::<_, Delivery>(
            r#"UPDATE deliveries
               SET centre_name = COALESCE($2, centre_name),
                   consignment_id = COALESCE($3, consignment_id),
                   courier = COALESCE($4, courier),
                   status = COALESCE($5, status),
                   tracking_link = COALESCE($6, tracking_link),
                   dispatched_on = COALESCE($7, dispatched_on),
                   remarks = COALESCE($8, remarks),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.centre_name.map(|n| n.trim().to_string()))
        .bind(&consignment_id)
        .bind(dto.courier.map(|c| c.trim().to_string()))
        .bind(dto.status)
        .bind(dto.tracking_link)
        .bind(dto.dispatched_on)
        .bind(dto.remarks)
        .fetch_optional(db)
        .await
        .map_err(|e| write_error(e, consignment_id.as_deref().unwrap_or("")))?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db), fields(db.table = "deliveries", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: DeliveryId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM deliveries WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(delivery_id = %id, "Delivery deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_models::DeliveryStatus;

    #[test]
    fn filters_bind_status_and_search() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM deliveries");
        let filters = DeliveryFilterParams {
            search: Some("DTDC".into()),
            status: Some(DeliveryStatus::InTransit),
        };
        DeliveryService::push_filters(&mut qb, &filters);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM deliveries WHERE 1=1 AND status = $1 \
             AND (centre_name ILIKE $2 OR consignment_id ILIKE $3 OR courier ILIKE $4)"
        );
    }
}
