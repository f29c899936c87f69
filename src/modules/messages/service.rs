use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::file_storage::FileStorage;
use edunexus_core::{AppError, Check, FieldRule, PaginationMeta, PaginationParams};
use edunexus_models::messages::{
    Message, MessageFilterParams, MessageStatus, PaginatedMessagesResponse,
};

use crate::utils::uploads::{StoredFiles, remove_files};
use crate::validator::FormPayload;

pub const ATTACHMENT: &str = "attachment";
const FILE_ALIASES: &[(&str, &str)] = &[("file", ATTACHMENT)];

const RULES: &[FieldRule] = &[
    FieldRule::optional("sender", "Sender").with(&[Check::MaxLen(120)]),
    FieldRule::required("subject", "Subject").with(&[Check::MaxLen(200)]),
    FieldRule::required("body", "Message"),
];

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Message not found"))
}

/// Who is reading or writing: staff see every message, a centre only its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScope<'a> {
    All,
    Centre(&'a str),
}

pub struct MessageService;

impl MessageService {
    /// A centre's messages are stamped with its own code; staff may name one
    /// in the form.
    #[instrument(skip(db, storage, payload), fields(db.table = "messages", db.operation = "INSERT"))]
    pub async fn create(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
        scope: MessageScope<'_>,
        sender: &str,
    ) -> Result<Message, AppError> {
        payload.alias_files(FILE_ALIASES);
        payload.ensure_file_fields(&[ATTACHMENT])?;
        payload.validate(RULES, &[], Utc::now().date_naive())?;
        let form = &payload.form;

        let centre_code = match scope {
            MessageScope::Centre(code) => Some(code.to_string()),
            MessageScope::All => form.text("centre_code"),
        };

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let result = sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages (id, centre_code, sender, subject, body, attachment)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(centre_code)
        .bind(form.text_or("sender", sender))
        .bind(form.text("subject"))
        .bind(form.text("body"))
        .bind(stored.key(ATTACHMENT))
        .fetch_one(db)
        .await
        .map_err(AppError::database);
        let message = stored.settle(result).await?;

        info!(message_id = %message.id, centre_code = ?message.centre_code, "Message received");
        Ok(message)
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        filters: &MessageFilterParams,
        scope: MessageScope<'_>,
    ) {
        qb.push(" WHERE 1=1");
        match scope {
            MessageScope::Centre(code) => {
                qb.push(" AND centre_code = ").push_bind(code.to_string());
            }
            MessageScope::All => {
                if let Some(code) = &filters.centre_code {
                    qb.push(" AND centre_code = ").push_bind(code.clone());
                }
            }
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
    }

    #[instrument(skip(db), fields(db.table = "messages", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: MessageFilterParams,
        pagination: PaginationParams,
        scope: MessageScope<'_>,
    ) -> Result<PaginatedMessagesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM messages");
        Self::push_filters(&mut count, &filters, scope);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM messages");
        Self::push_filters(&mut query, &filters, scope);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Message>().fetch_all(db).await?;

        Ok(PaginatedMessagesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    /// Another centre's message reads as not found.
    #[instrument(skip(db), fields(db.table = "messages", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid, scope: MessageScope<'_>) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)?;

        match scope {
            MessageScope::Centre(code) if message.centre_code.as_deref() != Some(code) => {
                Err(not_found())
            }
            _ => Ok(message),
        }
    }

    #[instrument(skip(db), fields(db.table = "messages", db.operation = "UPDATE"))]
    pub async fn set_status(db: &PgPool, id: Uuid, status: MessageStatus) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db, storage), fields(db.table = "messages", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, storage: &Arc<dyn FileStorage>, id: Uuid) -> Result<(), AppError> {
        let message = sqlx::query_as::<_, Message>("DELETE FROM messages WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)?;

        remove_files(storage.as_ref(), message.attachment.as_deref()).await;
        info!(message_id = %id, "Message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_scope_ignores_requested_centre() {
        let filters = MessageFilterParams {
            centre_code: Some("CEN-OTHER".into()),
            status: Some(MessageStatus::Unread),
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM messages");
        MessageService::push_filters(&mut qb, &filters, MessageScope::Centre("CEN-001"));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM messages WHERE 1=1 AND centre_code = $1 AND status = $2"
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM messages");
        MessageService::push_filters(&mut qb, &MessageFilterParams::default(), MessageScope::All);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM messages WHERE 1=1");
    }
}
