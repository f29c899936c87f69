use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};

use edunexus_core::file_storage::FileStorage;
use edunexus_core::forms::parse_datetime;
use edunexus_core::identifiers::{
    Reservation, centre_code_candidate, login_id_candidate, reserve_with_retry, temporary_password,
};
use edunexus_core::{
    AppError, FieldErrors, PaginationMeta, PaginationParams, duplicate_message, hash_password, validate_rules,
};
use edunexus_models::{
    Centre, CentreFilterParams, CentreId, CentreRegistrationResponse, CentreSource, CentreStatus,
    PaginatedCentresResponse, RenewalStatus, SetRenewalDto,
};
use edunexus_observability::{track_centre_registered, track_identifier_exhausted, track_identifier_retry};

use super::form::{
    ADMIN_RULES, CentreFields, FILE_FIELDS, ONLINE_ALIASES, ONLINE_FILE_ALIASES, ONLINE_RULES,
};
use super::lifecycle;
use crate::utils::sql::{UniqueField, map_unique_violation, push_search};
use crate::utils::uploads::{StoredFiles, remove_files, replaced_keys};
use crate::validator::FormPayload;

const CODE_KEY: &str = "centres_centre_code_key";
const LOGIN_KEY: &str = "centres_login_id_key";

const SEARCH_COLUMNS: &[&str] = &["centre_name", "centre_code", "login_id", "owner_name", "mobile"];

fn source_label(source: CentreSource) -> &'static str {
    match source {
        CentreSource::Admin => "admin",
        CentreSource::Online => "online",
    }
}

/// Values for one insert attempt.
struct NewCentre<'a> {
    id: CentreId,
    centre_code: String,
    login_id: String,
    password_hash: &'a str,
    source: CentreSource,
    status: CentreStatus,
    approved: bool,
    window: lifecycle::RenewalWindow,
    documents: Vec<(&'static str, Option<String>)>,
    fields: &'a CentreFields,
}

pub struct CentreService;

impl CentreService {
    /// Registers a centre from an admin or online form.
    ///
    /// Validation runs before any file is written. Supplied identifiers are
    /// pre-checked; generated ones are reserved by the insert itself and
    /// retried on collision.
    #[instrument(skip(db, storage, payload), fields(db.table = "centres", db.operation = "INSERT"))]
    pub async fn register(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
        source: CentreSource,
    ) -> Result<CentreRegistrationResponse, AppError> {
        let rules = match source {
            CentreSource::Admin => ADMIN_RULES,
            CentreSource::Online => {
                payload.form.apply_aliases(ONLINE_ALIASES);
                payload.alias_files(ONLINE_FILE_ALIASES);
                ONLINE_RULES
            }
        };
        payload.ensure_file_fields(FILE_FIELDS)?;

        let form = &payload.form;
        let mut errors = validate_rules(form, rules, Utc::now().date_naive());
        if source == CentreSource::Admin && !form.contains("password") {
            errors.add("password", "Password is required");
        }
        errors.into_result()?;

        let fields = CentreFields::from_form(form);
        let supplied_code = form.text("centre_code");
        let supplied_login = form.text("login_id");
        Self::ensure_identifiers_free(db, supplied_code.as_deref(), supplied_login.as_deref(), None)
            .await?;

        let (password_hash, temporary) = match form.get("password") {
            Some(password) => (hash_password(password)?, None),
            None => {
                let generated = temporary_password();
                (hash_password(&generated)?, Some(generated))
            }
        };

        let (status, approved) = lifecycle::initial_status(source);
        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let documents: Vec<(&'static str, Option<String>)> =
            FILE_FIELDS.iter().map(|f| (*f, stored.key(f))).collect();

        let fields = &fields;
        let password_hash = password_hash.as_str();
        let code_generated = supplied_code.is_none();
        let login_generated = supplied_login.is_none();

        let result = reserve_with_retry("centre identifiers", |_attempt| {
            let now = Utc::now();
            let new = NewCentre {
                id: CentreId::new(),
                centre_code: supplied_code
                    .clone()
                    .unwrap_or_else(|| centre_code_candidate(now)),
                login_id: supplied_login
                    .clone()
                    .unwrap_or_else(|| login_id_candidate(Some(fields.mobile.as_str()), now)),
                password_hash,
                source,
                status,
                approved,
                window: lifecycle::initial_window(now),
                documents: documents.clone(),
                fields,
            };
            async move {
                match Self::insert(db, &new).await {
                    Ok(centre) => Ok(Reservation::Reserved(centre)),
                    Err(e) => match edunexus_db::unique_violation(&e) {
                        Some(constraint)
                            if (constraint == CODE_KEY && code_generated)
                                || (constraint == LOGIN_KEY && login_generated) =>
                        {
                            track_identifier_retry(&constraint);
                            Ok(Reservation::Collision(constraint))
                        }
                        _ => Err(map_unique_violation(
                            e,
                            &[
                                UniqueField::new(CODE_KEY, "centre_code", "Centre code", &new.centre_code),
                                UniqueField::new(LOGIN_KEY, "login_id", "Login ID", &new.login_id),
                            ],
                        )),
                    },
                }
            }
        })
        .await;

        if matches!(&result, Err(e) if e.code == Some("identifier_exhausted")) {
            track_identifier_exhausted("centre identifiers");
        }
        let centre = stored.settle(result).await?;

        track_centre_registered(source_label(source));
        info!(
            centre_id = %centre.id,
            centre_code = %centre.centre_code,
            source = source_label(source),
            "Centre registered"
        );

        Ok(CentreRegistrationResponse {
            centre,
            temporary_password: temporary,
        })
    }

    async fn insert(db: &PgPool, new: &NewCentre<'_>) -> Result<Centre, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO centres (id, centre_code, login_id, password, source, status, approved, \
             renewal_from, renewal_to, renewal_status, renewed_at",
        );
        for (column, _) in &new.documents {
            qb.push(", ").push(*column);
        }
        for (column, _) in new.fields.columns() {
            qb.push(", ").push(*column);
        }
        qb.push(") VALUES (");
        {
            let mut sep = qb.separated(", ");
            sep.push_bind(new.id)
                .push_bind(new.centre_code.clone())
                .push_bind(new.login_id.clone())
                .push_bind(new.password_hash.to_string())
                .push_bind(new.source)
                .push_bind(new.status)
                .push_bind(new.approved)
                .push_bind(new.window.from)
                .push_bind(new.window.to)
                .push_bind(new.window.status)
                .push_bind(new.window.renewed_at);
            for (_, key) in &new.documents {
                sep.push_bind(key.clone());
            }
            for (_, value) in new.fields.columns() {
                value.clone().push_bind(&mut sep);
            }
        }
        qb.push(") RETURNING *");

        qb.build_query_as::<Centre>().fetch_one(db).await
    }

    /// Best-effort pre-check. The unique indexes remain authoritative.
    async fn ensure_identifiers_free(
        db: &PgPool,
        centre_code: Option<&str>,
        login_id: Option<&str>,
        exclude: Option<CentreId>,
    ) -> Result<(), AppError> {
        let checks = [
            ("centre_code", "Centre code", centre_code),
            ("login_id", "Login ID", login_id),
        ];
        let mut taken_fields = FieldErrors::new();
        for (column, label, value) in checks {
            let Some(value) = value else { continue };
            let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM centres WHERE ");
            qb.push(column).push(" = ").push_bind(value.to_string());
            if let Some(id) = exclude {
                qb.push(" AND id <> ").push_bind(id);
            }
            qb.push(")");
            let taken: bool = qb.build_query_scalar().fetch_one(db).await?;
            if taken {
                taken_fields.add(column, duplicate_message(label, value));
            }
        }
        if taken_fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::duplicates(taken_fields))
        }
    }

    /// Full-form replace with the admin rule set. File fields that are not
    /// sent keep their previous paths; replaced files are removed afterwards.
    #[instrument(skip(db, storage, payload), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: CentreId,
        payload: FormPayload,
    ) -> Result<Centre, AppError> {
        payload.ensure_file_fields(FILE_FIELDS)?;
        let existing = Self::get(db, id).await?;

        let form = &payload.form;
        validate_rules(form, ADMIN_RULES, Utc::now().date_naive()).into_result()?;

        let fields = CentreFields::from_form(form);
        let centre_code = form.text_or("centre_code", "");
        let login_id = form.text_or("login_id", "");
        Self::ensure_identifiers_free(db, Some(&centre_code), Some(&login_id), Some(id)).await?;

        let password_hash = form.get("password").map(hash_password).transpose()?;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let previous = existing.document_keys();

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE centres SET ");
        {
            let mut sep = qb.separated(", ");
            sep.push("centre_code = ").push_bind_unseparated(centre_code.clone());
            sep.push("login_id = ").push_bind_unseparated(login_id.clone());
            if let Some(hash) = password_hash {
                sep.push("password = ").push_bind_unseparated(hash);
            }
            for field in FILE_FIELDS {
                let key = stored.key(field).or_else(|| {
                    previous
                        .iter()
                        .find(|(f, _)| f == field)
                        .map(|(_, k)| k.to_string())
                });
                sep.push(*field).push_unseparated(" = ").push_bind_unseparated(key);
            }
            for (column, value) in fields.columns() {
                sep.push(*column).push_unseparated(" = ");
                value.clone().push_bind_unseparated(&mut sep);
            }
            sep.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        let result = qb
            .build_query_as::<Centre>()
            .fetch_one(db)
            .await
            .map_err(|e| {
                map_unique_violation(
                    e,
                    &[
                        UniqueField::new(CODE_KEY, "centre_code", "Centre code", &centre_code),
                        UniqueField::new(LOGIN_KEY, "login_id", "Login ID", &login_id),
                    ],
                )
            });
        let updated = stored.settle(result).await?;

        let current = updated.document_keys();
        remove_files(storage.as_ref(), replaced_keys(&previous, &current)).await;

        Ok(updated)
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: CentreId) -> Result<Centre, AppError> {
        sqlx::query_as::<_, Centre>("SELECT * FROM centres WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Centre not found")))
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "SELECT"))]
    pub async fn get_by_code(db: &PgPool, centre_code: &str) -> Result<Centre, AppError> {
        sqlx::query_as::<_, Centre>("SELECT * FROM centres WHERE centre_code = $1")
            .bind(centre_code)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Centre not found")))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &CentreFilterParams, trash: bool) {
        qb.push(" WHERE 1=1");
        match (trash, filters.status) {
            (true, _) => {
                qb.push(" AND status = ").push_bind(CentreStatus::Deleted);
            }
            (false, Some(status)) => {
                qb.push(" AND status = ").push_bind(status);
            }
            (false, None) => {
                qb.push(" AND status <> ").push_bind(CentreStatus::Deleted);
            }
        }
        if let Some(source) = filters.source {
            qb.push(" AND source = ").push_bind(source);
        }
        if let Some(renewal_status) = filters.renewal_status {
            qb.push(" AND renewal_status = ").push_bind(renewal_status);
        }
        if let Some(approved) = filters.approved {
            qb.push(" AND approved = ").push_bind(approved);
        }
        if let Some(state) = filters.state.as_deref().filter(|s| !s.trim().is_empty()) {
            qb.push(" AND centre_state ILIKE ").push_bind(state.trim().to_string());
        }
        if let Some(search) = &filters.search {
            push_search(qb, SEARCH_COLUMNS, search);
        }
    }

    /// Lists centres. Deleted centres only appear in the trash listing or
    /// when asked for by status.
    #[instrument(skip(db), fields(db.table = "centres", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: CentreFilterParams,
        pagination: PaginationParams,
        trash: bool,
    ) -> Result<PaginatedCentresResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM centres");
        Self::push_filters(&mut count, &filters, trash);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM centres");
        Self::push_filters(&mut query, &filters, trash);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Centre>().fetch_all(db).await?;

        Ok(PaginatedCentresResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    /// Loads the centre under a row lock, applies `apply` and writes the
    /// lifecycle columns back in the same transaction.
    async fn transition<F>(db: &PgPool, id: CentreId, action: &'static str, apply: F) -> Result<Centre, AppError>
    where
        F: FnOnce(&mut Centre, DateTime<Utc>) -> Result<(), AppError>,
    {
        let mut tx = db.begin().await?;

        let mut centre = sqlx::query_as::<_, Centre>("SELECT * FROM centres WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Centre not found")))?;

        apply(&mut centre, Utc::now())?;

        let updated = sqlx::query_as::<_, Centre>(
            r#"UPDATE centres
               SET status = $2, approved = $3, renewal_from = $4, renewal_to = $5,
                   renewal_status = $6, renewed_at = $7, deleted_at = $8, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(centre.status)
        .bind(centre.approved)
        .bind(centre.renewal_from)
        .bind(centre.renewal_to)
        .bind(centre.renewal_status)
        .bind(centre.renewed_at)
        .bind(centre.deleted_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            centre_id = %id,
            action,
            status = ?updated.status,
            renewal_status = ?updated.renewal_status,
            renewal_to = %updated.renewal_to,
            "Centre lifecycle updated"
        );
        Ok(updated)
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn set_renewal(db: &PgPool, id: CentreId, dto: SetRenewalDto) -> Result<Centre, AppError> {
        let mut errors = FieldErrors::new();
        let from = parse_datetime(&dto.renewal_from);
        let to = parse_datetime(&dto.renewal_to);
        if from.is_none() {
            errors.add("renewal_from", "Renewal start date must be a valid date");
        }
        if to.is_none() {
            errors.add("renewal_to", "Renewal end date must be a valid date");
        }
        let (Some(from), Some(to)) = (from, to) else {
            return Err(AppError::validation(errors));
        };

        Self::transition(db, id, "set_renewal", |centre, now| {
            lifecycle::set_renewal(centre, from, to, now)
        })
        .await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn renew(db: &PgPool, id: CentreId) -> Result<Centre, AppError> {
        Self::transition(db, id, "renew", |centre, now| {
            if centre.renewal_status == RenewalStatus::Expired || centre.status == CentreStatus::Deleted {
                warn!(
                    centre_id = %centre.id,
                    status = ?centre.status,
                    renewal_status = ?centre.renewal_status,
                    "Renewing a centre that is expired or deleted"
                );
            }
            lifecycle::renew(centre, now);
            Ok(())
        })
        .await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn expire(db: &PgPool, id: CentreId) -> Result<Centre, AppError> {
        Self::transition(db, id, "expire", |centre, _| {
            lifecycle::expire(centre);
            Ok(())
        })
        .await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn soft_delete(db: &PgPool, id: CentreId) -> Result<Centre, AppError> {
        Self::transition(db, id, "delete", |centre, now| {
            lifecycle::soft_delete(centre, now);
            Ok(())
        })
        .await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn restore(
        db: &PgPool,
        id: CentreId,
        status: Option<CentreStatus>,
    ) -> Result<Centre, AppError> {
        Self::transition(db, id, "restore", |centre, _| lifecycle::restore(centre, status)).await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn approve(db: &PgPool, id: CentreId, approved: bool) -> Result<Centre, AppError> {
        Self::transition(db, id, "approve", |centre, _| {
            lifecycle::approve(centre, approved);
            Ok(())
        })
        .await
    }

    #[instrument(skip(db), fields(db.table = "centres", db.operation = "UPDATE"))]
    pub async fn set_status(db: &PgPool, id: CentreId, status: CentreStatus) -> Result<Centre, AppError> {
        Self::transition(db, id, "set_status", |centre, _| lifecycle::set_status(centre, status)).await
    }
}
