use chrono::NaiveDate;
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use edunexus_core::{AppError, FieldErrors};

/// A unique constraint and how to report a clash on it.
#[derive(Debug, Clone, Copy)]
pub struct UniqueField<'a> {
    pub constraint: &'a str,
    pub field: &'a str,
    pub label: &'a str,
    pub value: &'a str,
}

impl<'a> UniqueField<'a> {
    pub const fn new(constraint: &'a str, field: &'a str, label: &'a str, value: &'a str) -> Self {
        Self {
            constraint,
            field,
            label,
            value,
        }
    }
}

/// Converts a unique violation on one of `fields` into the duplicate error
/// shape; anything else stays a 500.
pub fn map_unique_violation(err: sqlx::Error, fields: &[UniqueField<'_>]) -> AppError {
    if let Some(constraint) = edunexus_db::unique_violation(&err) {
        if let Some(f) = fields.iter().find(|f| f.constraint == constraint) {
            return AppError::duplicate(f.field, f.label, f.value);
        }
        return AppError::bad_request(anyhow::anyhow!("A record with these details already exists"));
    }
    AppError::database(err)
}

/// Like [`map_unique_violation`], but a foreign key violation is reported
/// against `field` (for example a `course_id` that does not exist).
pub fn map_write_error(
    err: sqlx::Error,
    field: &str,
    message: &str,
    unique: &[UniqueField<'_>],
) -> AppError {
    if edunexus_db::is_foreign_key_violation(&err) {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        return AppError::validation(errors);
    }
    map_unique_violation(err, unique)
}

/// One bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Flag(bool),
    Int(Option<i32>),
    Real(Option<f64>),
    Uuid(Option<Uuid>),
}

impl Column {
    pub fn push_bind(self, sep: &mut Separated<'_, '_, Postgres, &'static str>) {
        match self {
            Column::Text(v) => sep.push_bind(v),
            Column::Date(v) => sep.push_bind(v),
            Column::Flag(v) => sep.push_bind(v),
            Column::Int(v) => sep.push_bind(v),
            Column::Real(v) => sep.push_bind(v),
            Column::Uuid(v) => sep.push_bind(v),
        };
    }

    pub fn push_bind_unseparated(self, sep: &mut Separated<'_, '_, Postgres, &'static str>) {
        match self {
            Column::Text(v) => sep.push_bind_unseparated(v),
            Column::Date(v) => sep.push_bind_unseparated(v),
            Column::Flag(v) => sep.push_bind_unseparated(v),
            Column::Int(v) => sep.push_bind_unseparated(v),
            Column::Real(v) => sep.push_bind_unseparated(v),
            Column::Uuid(v) => sep.push_bind_unseparated(v),
        };
    }
}

/// Appends `AND (col1 ILIKE $n OR col2 ILIKE $n ...)` for a search term.
pub fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: &str) {
    let term = term.trim();
    if term.is_empty() || columns.is_empty() {
        return;
    }
    let pattern = format!("%{}%", term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_expands_to_every_column() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM centres WHERE 1=1");
        push_search(&mut qb, &["centre_name", "centre_code"], " alpha ");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM centres WHERE 1=1 AND (centre_name ILIKE $1 OR centre_code ILIKE $2)"
        );
    }

    #[test]
    fn blank_search_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_search(&mut qb, &["name"], "   ");
        assert_eq!(qb.sql(), "SELECT 1");
    }

    #[test]
    fn non_database_errors_stay_internal() {
        let err = map_unique_violation(
            sqlx::Error::RowNotFound,
            &[UniqueField::new("deliveries_consignment_id_key", "consignment_id", "Consignment ID", "C-1")],
        );
        assert_eq!(err.status.as_u16(), 500);
    }
}
