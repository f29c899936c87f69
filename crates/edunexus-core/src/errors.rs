use std::collections::BTreeMap;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Per-field validation messages, keyed by canonical (snake_case) field name.
///
/// Only the first message recorded for a field is kept, so rule tables can
/// list checks in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a 400 carrying every message.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self))
        }
    }
}

impl FieldErrors {
    /// Flattens nested struct and list errors into keys such as
    /// `marks[0].name`, keeping the first message per key.
    fn collect(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            let key = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };
            match kind {
                ValidationErrorsKind::Field(errs) => {
                    if let Some(first) = errs.first() {
                        let message = first
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field));
                        self.add(key, message);
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.collect(&key, inner),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.collect(&format!("{}[{}]", key, index), inner);
                    }
                }
            }
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        out.collect("", &errors);
        out
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub fields: Option<FieldErrors>,
    pub code: Option<&'static str>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: None,
            code: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message))
    }

    pub fn forbidden(message: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message))
    }

    /// 400 carrying the full field-to-message map.
    pub fn validation(fields: FieldErrors) -> Self {
        let summary = if fields.len() == 1 {
            "Validation failed for 1 field".to_string()
        } else {
            format!("Validation failed for {} fields", fields.len())
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(summary),
            fields: Some(fields),
            code: None,
        }
    }

    /// 400 for a value that already exists, e.g. `Consignment ID 'C-1' already exists`.
    pub fn duplicate(field: &str, label: &str, value: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, duplicate_message(label, value));
        Self::duplicates(fields)
    }

    /// 400 listing every colliding field at once. The top-level message is
    /// the first collision's.
    pub fn duplicates(fields: FieldErrors) -> Self {
        let message = fields
            .iter()
            .next()
            .map(|(_, message)| message.to_string())
            .unwrap_or_else(|| "Duplicate value".to_string());
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message),
            fields: Some(fields),
            code: Some("duplicate"),
        }
    }

    /// 409 raised when every generated identifier candidate collided.
    pub fn identifier_exhausted(identifier: &str, attempts: u32) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            error: anyhow::anyhow!(
                "Could not allocate a unique {} after {} attempts",
                identifier,
                attempts
            ),
            fields: None,
            code: Some("identifier_exhausted"),
        }
    }
}

/// `Consignment ID 'C-1' already exists`.
pub fn duplicate_message(label: &str, value: &str) -> String {
    format!("{} '{}' already exists", label, value)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(
                status = %self.status,
                error = ?self.error,
                "Request failed with server error"
            );
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let mut body = json!({ "error": message });
        if let Some(fields) = &self.fields {
            body["errors"] = json!(fields);
        }
        if let Some(code) = self.code {
            body["code"] = json!(code);
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("mobile", "Mobile is required");
        errors.add("mobile", "Mobile must be at least 10 digits");
        assert_eq!(errors.get("mobile"), Some("Mobile is required"));
        assert_eq!(errors.len(), 1);
    }

    #[derive(Debug, validator::Validate)]
    struct Subject {
        #[validate(length(min = 1, message = "Subject name is required"))]
        name: String,
        #[validate(range(min = 1, message = "Full marks must be a positive number"))]
        full_marks: i32,
    }

    #[derive(Debug, validator::Validate)]
    struct Sheet {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
        #[validate(nested)]
        subjects: Vec<Subject>,
        #[validate(nested)]
        main: Subject,
    }

    #[test]
    fn nested_validation_errors_are_flattened() {

        let sheet = Sheet {
            title: String::new(),
            subjects: vec![
                Subject { name: "Typing".into(), full_marks: 100 },
                Subject { name: String::new(), full_marks: 0 },
            ],
            main: Subject { name: String::new(), full_marks: 50 },
        };
        let errors = FieldErrors::from(sheet.validate().unwrap_err());

        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("subjects[1].name"), Some("Subject name is required"));
        assert_eq!(
            errors.get("subjects[1].full_marks"),
            Some("Full marks must be a positive number")
        );
        assert_eq!(errors.get("main.name"), Some("Subject name is required"));
        assert!(!errors.contains("subjects[0].name"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn empty_field_errors_into_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn non_empty_field_errors_into_bad_request() {
        let mut errors = FieldErrors::new();
        errors.add("pan_no", "PAN must be exactly 10 characters");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.is_some());
    }

    #[tokio::test]
    async fn validation_response_lists_every_field() {
        let mut errors = FieldErrors::new();
        errors.add("mobile", "Mobile is required");
        errors.add("email", "Email is required");
        let (status, body) = body_json(AppError::validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["mobile"], "Mobile is required");
        assert_eq!(body["errors"]["email"], "Email is required");
    }

    #[tokio::test]
    async fn duplicate_message_names_field_and_value() {
        let err = AppError::duplicate("consignment_id", "Consignment ID", "C-100");
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Consignment ID 'C-100' already exists");
        assert_eq!(body["code"], "duplicate");
    }

    #[tokio::test]
    async fn duplicates_list_every_field() {
        let mut fields = FieldErrors::new();
        fields.add("login_id", duplicate_message("Login ID", "alpha"));
        fields.add("centre_code", duplicate_message("Centre code", "CEN-001"));
        let (status, body) = body_json(AppError::duplicates(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "duplicate");
        assert_eq!(body["errors"]["centre_code"], "Centre code 'CEN-001' already exists");
        assert_eq!(body["errors"]["login_id"], "Login ID 'alpha' already exists");
        assert_eq!(body["error"], "Centre code 'CEN-001' already exists");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let err = AppError::internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn identifier_exhausted_is_conflict() {
        let (status, body) = body_json(AppError::identifier_exhausted("enrollment number", 3)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "identifier_exhausted");
    }
}
