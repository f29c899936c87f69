//! Request body extractors.
//!
//! - [`ValidatedJson`]: JSON body deserialized and checked with `validator`;
//!   failures become a 400 carrying every field message.
//! - [`FormPayload`]: `multipart/form-data` or flat JSON read into a
//!   [`FormData`] plus any uploaded files. Files are size- and MIME-checked
//!   here but only written to storage after the handler has validated the form.

use anyhow::anyhow;
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError, rejection::JsonRejection},
    http::header,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use edunexus_core::file_storage::{ALLOWED_MIME_TYPES, StorageError};
use edunexus_core::forms::canonical_key;
use edunexus_core::{AppError, FieldErrors, FieldRule, FormData, validate_rules};

use crate::state::AppState;

fn json_rejection(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        let mut fields = FieldErrors::new();
        fields.add(field, format!("{} is required", field));
        return AppError::validation(fields);
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    if error_msg.contains("unknown variant") || error_msg.contains("invalid type") {
        return AppError::bad_request(anyhow!("Invalid field value in request: {}", error_msg));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        value
            .validate()
            .map_err(|errors| AppError::validation(FieldErrors::from(errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// A file part received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Canonical (snake_case) field name
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    pub form: FormData,
    pub files: Vec<UploadedFile>,
}

impl FormPayload {
    pub fn from_form(form: FormData) -> Self {
        Self {
            form,
            files: Vec::new(),
        }
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        let field = canonical_key(field);
        self.files.iter().find(|f| f.field == field)
    }

    pub fn has_file(&self, field: &str) -> bool {
        self.file(field).is_some()
    }

    /// Renames file parts that arrived under an alternate field name.
    pub fn alias_files(&mut self, aliases: &[(&str, &str)]) {
        for file in self.files.iter_mut() {
            if let Some((_, canonical)) = aliases.iter().find(|(alias, _)| *alias == file.field) {
                file.field = canonical.to_string();
            }
        }
    }

    /// Runs `rules` over the form and requires each `(field, label)` file part.
    /// Every violation is reported in one error.
    pub fn validate(
        &self,
        rules: &[FieldRule],
        required_files: &[(&str, &str)],
        today: NaiveDate,
    ) -> Result<(), AppError> {
        let mut errors = validate_rules(&self.form, rules, today);
        for (field, label) in required_files {
            if !self.has_file(field) {
                errors.add(*field, format!("{} is required", label));
            }
        }
        errors.into_result()
    }

    /// Rejects file parts that arrived under a field the endpoint does not take.
    pub fn ensure_file_fields(&self, allowed: &[&str]) -> Result<(), AppError> {
        match self.files.iter().find(|f| !allowed.contains(&f.field.as_str())) {
            Some(file) => Err(AppError::bad_request(anyhow!(
                "Unexpected file field '{}'",
                file.field
            ))),
            None => Ok(()),
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::bad_request(anyhow!("Invalid multipart body: {}", err.body_text()))
}

fn check_mime(content_type: &str) -> Result<(), AppError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(StorageError::InvalidMimeType {
            received: essence,
            allowed: ALLOWED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
        .into_app_error())
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<FormPayload, AppError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = canonical_key(field.name().unwrap_or_default());
        if name.is_empty() {
            continue;
        }

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty part for a file input left blank.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if bytes.len() > max_file_size {
                    return Err(StorageError::InvalidFileSize {
                        max_bytes: max_file_size,
                    }
                    .into_app_error());
                }
                check_mime(&content_type)?;

                payload.files.push(UploadedFile {
                    field: name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                payload.form.insert(&name, text);
            }
        }
    }

    Ok(payload)
}

impl FromRequest<AppState> for FormPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(anyhow!("{}", e.body_text())))?;
            return read_multipart(multipart, state.upload_config.max_file_size).await;
        }

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(json_rejection)?;
            return Ok(Self::from_form(FormData::from_json(&value)?));
        }

        Err(AppError::bad_request(anyhow!(
            "Expected a multipart/form-data or application/json body"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(field: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: "scan.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[test]
    fn unexpected_file_fields_are_rejected() {
        let payload = FormPayload {
            form: FormData::new(),
            files: vec![file("photo"), file("resume")],
        };
        assert!(payload.ensure_file_fields(&["photo", "resume"]).is_ok());

        let err = payload.ensure_file_fields(&["photo"]).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(err.error.to_string().contains("resume"));
    }

    #[test]
    fn file_lookup_uses_canonical_names() {
        let payload = FormPayload {
            form: FormData::new(),
            files: vec![file("owner_photo")],
        };
        assert!(payload.has_file("ownerPhoto"));
        assert!(!payload.has_file("signature"));
    }

    #[test]
    fn file_aliases_rename_parts() {
        let mut payload = FormPayload {
            form: FormData::new(),
            files: vec![file("center_photo"), file("photo")],
        };
        payload.alias_files(&[("center_photo", "centre_photo")]);
        assert_eq!(payload.files[0].field, "centre_photo");
        assert_eq!(payload.files[1].field, "photo");
    }

    #[test]
    fn validate_reports_missing_files_with_form_errors() {
        const RULES: &[FieldRule] = &[FieldRule::required("title", "Title")];
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let payload = FormPayload::default();
        let err = payload
            .validate(RULES, &[("gallery_image", "Image")], today)
            .unwrap_err();
        let fields = err.fields.unwrap();
        assert_eq!(fields.get("title"), Some("Title is required"));
        assert_eq!(fields.get("gallery_image"), Some("Image is required"));

        let payload = FormPayload {
            form: FormData::from_pairs([("title", "Annual day")]),
            files: vec![file("gallery_image")],
        };
        assert!(payload.validate(RULES, &[("gallery_image", "Image")], today).is_ok());
    }

    #[test]
    fn mime_check_accepts_parameters_and_rejects_executables() {
        assert!(check_mime("image/png").is_ok());
        assert!(check_mime("application/pdf; charset=binary").is_ok());
        let err = check_mime("application/x-msdownload").unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
    }
}
