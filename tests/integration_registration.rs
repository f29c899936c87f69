mod common;

use axum::http::StatusCode;
use serde_json::json;
use tempfile::TempDir;

use common::{app_without_db, json_request, multipart_request, send, stored_files, token};
use edunexus::edunexus_auth::Role;

#[tokio::test]
async fn test_online_student_form_reports_every_missing_field() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(&app, json_request("POST", "/api/students/apply", None, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    for field in ["student_name", "dob", "mobile"] {
        assert!(errors.contains_key(field), "missing error for {}", field);
    }
    // Defaults fill these before validation.
    assert!(!errors.contains_key("total_fee"));
    assert!(!errors.contains_key("admission_date"));
}

#[tokio::test]
async fn test_online_student_rejects_future_birth_date_and_short_mobile() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/students/apply",
            None,
            json!({ "name": "Asha Verma", "dateOfBirth": "2999-01-01", "phone": "12345" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["dob"].is_string());
    assert!(body["errors"]["mobile"].is_string());
    assert!(body["errors"].get("student_name").is_none());
}

#[tokio::test]
async fn test_admin_centre_form_requires_identifiers() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());
    let admin = token(Role::Admin, None);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/centres",
            Some(&admin),
            json!({ "centreName": "Bright Future Computers", "mobile": "9876543210", "panNo": "ABC" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    for field in ["centre_code", "login_id", "owner_name", "centre_address", "pan_no"] {
        assert!(errors.contains_key(field), "missing error for {}", field);
    }
    assert!(!errors.contains_key("centre_name"));
}

#[tokio::test]
async fn test_online_centre_form_does_not_require_identifiers() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/centres/apply", None, json!({ "directorName": "R. Sharma" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("centre_name"));
    assert!(errors.contains_key("mobile"));
    assert!(!errors.contains_key("centre_code"));
    assert!(!errors.contains_key("login_id"));
    assert!(!errors.contains_key("owner_name"));
}

#[tokio::test]
async fn test_rejected_multipart_form_writes_no_files() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/students/apply",
            None,
            &[("name", "Asha Verma")],
            &[("photo", "asha.png", "image/png", b"\x89PNG\r\n\x1a\nfake")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["dob"].is_string());
    assert!(stored_files(uploads.path()).is_empty());
}

#[tokio::test]
async fn test_unexpected_file_field_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/students/apply",
            None,
            &[("name", "Asha Verma")],
            &[("resume", "cv.pdf", "application/pdf", b"%PDF-1.4")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unexpected file field 'resume'");
}

#[tokio::test]
async fn test_disallowed_mime_type_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, _) = send(
        &app,
        multipart_request(
            "POST",
            "/api/careers/apply",
            None,
            &[("name", "Ravi")],
            &[("resume", "cv.exe", "application/x-msdownload", b"MZ")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(stored_files(uploads.path()).is_empty());
}
