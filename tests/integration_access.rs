mod common;

use axum::http::StatusCode;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use common::{app_without_db, empty_request, json_request, send, token, token_for};
use edunexus::edunexus_auth::Role;

#[tokio::test]
async fn test_gated_route_without_token_is_unauthorized() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(&app, empty_request("GET", "/api/centres", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, _) = send(&app, empty_request("GET", "/api/students", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let student = token(Role::Student, None);
    let (status, _) = send(&app, empty_request("GET", "/api/centres", Some(&student))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let centre = token(Role::Center, Some("CEN-001"));
    let (status, _) = send(
        &app,
        json_request("POST", "/api/fees", Some(&centre), json!({ "amount": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff = token(Role::Staff, None);
    let (status, _) = send(&app, empty_request("GET", "/api/users", Some(&staff))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_students_cannot_read_messages_or_fees() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());
    let student = token(Role::Student, None);

    for uri in ["/api/messages", "/api/fees"] {
        let (status, _) = send(&app, empty_request("GET", uri, Some(&student))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_centre_token_without_code_cannot_list_students() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let centre = token(Role::Center, None);
    let (status, _) = send(&app, empty_request("GET", "/api/students", Some(&centre))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_download_another_students_document() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let student = token_for(Uuid::new_v4(), Role::Student, None);
    let uri = format!("/api/documents/students/{}/admit-card", Uuid::new_v4());
    let (status, _) = send(&app, empty_request("GET", &uri, Some(&student))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_document_kind_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let admin = token(Role::Admin, None);
    let uri = format!("/api/documents/students/{}/marksheet", Uuid::new_v4());
    let (status, _) = send(&app, empty_request("GET", &uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_documents_require_a_token() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let uri = format!("/api/documents/students/{}/certificate", Uuid::new_v4());
    let (status, _) = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(&app, empty_request("GET", "/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    for path in [
        "/api/centres",
        "/api/students/apply",
        "/api/documents/students/{id}/{kind}",
        "/api/deliveries/track/{consignment_id}",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_contact_form_reports_invalid_fields() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/contacts",
            None,
            json!({ "name": "Ravi", "mobile": "123", "email": "nope", "message": "Hi" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["mobile"].is_string());
    assert!(body["errors"]["email"].is_string());
}

#[tokio::test]
async fn test_empty_body_reports_every_required_field() {
    let uploads = TempDir::new().unwrap();
    let app = app_without_db(uploads.path());
    let staff = token(Role::Staff, None);

    let (status, body) =
        send(&app, json_request("POST", "/api/deliveries", Some(&staff), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed for 3 fields");
    for key in ["centre_name", "consignment_id", "courier"] {
        assert!(body["errors"][key].is_string(), "missing error for {}", key);
    }

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/deliveries",
            Some(&staff),
            json!({ "centreName": "  ", "consignmentId": "CN-1", "courier": "\t" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["centre_name"], "Centre name is required");
    assert_eq!(body["errors"]["courier"], "Courier is required");
    assert!(body["errors"]["consignment_id"].is_null());
}
