//! Database-backed flows. Run with `--features db-tests` against a Postgres
//! reachable through `DATABASE_URL`.
#![cfg(feature = "db-tests")]

mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    app_with_pool, empty_request, json_request, multipart_request, send, stored_files, token,
};
use edunexus::edunexus_auth::Role;

fn centre_form(code: &str) -> Value {
    json!({
        "centreName": format!("Bright Future {}", code),
        "centreCode": code,
        "loginId": format!("LOGIN-{}", code),
        "password": "secret123",
        "ownerName": "Ramesh Sharma",
        "mobile": "9876543210",
        "centreAddress": "12 Civil Lines",
        "centreCity": "lucknow",
        "centreState": "uttar pradesh"
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_consignment_is_a_field_error(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let staff = token(Role::Staff, None);

    let delivery = json!({
        "centreName": "Bright Future Computers",
        "consignmentId": "CN-1001",
        "courier": "India Post"
    });
    let (status, _) = send(&app, json_request("POST", "/api/deliveries", Some(&staff), delivery.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, json_request("POST", "/api/deliveries", Some(&staff), delivery)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate");
    assert_eq!(body["errors"]["consignment_id"], "Consignment ID 'CN-1001' already exists");

    let (status, body) = send(&app, empty_request("GET", "/api/deliveries/track/CN-1001", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courier"], "India Post");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_centre_renewal_lifecycle(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let admin = token(Role::Admin, None);

    let (status, body) = send(&app, json_request("POST", "/api/centres", Some(&admin), centre_form("CEN-101"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let centre = &body["centre"];
    assert_eq!(centre["status"], "Active");
    assert_eq!(centre["approved"], true);
    assert_eq!(centre["renewal_status"], "Active");
    assert_eq!(centre["centre_city"], "Lucknow");
    assert!(centre["renewed_at"].is_null());
    let id = centre["id"].as_str().unwrap().to_string();
    let first_term_end = centre["renewal_to"].as_str().unwrap().to_string();

    let (status, body) = send(&app, empty_request("POST", &format!("/api/centres/{}/expire", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewal_status"], "Expired");

    let (status, body) = send(&app, empty_request("POST", &format!("/api/centres/{}/renew", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewal_status"], "Active");
    assert!(body["renewed_at"].is_string());
    assert!(body["renewal_to"].as_str().unwrap() > first_term_end.as_str());

    let staff = token(Role::Staff, None);
    let (status, _) = send(&app, empty_request("POST", &format!("/api/centres/{}/renew", id), Some(&staff))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_centre_soft_delete_keeps_renewal_and_restores(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let admin = token(Role::Admin, None);

    let (_, body) = send(&app, json_request("POST", "/api/centres", Some(&admin), centre_form("CEN-202"))).await;
    let id = body["centre"]["id"].as_str().unwrap().to_string();
    let renewal_to = body["centre"]["renewal_to"].clone();

    let (status, body) = send(&app, empty_request("DELETE", &format!("/api/centres/{}", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Deleted");
    assert_eq!(body["renewal_to"], renewal_to);

    let (_, body) = send(&app, empty_request("GET", "/api/centres", Some(&admin))).await;
    assert_eq!(body["meta"]["total"], 0);
    let (_, body) = send(&app, empty_request("GET", "/api/centres/trash", Some(&admin))).await;
    assert_eq!(body["meta"]["total"], 1);

    let (status, _) = send(
        &app,
        json_request("PATCH", &format!("/api/centres/{}/restore", id), Some(&admin), json!({ "status": "Deleted" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request("PATCH", &format!("/api/centres/{}/restore", id), Some(&admin), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Active");
    assert_eq!(body["renewal_to"], renewal_to);

    // The code stays taken while the centre exists in any state.
    let (status, body) = send(&app, json_request("POST", "/api/centres", Some(&admin), centre_form("CEN-202"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["centre_code"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_deleted_centre_keeps_its_identifiers(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let admin = token(Role::Admin, None);

    let (status, body) = send(&app, json_request("POST", "/api/centres", Some(&admin), centre_form("CEN-303"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["centre"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/centres/{}", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, json_request("POST", "/api/centres", Some(&admin), centre_form("CEN-303"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate");
    assert_eq!(body["errors"]["centre_code"], "Centre code 'CEN-303' already exists");
    assert_eq!(body["errors"]["login_id"], "Login ID 'LOGIN-CEN-303' already exists");

    let (_, body) = send(&app, empty_request("GET", "/api/centres/trash", Some(&admin))).await;
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_deleted_student_keeps_its_identifiers(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let admin = token(Role::Admin, None);

    let application = json!({
        "name": "Neha Gupta",
        "dateOfBirth": "2002-02-02",
        "phone": "9123456781",
        "enrollmentNo": "EN-7001",
        "rollNo": "RN-7001"
    });
    let (status, student) =
        send(&app, json_request("POST", "/api/students/apply", None, application.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["enrollment_no"], "EN-7001");
    let id = student["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/students/{}", id), Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, json_request("POST", "/api/students/apply", None, application)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate");
    assert_eq!(body["errors"]["enrollment_no"], "Enrollment number 'EN-7001' already exists");
    assert_eq!(body["errors"]["roll_no"], "Roll number 'RN-7001' already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_online_student_gets_generated_identifiers_and_defaults(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());

    let (status, student) = send(
        &app,
        json_request(
            "POST",
            "/api/students/apply",
            None,
            json!({ "name": "Asha Verma", "dateOfBirth": "2004-08-15", "phone": "9123456780" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(student["enrollment_no"].as_str().unwrap().starts_with("ONL-EN-"));
    assert!(student["roll_no"].as_str().unwrap().starts_with("ONL-RN-"));
    assert_eq!(student["registration_type"], "Online");
    assert_eq!(student["student_status"], "Pending");
    assert_eq!(student["total_fee"], 150.0);
    assert_eq!(student["duration"], "6 Months");

    // The applicant can sign in and download their own admit card.
    let enrollment_no = student["enrollment_no"].as_str().unwrap();
    let (status, login) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/student/login",
            None,
            json!({ "enrollmentNo": enrollment_no, "dob": "2004-08-15" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let student_token = login["access_token"].as_str().unwrap();

    let uri = format!("/api/documents/students/{}/admit-card", student["id"].as_str().unwrap());
    let response = app
        .clone()
        .oneshot(empty_request("GET", &uri, Some(student_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename=\"admit-card-{}.pdf\"", enrollment_no)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_centre_sees_only_its_own_students(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());

    let north = token(Role::Center, Some("CEN-N"));
    let south = token(Role::Center, Some("CEN-S"));
    let form = json!({
        "enrollmentNo": "EN-1",
        "rollNo": "RN-1",
        "studentName": "Kiran",
        "fatherName": "Mohan",
        "dob": "2003-03-03",
        "gender": "male",
        "mobile": "9000000001",
        "address": "Main Road",
        "state": "bihar",
        "courseId": Uuid::new_v4().to_string(),
        "centreCode": "CEN-S",
        "admissionDate": "2025-01-10",
        "totalFee": "1200"
    });
    let (status, body) = send(&app, json_request("POST", "/api/students", Some(&north), form)).await;
    // An unknown course is reported against its field.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["course_id"].is_string());

    let (_, body) = send(&app, empty_request("GET", "/api/students", Some(&south))).await;
    assert_eq!(body["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_a_book_removes_its_files(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let staff = token(Role::Staff, None);

    let (status, book) = send(
        &app,
        multipart_request(
            "POST",
            "/api/books",
            Some(&staff),
            &[("title", "Computer Fundamentals"), ("author", "P. K. Sinha")],
            &[("book_file", "fundamentals.pdf", "application/pdf", b"%PDF-1.4 test")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored_files(uploads.path()).len(), 1);

    let (status, _) = send(
        &app,
        empty_request("DELETE", &format!("/api/books/{}", book["id"].as_str().unwrap()), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored_files(uploads.path()).is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_insert_discards_uploaded_files(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let staff = token(Role::Staff, None);

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/books",
            Some(&staff),
            &[("title", "Tally"), ("courseId", &Uuid::new_v4().to_string())],
            &[("book_file", "tally.pdf", "application/pdf", b"%PDF-1.4 test")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["course_id"].is_string());
    assert!(stored_files(uploads.path()).is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_feedback_is_hidden_until_published(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());

    let (status, feedback) = send(
        &app,
        json_request(
            "POST",
            "/api/feedback",
            None,
            json!({ "name": "Neha", "rating": 5, "message": "Great teachers" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(feedback["status"], "Inactive");

    let (_, body) = send(&app, empty_request("GET", "/api/feedback", None)).await;
    assert_eq!(body["meta"]["total"], 0);

    let staff = token(Role::Staff, None);
    let uri = format!("/api/feedback/{}/status", feedback["id"].as_str().unwrap());
    let (status, _) = send(&app, json_request("PATCH", &uri, Some(&staff), json!({ "status": "Active" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty_request("GET", "/api/feedback", None)).await;
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_download_delete_tolerates_missing_file(pool: PgPool) {
    let uploads = TempDir::new().unwrap();
    let app = app_with_pool(pool, uploads.path());
    let staff = token(Role::Staff, None);

    let (status, download) = send(
        &app,
        multipart_request(
            "POST",
            "/api/downloads",
            Some(&staff),
            &[("title", "Exam Form")],
            &[("download_file", "exam-form.pdf", "application/pdf", b"%PDF-1.4 form")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for file in stored_files(uploads.path()) {
        std::fs::remove_file(file).unwrap();
    }

    let (status, _) = send(
        &app,
        empty_request("DELETE", &format!("/api/downloads/{}", download["id"].as_str().unwrap()), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty_request("GET", "/api/downloads", None)).await;
    assert_eq!(body["meta"]["total"], 0);
}
