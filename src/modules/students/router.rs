use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

use super::controller::{
    apply_student, delete_student, get_my_student, get_student, list_deleted_students,
    list_students, register_student, restore_student, set_admit_subjects, set_issue_flags,
    set_marks, update_student, update_student_status, upload_exam_papers,
};

pub fn init_students_public_router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_student))
}

/// Staff and centre logins. Trash, restore, delete and the issuing
/// endpoints are limited to staff inside the handlers.
pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_student).get(list_students))
        .route("/trash", get(list_deleted_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/{id}/restore", patch(restore_student))
        .route("/{id}/admit-subjects", put(set_admit_subjects))
        .route("/{id}/marks", put(set_marks))
        .route("/{id}/issue", patch(set_issue_flags))
        .route("/{id}/status", patch(update_student_status))
        .route("/{id}/exam-papers", post(upload_exam_papers))
}

pub fn init_student_self_router() -> Router<AppState> {
    Router::new().route("/me", get(get_my_student))
}
