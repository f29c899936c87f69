use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::download_student_document;

pub fn init_documents_router() -> Router<AppState> {
    Router::new().route("/students/{id}/{kind}", get(download_student_document))
}
