use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_online_exam, delete_online_exam, get_online_exam, list_online_exams,
    update_online_exam,
};

pub fn init_online_exams_read_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_online_exams))
        .route("/{id}", get(get_online_exam))
}

pub fn init_online_exams_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_online_exam))
        .route("/{id}", put(update_online_exam).delete(delete_online_exam))
}
