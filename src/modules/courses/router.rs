use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_category, create_course, delete_category, delete_course, get_category, get_course,
    list_categories, list_courses, restore_course, update_category, update_course,
};

/// Catalogue reads are public.
pub fn init_categories_public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category))
}

pub fn init_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

pub fn init_courses_public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/{id}", get(get_course))
}

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course))
        .route("/{id}", put(update_course).delete(delete_course))
        .route("/{id}/restore", patch(restore_course))
}
