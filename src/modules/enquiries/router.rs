use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_contact, create_feedback, delete_contact, delete_feedback, list_all_feedback,
    list_contacts, list_feedback, update_contact_status, update_feedback_status,
};

pub fn init_contacts_public_router() -> Router<AppState> {
    Router::new().route("/", post(create_contact))
}

pub fn init_contacts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contacts))
        .route("/{id}", delete(delete_contact))
        .route("/{id}/status", patch(update_contact_status))
}

pub fn init_feedback_public_router() -> Router<AppState> {
    Router::new().route("/", post(create_feedback).get(list_feedback))
}

pub fn init_feedback_router() -> Router<AppState> {
    Router::new()
        .route("/all", get(list_all_feedback))
        .route("/{id}", delete(delete_feedback))
        .route("/{id}/status", patch(update_feedback_status))
}
