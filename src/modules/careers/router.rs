use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    apply_for_job, delete_application, get_application, list_applications,
    update_application_status,
};

pub fn init_careers_public_router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_for_job))
}

pub fn init_careers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications))
        .route("/{id}", get(get_application).delete(delete_application))
        .route("/{id}/status", patch(update_application_status))
}
