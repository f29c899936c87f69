use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_live_class, delete_live_class, get_live_class, list_live_classes, update_live_class,
};

/// Reads for any signed-in user.
pub fn init_live_classes_read_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_live_classes))
        .route("/{id}", get(get_live_class))
}

pub fn init_live_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_live_class))
        .route("/{id}", put(update_live_class).delete(delete_live_class))
}
