use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_notice, delete_notice, get_notice, list_all_notices, list_notices, update_notice,
};

pub fn init_notices_public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notices))
        .route("/{id}", get(get_notice))
}

pub fn init_notices_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_notice))
        .route("/all", get(list_all_notices))
        .route("/{id}", put(update_notice).delete(delete_notice))
}
