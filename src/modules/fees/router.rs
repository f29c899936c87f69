use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{create_fee, delete_fee, get_fee, list_fees, update_fee};

/// Staff and centre reads.
pub fn init_fees_read_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fees))
        .route("/{id}", get(get_fee))
}

pub fn init_fees_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_fee))
        .route("/{id}", put(update_fee).delete(delete_fee))
}
