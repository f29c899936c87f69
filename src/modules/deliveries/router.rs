use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_delivery, delete_delivery, get_delivery, list_deliveries, track_delivery,
    update_delivery,
};

pub fn init_deliveries_public_router() -> Router<AppState> {
    Router::new().route("/track/{consignment_id}", get(track_delivery))
}

pub fn init_deliveries_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_delivery).get(list_deliveries))
        .route(
            "/{id}",
            get(get_delivery).put(update_delivery).delete(delete_delivery),
        )
}
