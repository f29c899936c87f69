use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_gallery_item, create_slider, delete_gallery_item, delete_slider, list_all_gallery,
    list_all_sliders, list_gallery, list_sliders, update_gallery_item, update_slider,
};

pub fn init_gallery_public_router() -> Router<AppState> {
    Router::new().route("/", get(list_gallery))
}

pub fn init_gallery_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_gallery_item))
        .route("/all", get(list_all_gallery))
        .route("/{id}", put(update_gallery_item).delete(delete_gallery_item))
}

pub fn init_sliders_public_router() -> Router<AppState> {
    Router::new().route("/", get(list_sliders))
}

pub fn init_sliders_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_slider))
        .route("/all", get(list_all_sliders))
        .route("/{id}", put(update_slider).delete(delete_slider))
}
