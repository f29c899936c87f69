use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_book, create_download, delete_book, delete_download, get_book, list_all_books,
    list_all_downloads, list_books, list_downloads, update_book, update_download,
};

pub fn init_books_public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books))
        .route("/{id}", get(get_book))
}

pub fn init_books_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_book))
        .route("/all", get(list_all_books))
        .route("/{id}", put(update_book).delete(delete_book))
}

pub fn init_downloads_public_router() -> Router<AppState> {
    Router::new().route("/", get(list_downloads))
}

pub fn init_downloads_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_download))
        .route("/all", get(list_all_downloads))
        .route("/{id}", put(update_download).delete(delete_download))
}
