use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_page, create_team_member, delete_page, delete_team_member, get_page, list_all_team,
    list_pages, list_team, update_page, update_team_member,
};

pub fn init_pages_public_router() -> Router<AppState> {
    Router::new().route("/{slug}", get(get_page))
}

pub fn init_pages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_page).get(list_pages))
        .route("/{slug}", put(update_page).delete(delete_page))
}

pub fn init_team_public_router() -> Router<AppState> {
    Router::new().route("/", get(list_team))
}

pub fn init_team_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_team_member))
        .route("/all", get(list_all_team))
        .route("/{id}", put(update_team_member).delete(delete_team_member))
}
