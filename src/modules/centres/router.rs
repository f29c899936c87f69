use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

use super::controller::{
    apply_centre, approve_centre, delete_centre, expire_centre, get_centre, get_my_centre,
    list_centres, list_deleted_centres, register_centre, renew_centre, restore_centre,
    set_centre_renewal, update_centre, update_centre_status,
};

/// Open to anyone: the online application form.
pub fn init_centres_public_router() -> Router<AppState> {
    Router::new().route("/apply", post(apply_centre))
}

/// Staff routes. Lifecycle actions additionally require the admin role.
pub fn init_centres_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_centre).get(list_centres))
        .route("/trash", get(list_deleted_centres))
        .route(
            "/{id}",
            get(get_centre).put(update_centre).delete(delete_centre),
        )
        .route("/{id}/restore", patch(restore_centre))
        .route("/{id}/approve", patch(approve_centre))
        .route("/{id}/status", patch(update_centre_status))
        .route("/{id}/renewal", put(set_centre_renewal))
        .route("/{id}/renew", post(renew_centre))
        .route("/{id}/expire", post(expire_centre))
}

pub fn init_centre_self_router() -> Router<AppState> {
    Router::new().route("/me", get(get_my_centre))
}
