use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_message, delete_message, get_message, list_messages, update_message_status,
};

/// Staff and centre logins; status changes and deletes are checked for staff
/// in the handlers.
pub fn init_messages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_message).get(list_messages))
        .route("/{id}", get(get_message).delete(delete_message))
        .route("/{id}/status", patch(update_message_status))
}
