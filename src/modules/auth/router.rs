use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{current_session, login_centre, login_staff, login_student};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_staff))
        .route("/centre/login", post(login_centre))
        .route("/student/login", post(login_student))
        .route("/me", get(current_session))
}
