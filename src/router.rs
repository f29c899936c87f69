use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use edunexus_observability::{logging_middleware, metrics_middleware};

use crate::docs::ApiDoc;
use crate::middleware::role::{
    require_admin, require_authenticated, require_centre_access, require_staff,
};
use crate::modules::auth::router::init_auth_router;
use crate::modules::careers::router::{init_careers_public_router, init_careers_router};
use crate::modules::centres::router::{
    init_centre_self_router, init_centres_public_router, init_centres_router,
};
use crate::modules::courses::router::{
    init_categories_public_router, init_categories_router, init_courses_public_router,
    init_courses_router,
};
use crate::modules::deliveries::router::{init_deliveries_public_router, init_deliveries_router};
use crate::modules::documents::router::init_documents_router;
use crate::modules::enquiries::router::{
    init_contacts_public_router, init_contacts_router, init_feedback_public_router,
    init_feedback_router,
};
use crate::modules::fees::router::{init_fees_read_router, init_fees_router};
use crate::modules::library::router::{
    init_books_public_router, init_books_router, init_downloads_public_router,
    init_downloads_router,
};
use crate::modules::live_classes::router::{
    init_live_classes_read_router, init_live_classes_router,
};
use crate::modules::media::router::{
    init_gallery_public_router, init_gallery_router, init_sliders_public_router,
    init_sliders_router,
};
use crate::modules::messages::router::init_messages_router;
use crate::modules::notices::router::{init_notices_public_router, init_notices_router};
use crate::modules::online_exams::router::{
    init_online_exams_read_router, init_online_exams_router,
};
use crate::modules::pages::router::{
    init_pages_public_router, init_pages_router, init_team_public_router, init_team_router,
};
use crate::modules::students::router::{
    init_student_self_router, init_students_public_router, init_students_router,
};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Role layers. `route_layer` only wraps routes that exist when it is applied,
/// so each gated router is layered before being merged with its public half.
fn admin(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

fn staff(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_staff))
}

fn centre(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_centre_access))
}

fn signed_in(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_authenticated))
}

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", init_auth_router())
        .nest("/users", admin(init_users_router(), state))
        .nest(
            "/centres",
            init_centres_public_router()
                .merge(staff(init_centres_router(), state))
                .merge(signed_in(init_centre_self_router(), state)),
        )
        .nest(
            "/students",
            init_students_public_router()
                .merge(centre(init_students_router(), state))
                .merge(signed_in(init_student_self_router(), state)),
        )
        .nest("/documents", signed_in(init_documents_router(), state))
        .nest(
            "/categories",
            init_categories_public_router().merge(staff(init_categories_router(), state)),
        )
        .nest(
            "/courses",
            init_courses_public_router().merge(staff(init_courses_router(), state)),
        )
        .nest(
            "/deliveries",
            init_deliveries_public_router().merge(staff(init_deliveries_router(), state)),
        )
        .nest(
            "/live-classes",
            signed_in(init_live_classes_read_router(), state)
                .merge(staff(init_live_classes_router(), state)),
        )
        .nest(
            "/online-exams",
            signed_in(init_online_exams_read_router(), state)
                .merge(staff(init_online_exams_router(), state)),
        )
        .nest(
            "/notices",
            init_notices_public_router().merge(staff(init_notices_router(), state)),
        )
        .nest("/messages", centre(init_messages_router(), state))
        .nest(
            "/fees",
            centre(init_fees_read_router(), state).merge(staff(init_fees_router(), state)),
        )
        .nest(
            "/careers",
            init_careers_public_router().merge(staff(init_careers_router(), state)),
        )
        .nest(
            "/contacts",
            init_contacts_public_router().merge(staff(init_contacts_router(), state)),
        )
        .nest(
            "/feedback",
            init_feedback_public_router().merge(staff(init_feedback_router(), state)),
        )
        .nest(
            "/gallery",
            init_gallery_public_router().merge(staff(init_gallery_router(), state)),
        )
        .nest(
            "/sliders",
            init_sliders_public_router().merge(staff(init_sliders_router(), state)),
        )
        .nest(
            "/pages",
            init_pages_public_router().merge(staff(init_pages_router(), state)),
        )
        .nest(
            "/team",
            init_team_public_router().merge(staff(init_team_router(), state)),
        )
        .nest(
            "/books",
            init_books_public_router().merge(staff(init_books_router(), state)),
        )
        .nest(
            "/downloads",
            init_downloads_public_router().merge(staff(init_downloads_router(), state)),
        )
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_config.dir);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router(&state))
        .nest_service(&state.upload_config.public_path, uploads)
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(state.upload_config.max_body_size))
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
