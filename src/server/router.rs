//! Route table

use super::context::{api_context, page_context};
use super::handlers::{api, health_check, pages};
use super::state::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

/// Build the page and API routes
///
/// Pages:
/// - GET / → /login
/// - GET|POST /login, /signup, /forgot-password
/// - GET /logout, /about
/// - GET /nurseries, /nursery/{id} (login required)
/// - GET|POST /profile (login required)
///
/// JSON:
/// - GET /api/nurseries, /api/nurseries/{id}
/// - GET /api/reviews
/// - GET|POST /api/nurseries/{id}/reviews
/// - POST /set-currency
pub fn build_routes(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/signup", get(pages::signup_page).post(pages::signup_submit))
        .route(
            "/forgot-password",
            get(pages::forgot_password_page).post(pages::forgot_password_submit),
        )
        .route("/logout", get(pages::logout))
        .route("/about", get(pages::about))
        .route("/nurseries", get(pages::nurseries_page))
        .route("/nursery/{id}", get(pages::nursery_detail))
        .route("/profile", get(pages::profile_page).post(pages::profile_submit))
        .layer(from_fn_with_state(state.clone(), page_context));

    let api = Router::new()
        .route("/api/nurseries", get(api::list_nurseries))
        .route("/api/nurseries/{id}", get(api::get_nursery))
        .route("/api/reviews", get(api::list_reviews))
        .route(
            "/api/nurseries/{id}/reviews",
            get(api::list_nursery_reviews).post(api::create_review),
        )
        .route("/set-currency", post(api::set_currency))
        .layer(from_fn_with_state(state.clone(), api_context));

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check));

    Router::new()
        .merge(pages)
        .merge(api)
        .merge(health)
        .with_state(state)
}
