//! API router.
//!
//! Returns a composable `Router` mounted under `/api/`. Auth is
//! delegated to the backend; handlers gate themselves through
//! `ApiContext::require_user`, so there is no auth middleware layer.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/session", get(endpoints::session::current))
        .route("/session/login", post(endpoints::session::login))
        .route("/session/logout", post(endpoints::session::logout))
        .route("/view", post(endpoints::session::select_view))
        .route("/dashboard", get(endpoints::dashboard::overview))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients", post(endpoints::patients::create))
        .route("/patients/:id", put(endpoints::patients::update))
        .route("/patients/:id", delete(endpoints::patients::delete))
        .route("/generate", post(endpoints::generate::generate))
        .route("/plans", get(endpoints::plans::list))
        .route("/plans", post(endpoints::plans::save))
        .route("/plans/:id", get(endpoints::plans::detail))
        .route("/plans/:id", delete(endpoints::plans::delete))
        .route("/plans/:id/duplicate", post(endpoints::plans::duplicate))
        .route("/plans/:id/status", post(endpoints::plans::set_status))
        .route("/plans/:id/export", get(endpoints::plans::export))
        .with_state(ctx);

    Router::new().nest("/api", routes)
}
