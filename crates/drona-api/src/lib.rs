//! HTTP surface of the contest pipeline: auth, contest administration and
//! submission enqueueing. Handlers stay thin; domain work lives in
//! `drona-auth`, `drona-store` and `drona-kv`.

mod error;
mod extract;
pub mod routes;
pub mod schemas;

use axum::routing::{get, post};
use axum::Router;
use drona_auth::{AuthFlows, Authorizer};
use drona_kv::Kv;
use drona_store::Store;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use extract::CurrentUser;

/// Shared handles constructed once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub kv: Kv,
    pub flows: AuthFlows,
    pub authorizer: Authorizer,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/refresh", post(routes::auth::refresh))
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route("/api/v1/contests", post(routes::contests::create))
        .route(
            "/api/v1/contests/:id",
            get(routes::contests::get_with_questions).put(routes::contests::update),
        )
        .route("/api/v1/contests/:id/submit", post(routes::contests::submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
