//! Route table for the HTTP API.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::session;
use super::AppState;

/// axum caps request bodies at 2 MB by default; scanned reports run larger.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let account = Router::new()
        .route("/report/:report_id", get(handlers::reports::get_report))
        .route(
            "/report/:report_id/attach",
            post(handlers::reports::attach_report),
        )
        .route("/my-reports", get(handlers::reports::my_reports))
        .layer(from_fn_with_state(state.clone(), session::require_auth));

    Router::new()
        .route("/ping", get(handlers::ping))
        .route(
            "/upload",
            post(handlers::upload::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/status/:job_id", get(handlers::status::job_status))
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/public/report/:public_id",
            get(handlers::reports::public_report),
        )
        .merge(account)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
