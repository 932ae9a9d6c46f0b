use axum::{middleware, Router};
use axum::routing::get;

use crate::handlers::dashboard::get_dashboard;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn(require_auth))
}
