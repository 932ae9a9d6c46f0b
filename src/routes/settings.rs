use axum::{middleware, Router};
use axum::routing::get;

use crate::handlers::settings::{get_settings, update_settings};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route_layer(middleware::from_fn(require_auth))
}
