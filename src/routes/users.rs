use axum::{middleware, Router};
use axum::routing::{get, post, put};

use crate::handlers::user::{
    create_user, delete_user, get_me, list_users, login_user, register_user, update_user,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let open = Router::new()
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user));

    let protected = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn(require_auth));

    open.merge(protected)
}
