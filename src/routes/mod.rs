pub mod dashboard;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(sales::routes())
        .merge(users::routes())
        .merge(dashboard::routes())
        .merge(settings::routes())
}
