pub mod handlers;
pub mod pages;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::content_routes())
        .merge(handlers::navigation_routes())
}
