pub mod client;
pub mod handlers;
pub mod preferences;
pub mod services;
pub mod transcript;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::assistant_routes()
}
