//! API routes for the campus route server.

pub mod auth;
pub mod errors;
pub mod request_id;
mod routes;

use crate::config::Config;
use axum::Router;

pub fn routes(config: &Config) -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router(config)
}
