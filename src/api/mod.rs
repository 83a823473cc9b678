/// HTTP routes and handlers
pub mod admin;
pub mod health;
pub mod public;
pub mod student;

use crate::context::AppContext;
use axum::Router;

/// Build all routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(public::routes())
        .merge(student::routes())
        .merge(admin::routes())
        .merge(health::routes())
}
