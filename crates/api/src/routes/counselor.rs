use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/counselors",
            get(handlers::counselor::list_counselors).post(handlers::counselor::create_counselor),
        )
        .route(
            "/api/counselors/:id",
            get(handlers::counselor::get_counselor),
        )
        .route(
            "/api/counselors/:id/availability",
            get(handlers::availability::get_availability),
        )
}
