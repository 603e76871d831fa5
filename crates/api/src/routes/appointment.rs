use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            post(handlers::appointment::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointment::get_appointment),
        )
        .route(
            "/api/appointments/:id/status",
            put(handlers::appointment::update_status),
        )
        .route(
            "/api/students/:id/appointments",
            get(handlers::appointment::list_for_student),
        )
        .route(
            "/api/counselors/:id/appointments",
            get(handlers::appointment::list_for_counselor),
        )
}
