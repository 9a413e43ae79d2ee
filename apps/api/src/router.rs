use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::{admin_appointment_routes, appointment_routes};
use directory_cell::router::directory_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "District Health API is running!" }))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/admin", admin_appointment_routes(state.clone()))
        .nest("/directory", directory_routes(state.clone()))
}
