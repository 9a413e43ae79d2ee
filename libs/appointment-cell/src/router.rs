// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/slots", get(handlers::get_available_slots))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/book", post(handlers::book_appointment))
        .route("/my", get(handlers::get_my_appointments))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment).patch(handlers::update_appointment),
        )
        .route("/{appointment_id}/cancel", patch(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    public_routes.merge(protected_routes)
}

pub fn admin_appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/appointments", get(handlers::list_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
