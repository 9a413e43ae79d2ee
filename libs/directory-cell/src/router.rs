// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers;

pub fn directory_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/hospitals", get(handlers::list_hospitals))
        .with_state(state)
}
