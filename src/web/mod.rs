//! HTTP surface: public pages plus the basic-auth gated admin view.
//!
//! - `GET /` serves the `index` post
//! - `GET /:name` serves a post or 404
//! - `GET /admin`, `POST /admin` reconciliation view and actions
//! - `POST /admin/update` batch sync by name

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::startup::AppState;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;

pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/admin",
            get(handlers::admin_view).post(handlers::admin_action),
        )
        .route("/admin/update", post(handlers::admin_update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/:name", get(handlers::post_page))
        .merge(admin)
        .with_state(state)
}
