//! Route table

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, health};
use crate::middleware::auth_gate;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let gated = Router::new()
        .route("/auth/status", get(auth::status))
        .route("/auth/logout", post(auth::logout))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_gate));

    Router::new().merge(public).merge(gated).with_state(state)
}
