//! Axum router wiring for the two listeners.

use axum::{
    routing::{get, MethodRouter},
    Router,
};

use crate::{api, app_state::AppState, ops};

/// Device API listener: `/devices`, `/devices/`, `/devices/{id}`, and any
/// deeper `/devices/...` path through the fallback.
pub fn build_api_router(state: AppState) -> Router {
    let collection = || -> MethodRouter<AppState> {
        get(api::list_devices)
            .put(api::missing_device_id)
            .fallback(api::method_not_allowed)
    };

    Router::new()
        .route("/devices", collection())
        .route("/devices/", collection())
        .route(
            "/devices/:id",
            get(api::list_devices)
                .put(api::upgrade_device)
                .fallback(api::method_not_allowed),
        )
        .fallback(api::devices_subtree)
        .with_state(state)
}

/// Metrics listener: `/metrics`, `/healthz`.
pub fn build_ops_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
