//! Device management HTTP endpoints.
//!
//! - `GET /devices`, `GET /devices/` : list every device as JSON
//! - `PUT /devices/{id}`             : set a device's firmware
//!
//! Anything else on these paths answers 405 with an `Allow` header. Deeper
//! paths under `/devices/` get the same treatment: GET lists, PUT is 404.

use std::time::Instant;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;

use fleetwatch_core::error::FleetError;

use crate::app_state::AppState;
use crate::obs::metrics::UPGRADE_TYPE_ROUTER;

/// Methods served on the device paths.
pub const ALLOWED_METHODS: &str = "GET, PUT";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Body of a firmware update. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct FirmwareUpdate {
    pub firmware: String,
}

pub async fn list_devices(State(state): State<AppState>) -> Response {
    let started = Instant::now();

    let devices = state.store().list_all().await;
    let body = match serde_json::to_vec(&devices) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "device list serialization failed");
            return error_response(&FleetError::Internal(e.to_string()));
        }
    };

    if let Some(delay) = state.list_delay() {
        tokio::time::sleep(delay).await;
    }

    state
        .metrics()
        .observe_request("GET", StatusCode::OK.as_u16(), started.elapsed());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

pub async fn upgrade_device(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    let raw_id = match raw_id {
        Ok(Path(raw)) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting upgrade: undecodable device id");
            return error_response(&FleetError::NotFound);
        }
    };
    let Some(id) = parse_device_id(&raw_id) else {
        tracing::debug!(id = %raw_id, "rejecting upgrade: invalid device id");
        return error_response(&FleetError::NotFound);
    };

    let req: FirmwareUpdate = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(id, error = %e, "rejecting upgrade: invalid body");
            return error_response(&FleetError::BadRequest(e.to_string()));
        }
    };

    if state.store().update_firmware(id, &req.firmware).await {
        tracing::info!(id, firmware = %req.firmware, "device firmware updated");
    } else {
        // Unknown ids are accepted without touching the store.
        tracing::debug!(id, "upgrade for unknown device ignored");
    }

    state.metrics().record_upgrade(UPGRADE_TYPE_ROUTER);

    (
        StatusCode::ACCEPTED,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        "upgrading",
    )
        .into_response()
}

/// `PUT /devices` without an id.
pub async fn missing_device_id() -> Response {
    error_response(&FleetError::NotFound)
}

/// Router fallback: paths nested below `/devices/` behave like the device
/// routes, everything else is a plain 404.
pub async fn devices_subtree(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Response {
    if !uri.path().starts_with("/devices/") {
        return error_response(&FleetError::NotFound);
    }
    match method {
        Method::GET | Method::HEAD => list_devices(State(state)).await,
        Method::PUT => missing_device_id().await,
        _ => method_not_allowed().await,
    }
}

pub async fn method_not_allowed() -> Response {
    let mut res = error_response(&FleetError::MethodNotAllowed);
    res.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    res
}

/// Device ids are positive integers.
pub fn parse_device_id(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|id| *id > 0)
}

/// Plain-text error response: status from the client code, short message body.
pub fn error_response(err: &FleetError) -> Response {
    let status = StatusCode::from_u16(err.client_code().http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        FleetError::BadRequest(msg) | FleetError::Internal(msg) => msg.clone(),
        FleetError::NotFound => "404 page not found".to_string(),
        other => other.to_string(),
    };
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}
