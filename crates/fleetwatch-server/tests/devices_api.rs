#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fleetwatch_core::device::{default_seed, Device};
use fleetwatch_server::{app_state::AppState, config::ServiceConfig, router};

async fn test_state() -> AppState {
    state_with_delay(0).await
}

async fn state_with_delay(list_delay_micros: u64) -> AppState {
    let mut cfg = ServiceConfig::default();
    cfg.app.version = "2.10.5".into();
    cfg.api.list_delay_micros = list_delay_micros;
    AppState::new(cfg).await.expect("state")
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .expect("request");
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8"))
}

async fn list(app: &Router) -> Vec<Device> {
    let (status, body) = send(app, Method::GET, "/devices", "").await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).expect("device json")
}

#[tokio::test]
async fn list_returns_seed_in_order() {
    let app = router::build_api_router(test_state().await);

    let req = Request::builder().uri("/devices/").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    assert_eq!(list(&app).await, default_seed());
}

#[tokio::test]
async fn upgrade_then_list_and_scrape() {
    let state = test_state().await;
    let api = router::build_api_router(state.clone());
    let ops = router::build_ops_router(state);

    let (status, body) = send(&api, Method::PUT, "/devices/1", r#"{"firmware":"2.3.0"}"#).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, "upgrading");

    let devices = list(&api).await;
    assert_eq!(devices[0], Device::new(1, "5F-4G", "2.3.0"));
    assert_eq!(devices[1], Device::new(2, "5E-4G", "2.2.1"));

    let (status, metrics) = send(&ops, Method::GET, "/metrics", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics.contains(r#"myapp_device_upgrade_total{type="router"} 1"#));
    assert!(metrics.contains("myapp_devices 2"));
    assert!(metrics.contains(r#"myapp_info{version="2.10.5"} 1"#));
    assert!(metrics.contains(r#"myapp_request_duration_seconds_count{method="GET",status="200"} 1"#));
}

#[tokio::test]
async fn upgrade_unknown_device_is_accepted_noop() {
    let state = test_state().await;
    let api = router::build_api_router(state.clone());

    let (status, body) = send(&api, Method::PUT, "/devices/99", r#"{"firmware":"9.9.9"}"#).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, "upgrading");
    assert_eq!(list(&api).await, default_seed());
    assert_eq!(state.metrics().upgrade_count("router"), 1);
}

#[tokio::test]
async fn upgrade_counter_tracks_successful_puts() {
    let state = test_state().await;
    let api = router::build_api_router(state.clone());
    let before = state.metrics().upgrade_count("router");

    for fw in ["3.0.0", "3.0.1", "3.0.2"] {
        let body = format!(r#"{{"firmware":"{fw}","mac":"ignored"}}"#);
        let (status, _) = send(&api, Method::PUT, "/devices/2", &body).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    // Rejected requests do not count.
    send(&api, Method::PUT, "/devices/abc", r#"{"firmware":"x"}"#).await;
    send(&api, Method::PUT, "/devices/2", "not-json").await;

    assert_eq!(state.metrics().upgrade_count("router"), before + 3);
    let devices = list(&api).await;
    assert_eq!(devices[1], Device::new(2, "5E-4G", "3.0.2"));
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let api = router::build_api_router(test_state().await);

    for uri in [
        "/devices/abc",
        "/devices/0",
        "/devices/-1",
        "/devices/%FF",
        "/devices/99999999999999999999999",
        "/devices",
    ] {
        let (status, body) = send(&api, Method::PUT, uri, r#"{"firmware":"2.3.0"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri={uri}");
        assert_eq!(body, "404 page not found", "uri={uri}");
    }
    assert_eq!(list(&api).await, default_seed());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let api = router::build_api_router(test_state().await);

    let (status, body) = send(&api, Method::PUT, "/devices/1", "not-json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.is_empty());

    let (status, body) = send(&api, Method::PUT, "/devices/1", r#"{"mac":"x"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("firmware"));

    assert_eq!(list(&api).await, default_seed());
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let api = router::build_api_router(test_state().await);

    for (method, uri) in [
        (Method::POST, "/devices"),
        (Method::DELETE, "/devices/1"),
        (Method::PATCH, "/devices/"),
    ] {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let res = api.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "uri={uri}");
        assert_eq!(res.headers().get(header::ALLOW).unwrap(), "GET, PUT");
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"method not allowed");
    }
}

#[tokio::test]
async fn nested_device_paths_follow_device_routes() {
    let api = router::build_api_router(test_state().await);

    let (status, body) = send(&api, Method::GET, "/devices/1/x", "").await;
    assert_eq!(status, StatusCode::OK);
    let devices: Vec<Device> = serde_json::from_str(&body).expect("device json");
    assert_eq!(devices, default_seed());

    for uri in ["/devices/1/", "/devices/1/firmware"] {
        let (status, body) = send(&api, Method::PUT, uri, r#"{"firmware":"2.3.0"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri={uri}");
        assert_eq!(body, "404 page not found", "uri={uri}");
    }

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/devices/1/x")
        .body(Body::empty())
        .unwrap();
    let res = api.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers().get(header::ALLOW).unwrap(), "GET, PUT");

    let (status, body) = send(&api, Method::GET, "/elsewhere", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 page not found");

    assert_eq!(list(&api).await, default_seed());
}

#[tokio::test]
async fn list_delay_is_observed_in_duration_histogram() {
    let state = state_with_delay(150_000).await;
    let api = router::build_api_router(state.clone());
    let ops = router::build_ops_router(state);

    assert_eq!(list(&api).await, default_seed());

    let (_, metrics) = send(&ops, Method::GET, "/metrics", "").await;
    let bucket = |le: &str| {
        format!(r#"myapp_request_duration_seconds_bucket{{method="GET",status="200",le="{le}"}}"#)
    };
    assert!(metrics.contains(&format!("{} 0", bucket("0.1"))), "{metrics}");
    assert!(metrics.contains(&format!("{} 1", bucket("0.2"))), "{metrics}");
}

#[tokio::test]
async fn healthz_and_unknown_ops_route() {
    let ops = router::build_ops_router(test_state().await);

    let (status, body) = send(&ops, Method::GET, "/healthz", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = send(&ops, Method::GET, "/devices", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
