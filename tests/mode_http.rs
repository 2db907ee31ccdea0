mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_server;
use common::http::{assert_json_error, assert_status_ok_json, request, response_json, set_mode};
use gesture_core::{Mode, SessionEvent};

#[tokio::test]
async fn it_mode_defaults_to_idle() {
    let app = spawn_test_server().await;

    let resp = request(&app.app, Method::GET, "/api/mode", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["mode"], "idle");
    assert_eq!(body["data"]["inputMode"], false);
    assert_eq!(body["data"]["scrollMode"], false);
    assert_eq!(body["data"]["warningCount"], 0);
}

#[tokio::test]
async fn it_mode_round_trip_broadcasts_once() {
    let app = spawn_test_server().await;
    let mut events = app.state.subscribe_events();

    let body = set_mode(&app.app, "eye_control").await;
    assert_eq!(body["data"]["mode"], "eye_control");
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::ModeUpdate {
            mode: Mode::EyeControl
        }
    );

    // 相同模式不会再次广播
    set_mode(&app.app, "eye_control").await;
    assert!(events.try_recv().is_err());

    let resp = request(&app.app, Method::GET, "/api/mode", None, &[]).await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["mode"], "eye_control");
    assert!(app.state.session().controller().is_active());
}

#[tokio::test]
async fn it_mode_switch_toggles_components() {
    let app = spawn_test_server().await;

    set_mode(&app.app, "warning").await;
    {
        let session = app.state.session();
        assert!(session.warning_system().is_active());
        assert!(!session.controller().is_active());
    }

    set_mode(&app.app, "none").await;
    let session = app.state.session();
    assert_eq!(session.mode(), Mode::Idle);
    assert!(!session.warning_system().is_active());
    assert!(!session.controller().is_active());
}

#[tokio::test]
async fn it_unknown_mode_is_rejected() {
    let app = spawn_test_server().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/mode",
        Some(json!({ "mode": "sleep" })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_MODE");
    assert!(body["traceId"].is_string());
}

#[tokio::test]
async fn it_malformed_mode_body_is_rejected() {
    let app = spawn_test_server().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/mode",
        Some(json!({ "mode": 1 })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
}
