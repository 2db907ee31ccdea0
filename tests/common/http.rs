use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, String)],
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);

    for (k, v) in headers {
        builder = builder.header(*k, v.as_str());
    }

    let req = if let Some(payload) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("empty body")
    };

    app.clone().oneshot(req).await.expect("oneshot response")
}

pub async fn response_json(resp: Response) -> (StatusCode, HeaderMap, Value) {
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body bytes");

    let json = if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice::<Value>(&bytes).expect("parse json body")
    };

    (status, headers, json)
}

/// Reads the next data chunk of a streaming body (SSE, MJPEG).
pub async fn next_chunk(resp: &mut Response) -> Bytes {
    loop {
        let frame = resp
            .body_mut()
            .frame()
            .await
            .expect("stream ended")
            .expect("body error");
        if let Ok(data) = frame.into_data() {
            return data;
        }
    }
}

pub fn content_type(resp: &Response) -> String {
    resp.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

pub async fn set_mode(app: &Router, mode: &str) -> Value {
    let resp = request(app, Method::POST, "/api/mode", Some(json!({ "mode": mode })), &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    body
}

pub async fn post_frame(app: &Router, payload: Value) -> (StatusCode, Value) {
    let resp = request(app, Method::POST, "/api/frames", Some(payload), &[]).await;
    let (status, _, body) = response_json(resp).await;
    (status, body)
}

pub fn assert_json_error(body: &Value, code: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], code);
    assert!(body.get("message").is_some());
}

pub fn assert_status_ok_json(status: StatusCode, body: &Value) {
    assert!(status.is_success());
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_some());
}
