//! HTTP + SSE transport tests, driven through the router with `oneshot`.

#![cfg(feature = "sse")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use workbench_mcp::integrations::StaticTokenAuthorizer;
use workbench_mcp::protocol::ProtocolHandler;
use workbench_mcp::transport::{SseTransport, SESSION_HEADER};

fn post(body: Value, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn initialize(app: &Router) -> String {
    let response = app.clone().oneshot(post(init_request(), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.headers()[SESSION_HEADER]
        .to_str()
        .unwrap()
        .to_string()
}

async fn next_frame(frames: &mut BodyDataStream) -> String {
    let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("frame within timeout")
        .expect("stream open")
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

fn app(handler: Arc<ProtocolHandler>) -> Router {
    SseTransport::new(handler).router()
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app(handler());

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = json_body(health).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["server"], "workbench-mcp");
    assert_eq!(body["sessions"], 0);

    let ready = app
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_initialize_returns_session_header() {
    let app = app(handler());
    let session = initialize(&app).await;

    let pong = app
        .clone()
        .oneshot(post(mcp_request(1, "ping", json!({})), Some(&session)))
        .await
        .unwrap();
    assert_eq!(json_body(pong).await["result"], json!({}));

    let missing = app
        .oneshot(post(mcp_request(2, "tools/list", json!({})), None))
        .await
        .unwrap();
    let body = json_body(missing).await;
    assert_eq!(error_code(&body), -32600);
}

#[tokio::test]
async fn test_notification_only_post_is_accepted() {
    let app = app(handler());
    let session = initialize(&app).await;

    let response = app
        .oneshot(post(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            Some(&session),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let app = app(handler());
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .body(Body::from("{oops"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(error_code(&body), -32700);
}

#[tokio::test]
async fn test_non_utf8_body_is_parse_error() {
    let app = app(handler());
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(&b"\xff\xfe{}"[..]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(error_code(&body), -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_bearer_auth() {
    let handler = handler();
    let app = SseTransport::with_authorizer(handler, Arc::new(StaticTokenAuthorizer::new("s3cret")))
        .router();

    let denied = app.clone().oneshot(post(init_request(), None)).await.unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&json_body(denied).await), -32900);

    let mut request = post(init_request(), None);
    request
        .headers_mut()
        .insert("authorization", "Bearer s3cret".parse().unwrap());
    let allowed = app.clone().oneshot(request).await.unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);

    let health = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK, "health bypasses auth");
}

#[tokio::test]
async fn test_stream_requires_known_session() {
    let app = app(handler());

    let missing = app
        .clone()
        .oneshot(Request::get("/mcp/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .oneshot(
            Request::get("/mcp/sse?session_id=nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_delivers_resource_updates() {
    let handler = handler();
    let server = handler.server().clone();
    let app = app(handler);
    let session = initialize(&app).await;

    let stream = app
        .clone()
        .oneshot(
            Request::get(format!("/mcp/sse?session_id={session}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    let mut frames = stream.into_body().into_data_stream();

    let connected = next_frame(&mut frames).await;
    assert!(connected.contains("event: connection"), "{connected}");
    assert!(connected.contains(&session));

    app.clone()
        .oneshot(post(
            mcp_request(1, "resources/subscribe", json!({"uri": "server://counter"})),
            Some(&session),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post(
            tool_call(2, "increment_counter", json!({})),
            Some(&session),
        ))
        .await
        .unwrap();

    let message = next_frame(&mut frames).await;
    assert!(message.contains("event: message"), "{message}");
    assert!(message.contains("notifications/resources/updated"));
    assert!(message.contains("server://counter"));

    drop(frames);
    let live = server.sessions.get(&session).unwrap();
    assert!(!live.has_push_channel(), "dropping the stream detaches");
    assert!(live.is_detached());
}
