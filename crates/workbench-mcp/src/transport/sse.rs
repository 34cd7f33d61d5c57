//! SSE transport: HTTP server with auth, a push stream per session, and /health.
//!
//! `POST /mcp` carries JSON-RPC envelopes; the session id travels in the
//! `X-Session-ID` header. `GET /mcp/sse` attaches the session's push queue
//! and streams queued notifications until the client goes away.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json as AxumJson, Response,
    },
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::context::SessionContext;
use crate::integrations::{bearer_token, Authorizer, Scopes};
use crate::notify::PushQueue;
use crate::protocol::ProtocolHandler;
use crate::session::{SessionId, SessionRegistry};
use crate::types::{McpError, McpResult, RequestId, MCP_VERSION};

use super::SESSION_HEADER;

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub handler: Arc<ProtocolHandler>,
    pub authorizer: Option<Arc<dyn Authorizer>>,
}

/// SSE transport for web-based MCP clients.
pub struct SseTransport {
    state: Arc<ServerState>,
}

impl SseTransport {
    pub fn new(handler: Arc<ProtocolHandler>) -> Self {
        Self {
            state: Arc::new(ServerState {
                handler,
                authorizer: None,
            }),
        }
    }

    /// Require bearer authorization on `/mcp` and `/mcp/sse`.
    pub fn with_authorizer(handler: Arc<ProtocolHandler>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            state: Arc::new(ServerState {
                handler,
                authorizer: Some(authorizer),
            }),
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Run the HTTP server on the given address until Ctrl-C.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let server = self.state.handler.server().clone();
        let reaper = server.bus.spawn_reaper(server.config.reap_interval);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| McpError::Transport(e.to_string()));

        reaper.abort();
        tracing::info!("HTTP transport stopped");
        served
    }
}

/// Build the router. `/health` and `/ready` bypass authorization.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    let mcp = Router::new()
        .route("/mcp", post(handle_request))
        .route("/mcp/sse", get(handle_stream))
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    Router::new()
        .merge(mcp)
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn rpc_error(status: StatusCode, error: McpError) -> Response {
    (status, AxumJson(error.to_json_rpc_error(RequestId::Null))).into_response()
}

fn session_header(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Auth middleware: resolves the caller's scopes for the handlers below it.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let scopes = match &state.authorizer {
        None => Scopes::Unrestricted,
        Some(authorizer) => {
            let credential = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(bearer_token);
            match authorizer.authorize(credential).await {
                Ok(scopes) => scopes,
                Err(e) => {
                    tracing::debug!("Rejected HTTP request: {e}");
                    return rpc_error(StatusCode::UNAUTHORIZED, McpError::Unauthorized(e.to_string()));
                }
            }
        }
    };

    request.extensions_mut().insert(scopes);
    next.run(request).await
}

/// Handle JSON-RPC envelopes. The body is taken as raw bytes so malformed
/// JSON or invalid UTF-8 gets a proper -32700 response.
async fn handle_request(
    State(state): State<Arc<ServerState>>,
    Extension(scopes): Extension<Scopes>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = SessionContext {
        session_id: session_header(&headers),
        scopes,
    };

    let reply = state.handler.handle_raw(&body, &ctx).await;

    let mut response = match reply.body {
        Some(body) => AxumJson(body).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };

    if let Some(session_id) = reply.session {
        match HeaderValue::from_str(&session_id) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            Err(e) => tracing::error!("Session id {session_id} is not a valid header: {e}"),
        }
    }

    response
}

#[derive(Debug, Default, Deserialize)]
struct StreamParams {
    session_id: Option<String>,
}

/// Closes the session's push channel when the stream is dropped, unless a
/// newer stream has already replaced it.
struct DetachOnDrop {
    sessions: Arc<SessionRegistry>,
    session_id: SessionId,
    queue: Arc<PushQueue>,
}

impl Drop for DetachOnDrop {
    fn drop(&mut self) {
        if self.sessions.detach_channel(&self.session_id, &self.queue) {
            tracing::info!("Push stream for session {} closed", self.session_id);
        }
    }
}

/// Server-Sent Events endpoint streaming the session's notifications.
async fn handle_stream(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(params): Query<StreamParams>,
) -> Response {
    let Some(session_id) = session_header(&headers).or(params.session_id) else {
        return rpc_error(StatusCode::BAD_REQUEST, McpError::SessionRequired);
    };

    let server = state.handler.server();
    let queue = match server
        .sessions
        .attach(&session_id, server.config.queue_capacity)
    {
        Ok(queue) => queue,
        Err(e) => return rpc_error(StatusCode::NOT_FOUND, e),
    };
    tracing::info!("Push stream attached for session {session_id}");

    let guard = DetachOnDrop {
        sessions: server.sessions.clone(),
        session_id: session_id.clone(),
        queue: queue.clone(),
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        let connected = json!({"type": "connected", "sessionId": session_id});
        yield Ok::<_, Infallible>(Event::default().event("connection").data(connected.to_string()));

        while let Some(notification) = queue.recv().await {
            match serde_json::to_string(&notification) {
                Ok(data) => yield Ok(Event::default().event("message").data(data)),
                Err(e) => tracing::warn!("Dropping unserializable notification: {e}"),
            }
        }
    };

    Sse::new(stream)
        .keep_alive(keep_alive(server.config.keepalive))
        .into_response()
}

fn keep_alive(interval: Duration) -> KeepAlive {
    KeepAlive::new()
        .interval(interval)
        .event(Event::default().event("ping").data("{}"))
}

/// Health check endpoint: no auth required.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    let server = state.handler.server();
    AxumJson(json!({
        "status": "ok",
        "server": server.config.name,
        "version": env!("CARGO_PKG_VERSION"),
        "protocol_version": MCP_VERSION,
        "sessions": server.sessions.len(),
    }))
}

async fn handle_ready() -> AxumJson<serde_json::Value> {
    AxumJson(json!({"status": "ready"}))
}
