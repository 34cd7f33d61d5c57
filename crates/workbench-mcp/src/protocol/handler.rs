//! Main request dispatcher: receives JSON-RPC messages, routes to handlers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::context::{ServerContext, SessionContext};
use crate::prompts::PromptRegistry;
use crate::resources::ResourceRegistry;
use crate::session::SessionId;
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::*;

use super::completion;
use super::methods::Method;
use super::negotiation;
use super::validator;

/// Outcome of dispatching one frame.
#[derive(Debug, Default)]
pub struct Reply {
    /// Serialized response, or `None` when nothing must be sent back.
    pub body: Option<Value>,
    /// Session created by an `initialize` in this frame.
    pub session: Option<SessionId>,
}

impl Reply {
    fn body(value: Value) -> Self {
        Self {
            body: Some(value),
            session: None,
        }
    }
}

/// Result of routing one method call.
struct Routed {
    value: Value,
    created: Option<SessionId>,
}

impl From<Value> for Routed {
    fn from(value: Value) -> Self {
        Self {
            value,
            created: None,
        }
    }
}

/// The main protocol handler that dispatches incoming JSON-RPC messages.
pub struct ProtocolHandler {
    server: Arc<ServerContext>,
    tools: ToolRegistry,
    resources: ResourceRegistry,
    prompts: PromptRegistry,
}

impl ProtocolHandler {
    pub fn new(server: Arc<ServerContext>) -> Result<Self, RegistrationError> {
        let tools = ToolRegistry::builtin(server.completer.is_some())?;
        Ok(Self {
            tools,
            resources: ResourceRegistry::builtin()?,
            prompts: PromptRegistry::builtin()?,
            server,
        })
    }

    pub fn server(&self) -> &Arc<ServerContext> {
        &self.server
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Dispatch one raw frame. Bytes that are not UTF-8 JSON get a parse error.
    pub async fn handle_raw(&self, raw: &[u8], ctx: &SessionContext) -> Reply {
        match serde_json::from_slice::<Value>(raw) {
            Ok(value) => self.handle_value(value, ctx).await,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                Reply::body(error_value(
                    &McpError::ParseError(e.to_string()),
                    RequestId::Null,
                ))
            }
        }
    }

    /// Dispatch an already-parsed frame: a single envelope or a batch.
    pub async fn handle_value(&self, value: Value, ctx: &SessionContext) -> Reply {
        match value {
            Value::Array(items) => self.handle_batch(items, ctx).await,
            single => self.handle_single(single, ctx).await,
        }
    }

    async fn handle_batch(&self, items: Vec<Value>, ctx: &SessionContext) -> Reply {
        if items.is_empty() {
            return Reply::body(error_value(
                &McpError::InvalidRequest("Empty batch".to_string()),
                RequestId::Null,
            ));
        }

        let replies = join_all(items.into_iter().map(|item| self.handle_single(item, ctx))).await;

        let mut session = None;
        let mut bodies = Vec::with_capacity(replies.len());
        for reply in replies {
            if reply.session.is_some() {
                session = reply.session;
            }
            bodies.extend(reply.body);
        }

        Reply {
            body: (!bodies.is_empty()).then_some(Value::Array(bodies)),
            session,
        }
    }

    async fn handle_single(&self, value: Value, ctx: &SessionContext) -> Reply {
        let message = match validator::classify(value) {
            Ok(message) => message,
            Err((id, e)) => {
                tracing::warn!("Rejected message: {e}");
                return Reply::body(error_value(&e, id));
            }
        };

        match message {
            JsonRpcMessage::Request(request) => self.handle_request(request, ctx).await,
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification, ctx).await;
                Reply::default()
            }
            JsonRpcMessage::Response(response) => {
                tracing::debug!("Ignoring response object from client: {response}");
                Reply::default()
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest, ctx: &SessionContext) -> Reply {
        let id = request.id;
        tracing::debug!("-> {} (id {id})", request.method);

        match self.route_guarded(&request.method, request.params, ctx).await {
            Ok(routed) => Reply {
                body: Some(
                    serde_json::to_value(JsonRpcResponse::new(id, routed.value))
                        .unwrap_or_default(),
                ),
                session: routed.created,
            },
            Err(e) => {
                log_failure(&request.method, &e);
                Reply::body(error_value(&e, id))
            }
        }
    }

    /// Client notifications run like requests; their outcome is only logged.
    async fn handle_notification(&self, notification: JsonRpcNotification, ctx: &SessionContext) {
        tracing::debug!("-> {} (notification)", notification.method);
        if Method::parse(&notification.method) == Some(Method::Initialize) {
            tracing::warn!("Ignoring initialize sent without an id");
            return;
        }
        if let Err(e) = self
            .route_guarded(&notification.method, notification.params, ctx)
            .await
        {
            log_failure(&notification.method, &e);
        }
    }

    /// Route, converting a panicking handler into `InternalError`.
    async fn route_guarded(
        &self,
        method: &str,
        params: Option<Value>,
        ctx: &SessionContext,
    ) -> McpResult<Routed> {
        AssertUnwindSafe(self.route(method, params, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                Err(McpError::InternalError(detail))
            })
    }

    async fn route(
        &self,
        method_name: &str,
        params: Option<Value>,
        ctx: &SessionContext,
    ) -> McpResult<Routed> {
        let method = Method::parse(method_name)
            .ok_or_else(|| McpError::MethodNotFound(method_name.to_string()))?;

        if !method.requires_session() {
            return self.handle_initialize(params);
        }
        let session_id = ctx.session_id.as_deref().ok_or(McpError::SessionRequired)?;
        self.server.sessions.touch(session_id)?;

        let value = match method {
            // Handled above.
            Method::Initialize => return self.handle_initialize(params),
            Method::Initialized => {
                self.server.sessions.mark_initialized(session_id)?;
                tracing::info!("Session {session_id} handshake complete");
                empty()
            }
            Method::Ping => empty(),

            Method::ToolsList => to_result(ToolListResult {
                tools: self.tools.list_tools(),
                next_cursor: None,
            })?,
            Method::ToolsCall => self.handle_tools_call(params, session_id, ctx).await?,

            Method::ResourcesList => to_result(ResourceListResult {
                resources: self.resources.list_resources(),
                next_cursor: None,
            })?,
            Method::ResourceTemplatesList => to_result(ResourceTemplateListResult {
                resource_templates: self.resources.list_templates(),
                next_cursor: None,
            })?,
            Method::ResourcesRead => {
                let read: ResourceReadParams = parse_params(params, "Resource read")?;
                to_result(self.resources.read(&read.uri, &self.server).await?)?
            }
            Method::ResourcesSubscribe => {
                let sub: ResourceSubscribeParams = parse_params(params, "Subscribe")?;
                if !self.resources.is_subscribable(&sub.uri) {
                    return Err(McpError::ResourceNotFound(sub.uri));
                }
                self.server.bus.subscribe(&sub.uri, session_id)?;
                empty()
            }
            Method::ResourcesUnsubscribe => {
                let sub: ResourceSubscribeParams = parse_params(params, "Unsubscribe")?;
                self.server.bus.unsubscribe(&sub.uri, session_id);
                empty()
            }

            Method::PromptsList => to_result(PromptListResult {
                prompts: self.prompts.list_prompts(),
                next_cursor: None,
            })?,
            Method::PromptsGet => {
                let get: PromptGetParams = parse_params(params, "Prompt get")?;
                to_result(
                    self.prompts
                        .get(&get.name, get.arguments, &self.server)
                        .await?,
                )?
            }

            Method::LoggingSetLevel => {
                let set: SetLevelParams = parse_params(params, "Set level")?;
                self.server.sessions.set_log_level(session_id, set.level)?;
                if let Some(control) = &self.server.log_control {
                    control
                        .apply(set.level.as_filter())
                        .map_err(McpError::InternalError)?;
                }
                tracing::info!("Session {session_id} set log level to {:?}", set.level);
                empty()
            }
            Method::CompletionComplete => {
                let complete: CompleteParams = parse_params(params, "Completion")?;
                to_result(
                    completion::complete(complete, &self.prompts, &self.resources, &self.server)
                        .await?,
                )?
            }
            Method::Cancelled => {
                let cancel: Option<CancelRequestParams> =
                    params.and_then(|p| serde_json::from_value(p).ok());
                match cancel {
                    Some(c) => tracing::info!(
                        "Client cancelled request {} ({}); in-flight work is not interrupted",
                        c.request_id,
                        c.reason.as_deref().unwrap_or("no reason")
                    ),
                    None => tracing::info!("Received cancellation notification"),
                }
                empty()
            }
        };

        Ok(value.into())
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Routed> {
        let init: InitializeParams = parse_params(params, "Initialize")?;
        let result = negotiation::negotiate(&init, &self.server.config.name)?;
        let session_id = self.server.sessions.create(
            &result.protocol_version,
            init.client_info,
            init.capabilities,
        );
        Ok(Routed {
            value: to_result(result)?,
            created: Some(session_id),
        })
    }

    async fn handle_tools_call(
        &self,
        params: Option<Value>,
        session_id: &str,
        ctx: &SessionContext,
    ) -> McpResult<Value> {
        let call: ToolCallParams = parse_params(params, "Tool call")?;
        let tool_ctx = ToolContext {
            server: &self.server,
            session_id: Some(session_id),
            scopes: &ctx.scopes,
            progress_token: call.progress_token(),
        };

        let result = self.tools.call(&call.name, call.arguments, &tool_ctx).await?;
        if result.is_error() {
            tracing::debug!("Tool {} reported an error", call.name);
        }
        to_result(result)
    }
}

fn empty() -> Value {
    Value::Object(serde_json::Map::new())
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    let params =
        params.ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_result(value: impl Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn error_value(error: &McpError, id: RequestId) -> Value {
    serde_json::to_value(error.to_json_rpc_error(id)).unwrap_or_default()
}

fn log_failure(method: &str, error: &McpError) {
    if error.code() == error_codes::INTERNAL_ERROR {
        tracing::error!("{method} failed: {error}");
    } else {
        tracing::debug!("{method} rejected: {error}");
    }
}
