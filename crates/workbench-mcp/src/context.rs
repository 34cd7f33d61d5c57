//! Shared server state and per-request connection context.

use std::sync::Arc;

use tokio::sync::Mutex;

use workbench::Workbench;

use crate::config::ServerConfig;
use crate::integrations::{CompletionProvider, Scopes};
use crate::notify::SubscriptionBus;
use crate::session::{SessionId, SessionRegistry};

/// Applies a `tracing` filter directive at runtime.
#[derive(Clone)]
pub struct LogControl(Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>);

impl LogControl {
    pub fn new(apply: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(apply))
    }

    pub fn apply(&self, directive: &str) -> Result<(), String> {
        (self.0)(directive)
    }
}

impl std::fmt::Debug for LogControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LogControl")
    }
}

/// Everything a handler can reach. Built once at startup and shared.
pub struct ServerContext {
    pub config: ServerConfig,
    /// Counter and notes. One lock, so every mutation has a single writer.
    pub workbench: Mutex<Workbench>,
    pub sessions: Arc<SessionRegistry>,
    pub bus: Arc<SubscriptionBus>,
    pub completer: Option<Arc<dyn CompletionProvider>>,
    pub log_control: Option<LogControl>,
}

impl ServerContext {
    pub fn new(config: ServerConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(
            config.session_grace,
            config.idle_timeout,
        ));
        let bus = Arc::new(SubscriptionBus::new(sessions.clone()));
        Self {
            config,
            workbench: Mutex::new(Workbench::new()),
            sessions,
            bus,
            completer: None,
            log_control: None,
        }
    }

    pub fn with_completer(mut self, completer: Arc<dyn CompletionProvider>) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn with_log_control(mut self, control: LogControl) -> Self {
        self.log_control = Some(control);
        self
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// What a transport knows about the connection a message arrived on.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: Option<SessionId>,
    pub scopes: Scopes,
}

impl SessionContext {
    pub fn for_session(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            scopes: Scopes::Unrestricted,
        }
    }

    pub fn with_scopes(mut self, scopes: Scopes) -> Self {
        self.scopes = scopes;
        self
    }
}
