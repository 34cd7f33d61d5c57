//! Per-client session state and lifecycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::notify::PushQueue;
use crate::types::{ClientCapabilities, Implementation, LogLevel, McpError, McpResult};

pub type SessionId = String;

/// How long a detached session is kept for reconnection.
pub const DEFAULT_SESSION_GRACE: Duration = Duration::from_secs(60);
/// How long a session without a push channel may stay silent.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// State for one client, created by a successful `initialize`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub protocol_version: String,
    pub client_info: Implementation,
    pub client_capabilities: ClientCapabilities,
    pub initialized: bool,
    pub log_level: Option<LogLevel>,
    pub subscriptions: HashSet<String>,
    push_channel: Option<Arc<PushQueue>>,
    last_seen: Instant,
    detached_at: Option<Instant>,
}

impl Session {
    fn new(
        protocol_version: String,
        client_info: Implementation,
        client_capabilities: ClientCapabilities,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            protocol_version,
            client_info,
            client_capabilities,
            initialized: false,
            log_level: None,
            subscriptions: HashSet::new(),
            push_channel: None,
            last_seen: Instant::now(),
            detached_at: None,
        }
    }

    /// True while a push stream is attached.
    pub fn has_push_channel(&self) -> bool {
        self.push_channel.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.detached_at.is_some()
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    fn is_expired(&self, grace: Duration, idle_timeout: Duration) -> bool {
        if let Some(at) = self.detached_at {
            return at.elapsed() >= grace;
        }
        self.push_channel.is_none() && self.last_seen.elapsed() >= idle_timeout
    }
}

/// A session removed by [`SessionRegistry::purge_expired`].
#[derive(Debug)]
pub struct PurgedSession {
    pub id: SessionId,
    pub subscriptions: HashSet<String>,
}

/// Owns every live session.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Session>,
    grace: Duration,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_GRACE, DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new(grace: Duration, idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            grace,
            idle_timeout,
        }
    }

    /// Create a session and return its id.
    pub fn create(
        &self,
        protocol_version: &str,
        client_info: Implementation,
        client_capabilities: ClientCapabilities,
    ) -> SessionId {
        let session = Session::new(
            protocol_version.to_string(),
            client_info,
            client_capabilities,
        );
        let id = session.id.clone();
        tracing::info!(
            "Session {id} created for {} {} (protocol {protocol_version})",
            session.client_info.name,
            session.client_info.version
        );
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Snapshot of a session.
    pub fn get(&self, id: &str) -> McpResult<Session> {
        self.sessions
            .get(id)
            .map(|s| s.value().clone())
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Record activity on a session.
    pub fn touch(&self, id: &str) -> McpResult<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;
        session.last_seen = Instant::now();
        Ok(())
    }

    pub fn mark_initialized(&self, id: &str) -> McpResult<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;
        session.initialized = true;
        Ok(())
    }

    pub fn set_log_level(&self, id: &str, level: LogLevel) -> McpResult<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;
        session.log_level = Some(level);
        Ok(())
    }

    /// Bind a fresh push queue to the session, replacing any previous one.
    ///
    /// Attaching also clears a pending detach, so a client that reconnects
    /// within the grace period keeps its session and subscriptions.
    pub fn attach(&self, id: &str, capacity: usize) -> McpResult<Arc<PushQueue>> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;

        let queue = Arc::new(PushQueue::new(capacity));
        if let Some(previous) = session.push_channel.replace(queue.clone()) {
            previous.close();
        }
        session.detached_at = None;
        session.last_seen = Instant::now();
        tracing::debug!("Session {id} attached push channel");
        Ok(queue)
    }

    /// Drop the push channel and start the grace period.
    pub fn detach(&self, id: &str) -> bool {
        let Some(mut session) = self.sessions.get_mut(id) else {
            return false;
        };
        if let Some(queue) = session.push_channel.take() {
            queue.close();
        }
        session.detached_at = Some(Instant::now());
        tracing::debug!("Session {id} detached");
        true
    }

    /// Detach only if `queue` is still the session's current channel.
    ///
    /// A stream that was replaced by a newer attach must not tear down
    /// its successor when it finally closes.
    pub fn detach_channel(&self, id: &str, queue: &Arc<PushQueue>) -> bool {
        let current = self
            .sessions
            .get(id)
            .and_then(|s| s.push_channel.clone());
        match current {
            Some(current) if Arc::ptr_eq(&current, queue) => self.detach(id),
            _ => {
                queue.close();
                false
            }
        }
    }

    /// The live push queue, if one is attached.
    pub fn push_channel(&self, id: &str) -> Option<Arc<PushQueue>> {
        self.sessions.get(id).and_then(|s| s.push_channel.clone())
    }

    pub fn add_subscription(&self, id: &str, uri: &str) -> McpResult<bool> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;
        Ok(session.subscriptions.insert(uri.to_string()))
    }

    pub fn remove_subscription(&self, id: &str, uri: &str) -> bool {
        self.sessions
            .get_mut(id)
            .map(|mut s| s.subscriptions.remove(uri))
            .unwrap_or(false)
    }

    /// Remove sessions detached longer than the grace period, and sessions
    /// without a push channel idle longer than the idle timeout.
    pub fn purge_expired(&self) -> Vec<PurgedSession> {
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|s| s.is_expired(self.grace, self.idle_timeout))
            .map(|s| s.key().clone())
            .collect();

        let mut purged = Vec::with_capacity(expired.len());
        for id in expired {
            let removed = self
                .sessions
                .remove_if(&id, |_, s| s.is_expired(self.grace, self.idle_timeout));
            if let Some((id, session)) = removed {
                if let Some(queue) = &session.push_channel {
                    queue.close();
                }
                tracing::info!("Session {id} expired");
                purged.push(PurgedSession {
                    id,
                    subscriptions: session.subscriptions,
                });
            }
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(grace_ms: u64, idle_ms: u64) -> SessionRegistry {
        SessionRegistry::new(
            Duration::from_millis(grace_ms),
            Duration::from_millis(idle_ms),
        )
    }

    fn create(reg: &SessionRegistry) -> SessionId {
        reg.create(
            "2024-11-05",
            Implementation {
                name: "test".into(),
                version: "1.0".into(),
            },
            ClientCapabilities::default(),
        )
    }

    #[test]
    fn test_create_yields_distinct_ids() {
        let reg = SessionRegistry::default();
        let a = create(&reg);
        let b = create(&reg);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let reg = SessionRegistry::default();
        assert!(matches!(
            reg.get("nope"),
            Err(McpError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_detach_closes_queue() {
        let reg = SessionRegistry::default();
        let id = create(&reg);
        let queue = reg.attach(&id, 4).unwrap();
        assert!(reg.detach(&id));
        assert!(queue.is_closed());
        assert!(reg.push_channel(&id).is_none());
        assert!(reg.get(&id).unwrap().is_detached());
    }

    #[test]
    fn test_stale_channel_does_not_detach_successor() {
        let reg = SessionRegistry::default();
        let id = create(&reg);
        let first = reg.attach(&id, 4).unwrap();
        let second = reg.attach(&id, 4).unwrap();
        assert!(first.is_closed());
        assert!(!reg.detach_channel(&id, &first));
        assert!(!second.is_closed());
        assert!(reg.detach_channel(&id, &second));
    }

    #[test]
    fn test_purge_after_grace() {
        let reg = registry(0, 60_000);
        let id = create(&reg);
        reg.attach(&id, 4).unwrap();
        reg.add_subscription(&id, "server://counter").unwrap();
        assert!(reg.purge_expired().is_empty());

        reg.detach(&id);
        let purged = reg.purge_expired();
        assert_eq!(purged.len(), 1);
        assert!(purged[0].subscriptions.contains("server://counter"));
        assert!(!reg.contains(&id));
    }

    #[test]
    fn test_reattach_within_grace_keeps_session() {
        let reg = registry(60_000, 60_000);
        let id = create(&reg);
        reg.attach(&id, 4).unwrap();
        reg.detach(&id);
        reg.attach(&id, 4).unwrap();
        assert!(!reg.get(&id).unwrap().is_detached());
        assert!(reg.purge_expired().is_empty());
    }

    #[test]
    fn test_idle_session_without_channel_expires() {
        let reg = registry(60_000, 0);
        let idle = create(&reg);
        let streaming = create(&reg);
        reg.attach(&streaming, 4).unwrap();

        let purged: Vec<SessionId> = reg.purge_expired().into_iter().map(|p| p.id).collect();
        assert_eq!(purged, vec![idle]);
        assert!(reg.contains(&streaming));
    }
}
