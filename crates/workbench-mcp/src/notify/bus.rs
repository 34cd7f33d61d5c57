//! Resource subscriptions and notification fan-out.
//!
//! The bus keeps a `uri -> sessions` index next to the session registry.
//! Publishing looks up subscribers, then pushes onto each live session's
//! queue. Sessions without a push channel are skipped, so delivery is
//! at-most-once and a publisher never waits on a slow consumer.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use super::queue::PushOutcome;
use crate::session::{SessionId, SessionRegistry};
use crate::types::{JsonRpcNotification, McpResult};

pub struct SubscriptionBus {
    sessions: Arc<SessionRegistry>,
    edges: DashMap<String, HashSet<SessionId>>,
}

impl SubscriptionBus {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self {
            sessions,
            edges: DashMap::new(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Subscribe a session to `uri`. Idempotent.
    pub fn subscribe(&self, uri: &str, session_id: &str) -> McpResult<()> {
        self.sessions.add_subscription(session_id, uri)?;
        self.edges
            .entry(uri.to_string())
            .or_default()
            .insert(session_id.to_string());
        tracing::info!("Session {session_id} subscribed to {uri}");
        Ok(())
    }

    /// Remove a subscription. Returns `false` if there was none.
    pub fn unsubscribe(&self, uri: &str, session_id: &str) -> bool {
        self.sessions.remove_subscription(session_id, uri);
        let removed = self.remove_edge(uri, session_id);
        if removed {
            tracing::info!("Session {session_id} unsubscribed from {uri}");
        }
        removed
    }

    fn remove_edge(&self, uri: &str, session_id: &str) -> bool {
        let removed = match self.edges.get_mut(uri) {
            Some(mut set) => set.remove(session_id),
            None => false,
        };
        self.edges.remove_if(uri, |_, set| set.is_empty());
        removed
    }

    /// Sessions currently subscribed to `uri`.
    pub fn subscribers(&self, uri: &str) -> Vec<SessionId> {
        self.edges
            .get(uri)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Push `notification` to every subscriber of `uri` that has a live
    /// channel. Returns the number of queues it was placed on.
    pub fn publish(&self, uri: &str, notification: JsonRpcNotification) -> usize {
        // Snapshot first so no index shard is held while touching sessions.
        let subscribers = self.subscribers(uri);
        let mut delivered = 0;

        for session_id in subscribers {
            let Some(queue) = self.sessions.push_channel(&session_id) else {
                tracing::trace!("Skipping {session_id}: no push channel");
                continue;
            };
            match queue.push(notification.clone()) {
                PushOutcome::Queued => delivered += 1,
                PushOutcome::DroppedOldest => {
                    tracing::warn!("Push queue full for {session_id}, dropped oldest");
                    delivered += 1;
                }
                PushOutcome::Closed => {}
            }
        }

        tracing::debug!("Published {} for {uri} to {delivered} session(s)", notification.method);
        delivered
    }

    /// Publish `notifications/resources/updated` for `uri`.
    pub fn resource_updated(&self, uri: &str) -> usize {
        self.publish(uri, JsonRpcNotification::resource_updated(uri))
    }

    /// Push a notification to one session, best-effort.
    pub fn push_progress(&self, session_id: &str, notification: JsonRpcNotification) -> bool {
        match self.sessions.push_channel(session_id) {
            Some(queue) => queue.push(notification) != PushOutcome::Closed,
            None => false,
        }
    }

    /// Purge expired sessions and drop their subscription edges.
    pub fn purge_expired(&self) -> usize {
        let purged = self.sessions.purge_expired();
        for session in &purged {
            for uri in &session.subscriptions {
                self.remove_edge(uri, &session.id);
            }
        }
        purged.len()
    }

    /// Run [`Self::purge_expired`] every `interval` until the task is aborted.
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let bus = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = bus.purge_expired();
                if purged > 0 {
                    tracing::info!("Reaper purged {purged} session(s)");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientCapabilities, Implementation};

    fn setup(grace: Duration) -> (Arc<SessionRegistry>, SubscriptionBus) {
        let sessions = Arc::new(SessionRegistry::new(grace, Duration::from_secs(3600)));
        let bus = SubscriptionBus::new(sessions.clone());
        (sessions, bus)
    }

    fn create(sessions: &SessionRegistry) -> SessionId {
        sessions.create(
            "2024-11-05",
            Implementation::default(),
            ClientCapabilities::default(),
        )
    }

    #[test]
    fn test_publish_reaches_only_subscribers() {
        let (sessions, bus) = setup(Duration::from_secs(60));
        let a = create(&sessions);
        let b = create(&sessions);
        let qa = sessions.attach(&a, 8).unwrap();
        let qb = sessions.attach(&b, 8).unwrap();

        bus.subscribe("server://counter", &a).unwrap();
        assert_eq!(bus.resource_updated("server://counter"), 1);

        let got = qa.try_recv().unwrap();
        assert_eq!(got, JsonRpcNotification::resource_updated("server://counter"));
        assert!(qa.try_recv().is_none());
        assert!(qb.try_recv().is_none());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (sessions, bus) = setup(Duration::from_secs(60));
        let a = create(&sessions);
        let qa = sessions.attach(&a, 8).unwrap();
        bus.subscribe("server://notes", &a).unwrap();
        assert!(bus.unsubscribe("server://notes", &a));
        assert!(!bus.unsubscribe("server://notes", &a));

        assert_eq!(bus.resource_updated("server://notes"), 0);
        assert!(qa.try_recv().is_none());
    }

    #[test]
    fn test_detached_subscriber_is_skipped() {
        let (sessions, bus) = setup(Duration::from_secs(60));
        let a = create(&sessions);
        sessions.attach(&a, 8).unwrap();
        bus.subscribe("server://counter", &a).unwrap();
        sessions.detach(&a);

        assert_eq!(bus.resource_updated("server://counter"), 0);
    }

    #[test]
    fn test_subscribe_requires_session() {
        let (_, bus) = setup(Duration::from_secs(60));
        assert!(bus.subscribe("server://counter", "ghost").is_err());
        assert!(bus.subscribers("server://counter").is_empty());
    }

    #[test]
    fn test_purge_removes_edges() {
        let (sessions, bus) = setup(Duration::ZERO);
        let a = create(&sessions);
        sessions.attach(&a, 8).unwrap();
        bus.subscribe("server://counter", &a).unwrap();
        sessions.detach(&a);

        assert_eq!(bus.purge_expired(), 1);
        assert!(bus.subscribers("server://counter").is_empty());
    }

    #[test]
    fn test_push_progress_without_channel() {
        let (sessions, bus) = setup(Duration::from_secs(60));
        let a = create(&sessions);
        let n = JsonRpcNotification::new("notifications/progress", None);
        assert!(!bus.push_progress(&a, n.clone()));
        let qa = sessions.attach(&a, 8).unwrap();
        assert!(bus.push_progress(&a, n));
        assert_eq!(qa.len(), 1);
    }
}
