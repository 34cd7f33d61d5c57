//! Bounded per-session push queue.
//!
//! Publishers never wait: when the queue is full the oldest pending
//! notification is discarded to make room. A single consumer (the
//! session's push stream) drains it in FIFO order.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::types::JsonRpcNotification;

/// Default queue capacity per session.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// What happened to a pushed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued, but the oldest pending entry was discarded.
    DroppedOldest,
    /// The queue is closed; the notification was discarded.
    Closed,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<JsonRpcNotification>,
    closed: bool,
    dropped: u64,
}

#[derive(Debug)]
pub struct PushQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl PushQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A poisoned lock only means a pusher panicked mid-update; the deque
        // itself is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue without blocking.
    pub fn push(&self, notification: JsonRpcNotification) -> PushOutcome {
        let outcome = {
            let mut state = self.lock();
            if state.closed {
                return PushOutcome::Closed;
            }
            let outcome = if state.items.len() >= self.capacity {
                state.items.pop_front();
                state.dropped += 1;
                PushOutcome::DroppedOldest
            } else {
                PushOutcome::Queued
            };
            state.items.push_back(notification);
            outcome
        };
        self.notify.notify_one();
        outcome
    }

    /// Wait for the next notification. Returns `None` once the queue is
    /// closed; anything still pending at close time is discarded.
    pub async fn recv(&self) -> Option<JsonRpcNotification> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
            }

            notified.await;
        }
    }

    /// Non-blocking receive.
    pub fn try_recv(&self) -> Option<JsonRpcNotification> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.items.pop_front()
    }

    /// Close the queue and drop whatever is pending.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.items.clear();
        }
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of notifications discarded by overflow so far.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn note(n: u32) -> JsonRpcNotification {
        JsonRpcNotification::new("test/event", Some(serde_json::json!({ "n": n })))
    }

    #[test]
    fn test_fifo_order() {
        let q = PushQueue::new(4);
        for i in 0..3 {
            assert_eq!(q.push(note(i)), PushOutcome::Queued);
        }
        for i in 0..3 {
            assert_eq!(q.try_recv(), Some(note(i)));
        }
        assert!(q.try_recv().is_none());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let q = PushQueue::new(2);
        q.push(note(1));
        q.push(note(2));
        assert_eq!(q.push(note(3)), PushOutcome::DroppedOldest);
        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.try_recv(), Some(note(2)));
        assert_eq!(q.try_recv(), Some(note(3)));
    }

    #[test]
    fn test_closed_queue_discards() {
        let q = PushQueue::new(2);
        q.push(note(1));
        q.close();
        assert!(q.is_empty());
        assert_eq!(q.push(note(2)), PushOutcome::Closed);
    }

    #[test]
    fn test_recv_pending_until_push() {
        let q = PushQueue::new(4);
        let mut recv = tokio_test::task::spawn(q.recv());
        tokio_test::assert_pending!(recv.poll());
        q.push(note(1));
        assert!(recv.is_woken());
        tokio_test::assert_ready_eq!(recv.poll(), Some(note(1)));
    }

    #[tokio::test]
    async fn test_recv_wakes_on_push() {
        let q = Arc::new(PushQueue::new(8));
        let consumer = {
            let q = q.clone();
            tokio::spawn(async move { q.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        q.push(note(7));
        let got = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, Some(note(7)));
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_close() {
        let q = Arc::new(PushQueue::new(8));
        let consumer = {
            let q = q.clone();
            tokio::spawn(async move { q.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        q.close();
        let got = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert!(got.is_none());
    }
}
