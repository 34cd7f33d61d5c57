//! Subscription index and per-session push queues.

pub mod bus;
pub mod queue;

pub use bus::SubscriptionBus;
pub use queue::{PushOutcome, PushQueue, DEFAULT_QUEUE_CAPACITY};
