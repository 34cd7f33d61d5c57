//! Client session registry.

pub mod registry;

pub use registry::{
    PurgedSession, Session, SessionId, SessionRegistry, DEFAULT_IDLE_TIMEOUT,
    DEFAULT_SESSION_GRACE,
};
