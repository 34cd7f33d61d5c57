//! Pluggable collaborators: authorization and text completion.

pub mod auth;
pub mod completion;

pub use auth::{
    bearer_token, AuthError, Authorizer, Scopes, StaticTokenAuthorizer, SCOPE_READ, SCOPE_WRITE,
};
pub use completion::{ChatMessage, CompletionError, CompletionProvider, EchoProvider};
