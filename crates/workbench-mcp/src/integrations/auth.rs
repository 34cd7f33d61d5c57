//! Bearer-credential authorization.

use std::collections::BTreeSet;

use async_trait::async_trait;

pub const SCOPE_READ: &str = "read";
pub const SCOPE_WRITE: &str = "write";

/// Scopes granted to a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scopes {
    /// No authorizer is configured: every scope is granted.
    #[default]
    Unrestricted,
    Granted(BTreeSet<String>),
}

impl Scopes {
    pub fn granted<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scopes::Granted(scopes.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, scope: &str) -> bool {
        match self {
            Scopes::Unrestricted => true,
            Scopes::Granted(set) => set.contains(scope),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredential,
    #[error("invalid bearer token")]
    InvalidCredential,
}

/// Validates a bearer credential and yields the scopes it grants.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, credential: Option<&str>) -> Result<Scopes, AuthError>;
}

/// Accepts one fixed token, granting `read` and `write`.
pub struct StaticTokenAuthorizer {
    token: String,
}

impl StaticTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authorize(&self, credential: Option<&str>) -> Result<Scopes, AuthError> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        if credential == self.token {
            Ok(Scopes::granted([SCOPE_READ, SCOPE_WRITE]))
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let auth = StaticTokenAuthorizer::new("s3cret");
        let scopes = auth.authorize(Some("s3cret")).await.unwrap();
        assert!(scopes.allows(SCOPE_WRITE));
        assert_eq!(
            auth.authorize(Some("nope")).await,
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(auth.authorize(None).await, Err(AuthError::MissingCredential));
    }

    #[test]
    fn test_scope_checks() {
        assert!(Scopes::Unrestricted.allows(SCOPE_WRITE));
        let read_only = Scopes::granted([SCOPE_READ]);
        assert!(read_only.allows(SCOPE_READ));
        assert!(!read_only.allows(SCOPE_WRITE));
    }

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
