//! Identity tokens for authorizing writes.

use async_trait::async_trait;

/// Source of identity tokens. `None` means "write anonymously".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch a token scoped by `template` (e.g. "recipe-store").
    async fn token(&self, template: &str) -> Option<String>;
}

/// Hands out one fixed token, usually from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    token: Option<String>,
}

impl StaticIdentity {
    pub fn new(token: Option<String>) -> Self {
        Self {
            // A blank token is the same as none
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn token(&self, template: &str) -> Option<String> {
        tracing::debug!(template, present = self.token.is_some(), "Identity token requested");
        self.token.clone()
    }
}

/// Never returns a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl IdentityProvider for Anonymous {
    async fn token(&self, _template: &str) -> Option<String> {
        None
    }
}
