//! Session credentials for provider-facing calls.
//!
//! Every provider call carries a bearer credential obtained from an external
//! session manager. A missing or expired credential is a hard precondition
//! failure raised before any candidate is attempted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Bearer credential for provider and storage calls.
#[derive(Clone)]
pub struct Credential {
    bearer: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: SecretString::from(token.into()),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Utc::now() >= exp).unwrap_or(false)
    }

    /// Raw token for the Authorization header. Handle with care.
    pub fn expose(&self) -> &str {
        self.bearer.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("bearer", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Seam to the external session manager.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Provider name for debugging.
    fn name(&self) -> &str;

    /// Resolve the current bearer credential, or `NotAuthenticated`.
    async fn bearer(&self) -> Result<Credential>;
}

/// Fixed-token session provider for tests and service-account deployments.
#[derive(Debug, Clone)]
pub struct StaticSessionProvider {
    credential: Credential,
}

impl StaticSessionProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::bearer(token),
        }
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn bearer(&self) -> Result<Credential> {
        if self.credential.is_expired() {
            return Err(Error::not_authenticated("session token expired"));
        }
        Ok(self.credential.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_static_provider_resolves() {
        let provider = StaticSessionProvider::new("tok-123");
        let credential = provider.bearer().await.unwrap();
        assert_eq!(credential.expose(), "tok-123");
        assert!(!credential.is_expired());
    }

    #[tokio::test]
    async fn test_expired_credential_rejected() {
        let credential =
            Credential::bearer("tok-old").with_expiry(Utc::now() - Duration::minutes(1));
        assert!(credential.is_expired());

        let provider = StaticSessionProvider::with_credential(credential);
        let err = provider.bearer().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::bearer("tok-secret");
        let debug = format!("{credential:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok-secret"));
    }
}
