//! In-process token provider.
//!
//! Holds whatever credential the login flow last stored. Also serves as the
//! test double for the `TokenProvider` port.
//!
//! # Example
//!
//! ```ignore
//! use clinic_sync::adapters::auth::StaticTokenProvider;
//!
//! let tokens = StaticTokenProvider::new("eyJ...");
//! // after logout
//! tokens.clear();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::SyncError;
use crate::ports::TokenProvider;

/// Token provider backed by a swappable in-memory credential.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<SecretString>>,
    /// Optional error to return for every request (for error testing)
    force_error: RwLock<Option<SyncError>>,
    requests: AtomicUsize,
}

impl StaticTokenProvider {
    /// Creates a provider holding `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::new(token.into()))),
            ..Self::default()
        }
    }

    /// Creates a provider with no credential.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Forces every request to fail with `error`.
    pub fn with_error(self, error: SyncError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Replaces the stored credential (login or token refresh).
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            Some(SecretString::new(token.into()));
    }

    /// Drops the stored credential (logout).
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of times a token was requested.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<Option<SecretString>, SyncError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        Ok(self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn returns_stored_token() {
        let provider = StaticTokenProvider::new("tok-1");
        let token = provider.bearer_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "tok-1");
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn clear_and_set_token_swap_credential() {
        let provider = StaticTokenProvider::new("old");
        provider.clear();
        assert!(provider.bearer_token().await.unwrap().is_none());

        provider.set_token("new");
        let token = provider.bearer_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "new");
    }

    #[tokio::test]
    async fn forced_error_is_returned() {
        let provider = StaticTokenProvider::new("tok").with_error(SyncError::auth("refresh failed"));
        assert_eq!(
            provider.bearer_token().await.unwrap_err(),
            SyncError::auth("refresh failed")
        );
    }

    #[test]
    fn debug_output_does_not_leak_token() {
        let provider = StaticTokenProvider::new("super-secret");
        assert!(!format!("{:?}", provider).contains("super-secret"));
    }
}
