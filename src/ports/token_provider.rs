//! Token provider port for outbound bearer credentials.
//!
//! Every backend call asks the provider for a token at call time. A missing
//! token is not a local error: the call proceeds without an
//! `Authorization` header and the backend rejects it, which surfaces as
//! `SyncError::Auth` through the normal failure path.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::SyncError;

/// Supplies the current bearer credential.
///
/// # Contract
///
/// Implementations must:
/// - Return `Ok(Some(token))` when a valid token is available
/// - Return `Ok(None)` when the user has no valid token (signed out, expired
///   and not refreshable)
/// - Return `Err` only for provider malfunctions; callers log it and treat
///   it like `Ok(None)`
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get the bearer token to attach to the next request.
    async fn bearer_token(&self) -> Result<Option<SecretString>, SyncError>;
}
