//! The `AuthBackend` trait.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::error::AuthError;
use crate::session::{Identity, OAuthProvider};

/// Number of digits in a one-time password.
pub const OTP_LENGTH: usize = 5;

/// Outcome of an OTP check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpDecision {
    Accepted,
    Rejected,
}

/// Remote identity provider. Calls are independent and not cancellable.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Credential login. Fails with `InvalidCredentials` when either argument is empty.
    async fn authenticate(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<Identity, AuthError>;

    /// Account creation. Fails with `RegistrationFailed` when either argument is empty.
    async fn register(&self, email: &str, secret: &SecretString) -> Result<Identity, AuthError>;

    /// Third-party sign-in.
    async fn oauth_authenticate(&self, provider: OAuthProvider) -> Result<Identity, AuthError>;

    /// Check a one-time password.
    async fn verify_otp(&self, code: &str) -> OtpDecision;
}
