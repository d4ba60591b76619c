//! Timed mock backend: stands in for a real auth server.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::AuthError;
use crate::session::{Identity, OAuthProvider};

use super::backend::{AuthBackend, OTP_LENGTH, OtpDecision};

/// Default delay for credential and OTP calls.
pub const DEFAULT_CREDENTIAL_LATENCY: Duration = Duration::from_millis(800);
/// Default delay for OAuth calls.
pub const DEFAULT_OAUTH_LATENCY: Duration = Duration::from_millis(1000);

/// Sleeps for a fixed latency, then resolves.
#[derive(Debug, Clone)]
pub struct MockAuthBackend {
    credential_latency: Duration,
    oauth_latency: Duration,
}

impl MockAuthBackend {
    pub fn new(credential_latency: Duration, oauth_latency: Duration) -> Self {
        Self {
            credential_latency,
            oauth_latency,
        }
    }

    /// No artificial delay.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    async fn delay(latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL_LATENCY, DEFAULT_OAUTH_LATENCY)
    }
}

/// Fixed identity each provider hands back.
fn provider_email(provider: OAuthProvider) -> &'static str {
    match provider {
        OAuthProvider::Google => "user@gmail.com",
        OAuthProvider::Apple => "user@icloud.com",
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn authenticate(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<Identity, AuthError> {
        Self::delay(self.credential_latency).await;
        debug!(identifier, "Mock authenticate");
        if identifier.is_empty() || secret.expose_secret().is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Identity::username(identifier))
    }

    async fn register(&self, email: &str, secret: &SecretString) -> Result<Identity, AuthError> {
        Self::delay(self.credential_latency).await;
        debug!(email, "Mock register");
        if email.is_empty() || secret.expose_secret().is_empty() {
            return Err(AuthError::RegistrationFailed);
        }
        Ok(Identity::email(email))
    }

    async fn oauth_authenticate(&self, provider: OAuthProvider) -> Result<Identity, AuthError> {
        Self::delay(self.oauth_latency).await;
        debug!(%provider, "Mock OAuth");
        Ok(Identity::oauth(provider, provider_email(provider)))
    }

    async fn verify_otp(&self, code: &str) -> OtpDecision {
        Self::delay(self.credential_latency).await;
        if code.len() == OTP_LENGTH && code.chars().all(|c| c.is_ascii_digit()) {
            OtpDecision::Accepted
        } else {
            OtpDecision::Rejected
        }
    }
}
