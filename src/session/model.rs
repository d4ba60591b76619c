//! Session and identity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Third-party sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    /// Parse a provider name from a path segment.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            "apple" => Some(Self::Apple),
            _ => None,
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

/// Who authenticated, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Username { value: String },
    Email { value: String },
    Oauth { provider: OAuthProvider, email: String },
}

impl Identity {
    pub fn username(value: impl Into<String>) -> Self {
        Self::Username {
            value: value.into(),
        }
    }

    pub fn email(value: impl Into<String>) -> Self {
        Self::Email {
            value: value.into(),
        }
    }

    pub fn oauth(provider: OAuthProvider, email: impl Into<String>) -> Self {
        Self::Oauth {
            provider,
            email: email.into(),
        }
    }

    /// Where the one-time password is sent.
    ///
    /// A username login carries the username itself as the target.
    pub fn display_email(&self) -> &str {
        match self {
            Self::Username { value } | Self::Email { value } => value,
            Self::Oauth { email, .. } => email,
        }
    }

    pub fn provider(&self) -> Option<OAuthProvider> {
        match self {
            Self::Oauth { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    /// Uppercase first letter for the avatar placeholder, `U` when unknown.
    pub fn avatar_initial(&self) -> char {
        self.display_email()
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }
}

/// Result of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    pub established_at: DateTime<Utc>,
    #[serde(default)]
    pub remember_password: bool,
}

impl Session {
    pub fn new(identity: Identity, remember_password: bool) -> Self {
        Self {
            identity,
            established_at: Utc::now(),
            remember_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_tagged_serde() {
        let json = serde_json::to_value(Identity::oauth(OAuthProvider::Apple, "user@icloud.com"))
            .unwrap();
        assert_eq!(json["kind"], "oauth");
        assert_eq!(json["provider"], "apple");
        assert_eq!(json["email"], "user@icloud.com");

        let parsed: Identity =
            serde_json::from_str(r#"{"kind":"username","value":"asha"}"#).unwrap();
        assert_eq!(parsed, Identity::username("asha"));
    }

    #[test]
    fn session_without_remember_flag_parses() {
        let parsed: Session = serde_json::from_str(
            r#"{"identity":{"kind":"email","value":"a@b.com"},"established_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(!parsed.remember_password);
        assert_eq!(parsed.identity.display_email(), "a@b.com");
    }

    #[test]
    fn avatar_initial() {
        assert_eq!(Identity::username("asha").avatar_initial(), 'A');
        assert_eq!(Identity::email("zed@x.io").avatar_initial(), 'Z');
        assert_eq!(Identity::username("").avatar_initial(), 'U');
        assert_eq!(
            Identity::oauth(OAuthProvider::Google, "user@gmail.com").avatar_initial(),
            'U'
        );
    }

    #[test]
    fn provider_parse() {
        assert_eq!(OAuthProvider::parse("Google"), Some(OAuthProvider::Google));
        assert_eq!(OAuthProvider::parse("apple"), Some(OAuthProvider::Apple));
        assert_eq!(OAuthProvider::parse("github"), None);
        assert_eq!(OAuthProvider::Google.to_string(), "google");
    }
}
