//! Error types for the onboarding core.

use crate::onboarding::state::FlowState;
use crate::validation::FieldErrors;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A single field failing validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field is empty")]
    EmptyField,

    #[error("email is not valid")]
    InvalidEmail,

    #[error("password does not meet all requirements")]
    WeakPassword,

    #[error("no image selected")]
    MissingImage,

    #[error("image could not be read")]
    InvalidImage,
}

/// Failures reported by an authentication backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Sign in failed")]
    RegistrationFailed,
}

/// Transient message shown to the user after a failed call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Errors returned by flow transitions. None of them change the current state.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Authentication failed: {}", .notice.title)]
    AuthenticationFailed { notice: Notice },

    #[error("OTP must have 5 digits")]
    InvalidOtp,

    #[error("Cannot {operation} from {from}")]
    InvalidTransition {
        from: FlowState,
        operation: &'static str,
    },

    #[error("Another transition is in progress")]
    Busy,

    #[error("No active session")]
    NotAuthenticated,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FlowError {
    /// The notice the view should display, if this error produces one.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::AuthenticationFailed { notice } => Some(notice.clone()),
            Self::InvalidOtp => Some(Notice::new("Invalid OTP", "Please enter all 5 digits")),
            _ => None,
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
