//! Persistence layer: key/value records for session, draft, photo and flow position.

pub mod libsql_backend;
pub mod memory;
pub(crate) mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::{Store, load, save};

/// Record keys.
pub mod keys {
    /// Session JSON.
    pub const SESSION: &str = "session";
    /// DraftProfile JSON, photo excluded.
    pub const ONBOARDING_DRAFT: &str = "onboardingDraft";
    /// Profile photo data URI.
    pub const PROFILE_PHOTO: &str = "profilePhoto";
    /// Current FlowState.
    pub const FLOW_STATE: &str = "flowState";
    /// Default profile (one logical session per browser profile).
    pub const DEFAULT_PROFILE: &str = "default";
}
