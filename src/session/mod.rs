//! Session: the authenticated-identity record.

pub mod model;
pub mod store;

pub use model::{Identity, OAuthProvider, Session};
pub use store::SessionStore;
