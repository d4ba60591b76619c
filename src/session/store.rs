//! SessionStore: typed view over the `session` record.

use std::sync::Arc;

use tracing::info;

use crate::error::StoreError;
use crate::store::{Store, keys, load, save};

use super::model::{Identity, Session};

/// Reads and writes the single session for this profile.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn Store>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Replace any prior session with a fresh one.
    pub async fn establish(
        &self,
        identity: Identity,
        remember_password: bool,
    ) -> Result<Session, StoreError> {
        let session = Session::new(identity, remember_password);
        save(self.store.as_ref(), keys::SESSION, &session).await?;
        info!(target_email = %session.identity.display_email(), "Session established");
        Ok(session)
    }

    pub async fn current(&self) -> Result<Option<Session>, StoreError> {
        load(self.store.as_ref(), keys::SESSION).await
    }

    /// Remove the session and the per-session profile photo.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.delete(keys::SESSION).await?;
        self.store.delete(keys::PROFILE_PHOTO).await?;
        info!("Session cleared");
        Ok(())
    }
}
