//! DraftStore: durable accumulator of onboarding answers.

use std::sync::Arc;

use tracing::debug;

use crate::error::StoreError;
use crate::store::{Store, keys, load, save};

use super::model::{DraftPatch, DraftProfile, ProfilePhoto};

/// Typed view over the `onboardingDraft` and `profilePhoto` records.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn Store>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Merge the provided keys into the stored draft.
    pub async fn merge_fields(&self, patch: DraftPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut draft = self.read_fields().await?;
        let photo = patch.photo_data.clone();
        patch.apply_to(&mut draft);

        save(self.store.as_ref(), keys::ONBOARDING_DRAFT, &draft).await?;
        if let Some(photo) = photo {
            save(self.store.as_ref(), keys::PROFILE_PHOTO, &photo).await?;
        }
        debug!(draft = ?draft, "Draft merged");
        Ok(())
    }

    /// Current draft with the photo joined in.
    pub async fn read(&self) -> Result<DraftProfile, StoreError> {
        let mut draft = self.read_fields().await?;
        draft.photo_data = load::<ProfilePhoto>(self.store.as_ref(), keys::PROFILE_PHOTO).await?;
        Ok(draft)
    }

    /// Discard the draft and its photo.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.delete(keys::ONBOARDING_DRAFT).await?;
        self.store.delete(keys::PROFILE_PHOTO).await?;
        debug!("Draft reset");
        Ok(())
    }

    async fn read_fields(&self) -> Result<DraftProfile, StoreError> {
        Ok(load(self.store.as_ref(), keys::ONBOARDING_DRAFT)
            .await?
            .unwrap_or_default())
    }
}
