//! In-process profile store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::intake::Profile;
use crate::store::traits::ProfileStore;

/// Profiles held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, profile: Profile) -> Result<(), StoreError> {
        let replaced = self
            .profiles
            .write()
            .await
            .insert(user_id.to_string(), profile)
            .is_some();
        tracing::debug!(user_id, replaced, "Stored profile");
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.profiles.write().await.remove(user_id).is_some())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.profiles.read().await.len())
    }
}
