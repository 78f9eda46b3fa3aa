//! `ProfileStore` trait: the single async interface for profile persistence.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::intake::Profile;

/// Keyed storage of completed profiles, one per user.
///
/// `put` replaces any earlier profile for the same user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get the stored profile for a user.
    async fn get(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    /// Insert or replace a user's profile.
    async fn put(&self, user_id: &str, profile: Profile) -> Result<(), StoreError>;

    /// Remove a user's profile. Returns whether one existed.
    async fn delete(&self, user_id: &str) -> Result<bool, StoreError>;

    /// Number of stored profiles.
    async fn count(&self) -> Result<usize, StoreError>;
}
