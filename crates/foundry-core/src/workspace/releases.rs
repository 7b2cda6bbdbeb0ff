//! Releases and item scheduling

use super::{descending_nulls_last, Workspace};
use crate::error::Result;
use foundry_model::{EntityId, EntityKind, Patch, Release, ReleasePatch, RoadmapItemPatch};
use foundry_store::{EntityStore, Filter, StoreExt};
use tracing::info;

impl<S: EntityStore> Workspace<S> {
    /// Create a release
    ///
    /// # Errors
    /// The store rejected the insert.
    pub async fn create_release(&self, release: Release) -> Result<Release> {
        let release = self.insert(release).await?;
        info!(release = %release.id, name = %release.name, "release created");
        Ok(release)
    }

    /// All releases, latest target date first, undated last
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        let mut releases = self
            .store
            .find_as::<Release>(EntityKind::Release, &Filter::All)
            .await?;
        releases.sort_by(|a, b| descending_nulls_last(a.target_date.as_ref(), b.target_date.as_ref()));
        Ok(releases)
    }

    /// Partial update
    ///
    /// # Errors
    /// Store write failed.
    pub async fn update_release(&self, id: &EntityId, patch: ReleasePatch) -> Result<()> {
        self.store
            .update(EntityKind::Release, id, Patch::Release(patch))
            .await?;
        Ok(())
    }

    /// Delete a release; its items become unscheduled
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_release(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Release, id).await?;
        info!(release = %id, "release deleted");
        Ok(())
    }

    /// Schedule an item into a release, or unschedule it with `None`
    ///
    /// # Errors
    /// The release does not exist, or the store write failed.
    pub async fn assign_item_to_release(
        &self,
        item_id: &EntityId,
        release_id: Option<&EntityId>,
    ) -> Result<()> {
        let patch = RoadmapItemPatch {
            release_id: Some(release_id.cloned()),
            ..RoadmapItemPatch::default()
        };
        self.store
            .update(EntityKind::RoadmapItem, item_id, Patch::RoadmapItem(patch))
            .await?;
        info!(item = %item_id, release = ?release_id.map(EntityId::as_str), "item scheduled");
        Ok(())
    }
}
