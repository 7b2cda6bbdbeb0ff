//! Entity store trait
//!
//! The store is the only effectful collaborator of the strategy engine. It
//! exposes four operations over tagged [`Record`]s plus a whole-workspace
//! read; typed helpers live in [`crate::StoreExt`].

use crate::error::StoreError;
use crate::filter::Filter;
use foundry_model::{Dataset, EntityId, EntityKind, Patch, Record};
use std::sync::Arc;

/// Persistence collaborator
///
/// Implementations must:
/// - reject duplicate ids and dangling references on insert
/// - treat update and delete of a missing id as a no-op
/// - stamp `updated_at` on update
/// - cascade deletes to junction rows and detach nullable references
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Records of `kind` selected by `filter`, in insertion order
    async fn find(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError>;

    /// Store a new record and return it as stored
    async fn insert(&self, record: Record) -> Result<Record, StoreError>;

    /// Apply a partial update to the record with `id`
    async fn update(&self, kind: EntityKind, id: &EntityId, patch: Patch)
        -> Result<(), StoreError>;

    /// Remove the record with `id` and everything that depends on it
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), StoreError>;

    /// Every record of every kind, read as one consistent view
    ///
    /// No write may land partway through the read.
    async fn load_dataset(&self) -> Result<Dataset, StoreError>;
}

#[async_trait::async_trait]
impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    async fn find(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        (**self).find(kind, filter).await
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        (**self).insert(record).await
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: Patch,
    ) -> Result<(), StoreError> {
        (**self).update(kind, id, patch).await
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), StoreError> {
        (**self).delete(kind, id).await
    }

    async fn load_dataset(&self) -> Result<Dataset, StoreError> {
        (**self).load_dataset().await
    }
}
