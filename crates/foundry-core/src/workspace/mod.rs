//! Workspace service
//!
//! Every write goes through three stages:
//! 1. Validate the transition (pure, [`foundry_strategy`])
//! 2. Compute derived fields (pure, RICE)
//! 3. Persist through the injected [`EntityStore`]
//!
//! Operations are grouped per entity in the submodules; they all hang off
//! [`Workspace`].

mod insights;
mod objectives;
mod prds;
mod problems;
mod releases;
mod roadmap;
mod signals;

pub use objectives::OBJECTIVE_WEIGHT_RANGE;

use crate::ai::{GenerationError, InsightGenerator};
use crate::error::{FoundryError, Result};
use foundry_model::{EntityId, EntityKind, KindMismatch, Record};
use foundry_store::{EntityStore, StoreError, StoreExt};
use foundry_strategy::{build_graph, count_orphans, GraphSnapshot, OrphanCounts};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Product-management workspace over an entity store
pub struct Workspace<S> {
    /// Persistence collaborator
    store: S,
    /// AI collaborator, if configured
    generator: Option<Arc<dyn InsightGenerator>>,
}

impl<S: EntityStore> Workspace<S> {
    /// Workspace without an AI collaborator
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            generator: None,
        }
    }

    /// With AI collaborator
    #[inline]
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn InsightGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether AI flows are available
    #[inline]
    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Strategy graph over the current state
    ///
    /// # Errors
    /// Loading the dataset failed.
    pub async fn strategy_graph(&self) -> Result<GraphSnapshot> {
        let dataset = self.store.load_dataset().await?;
        debug!(records = dataset.len(), "building strategy graph");
        Ok(build_graph(&dataset))
    }

    /// Orphan totals over the current state
    ///
    /// # Errors
    /// Loading the dataset failed.
    pub async fn orphan_counts(&self) -> Result<OrphanCounts> {
        let dataset = self.store.load_dataset().await?;
        Ok(count_orphans(&dataset))
    }

    fn generator(&self) -> Result<&dyn InsightGenerator> {
        self.generator
            .as_deref()
            .ok_or(FoundryError::Generation(GenerationError::Unavailable))
    }

    /// Load a record that the operation cannot proceed without
    async fn require<T>(&self, kind: EntityKind, id: &EntityId) -> Result<T>
    where
        T: TryFrom<Record, Error = KindMismatch> + Send,
    {
        self.store
            .get::<T>(kind, id)
            .await?
            .ok_or_else(|| FoundryError::not_found(kind, id))
    }

    /// Insert and hand back the stored record
    async fn insert<T>(&self, record: T) -> Result<T>
    where
        T: Into<Record> + TryFrom<Record, Error = KindMismatch>,
    {
        let stored = self.store.insert(record.into()).await?;
        Ok(T::try_from(stored).map_err(StoreError::from)?)
    }
}

impl<S> fmt::Debug for Workspace<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("generator", &self.generator.is_some())
            .finish_non_exhaustive()
    }
}

/// Descending, with `None` after every value
fn descending_nulls_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Empty or whitespace-only text counts as absent
fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_sort_last() {
        let mut dates = vec![None, Some("2025-01-01"), Some("2025-06-01"), None];
        dates.sort_by(|a, b| descending_nulls_last(a.as_ref(), b.as_ref()));
        assert_eq!(dates, vec![Some("2025-06-01"), Some("2025-01-01"), None, None]);
    }

    #[test]
    fn blank_quotes_are_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("slow".into())), Some("slow".into()));
        assert_eq!(non_blank(None), None);
    }
}
