//! Strategic objectives

use super::Workspace;
use crate::error::{FoundryError, Result};
use foundry_model::{EntityId, EntityKind, Objective, ObjectivePatch, Patch};
use foundry_store::{EntityStore, Filter, StoreExt};
use tracing::info;

/// Accepted objective weight range
pub const OBJECTIVE_WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 0.1..=10.0;

fn check_weight(weight: f64) -> Result<()> {
    if OBJECTIVE_WEIGHT_RANGE.contains(&weight) {
        Ok(())
    } else {
        Err(FoundryError::InvalidInput(format!(
            "objective weight {weight} outside {}..={}",
            OBJECTIVE_WEIGHT_RANGE.start(),
            OBJECTIVE_WEIGHT_RANGE.end()
        )))
    }
}

impl<S: EntityStore> Workspace<S> {
    /// Create an objective
    ///
    /// # Errors
    /// Weight outside [`OBJECTIVE_WEIGHT_RANGE`], or the store rejected the insert.
    pub async fn create_objective(&self, objective: Objective) -> Result<Objective> {
        check_weight(objective.weight)?;
        let objective = self.insert(objective).await?;
        info!(objective = %objective.id, weight = objective.weight, "objective created");
        Ok(objective)
    }

    /// All objectives, newest first
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_objectives(&self) -> Result<Vec<Objective>> {
        let mut objectives = self
            .store
            .find_as::<Objective>(EntityKind::Objective, &Filter::All)
            .await?;
        objectives.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(objectives)
    }

    /// Partial update
    ///
    /// # Errors
    /// Weight outside [`OBJECTIVE_WEIGHT_RANGE`], or the store write failed.
    pub async fn update_objective(&self, id: &EntityId, patch: ObjectivePatch) -> Result<()> {
        if let Some(weight) = patch.weight {
            check_weight(weight)?;
        }
        self.store
            .update(EntityKind::Objective, id, Patch::Objective(patch))
            .await?;
        Ok(())
    }

    /// Delete an objective and its roadmap links
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_objective(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Objective, id).await?;
        info!(objective = %id, "objective deleted");
        Ok(())
    }
}
