//! Problems, their evidence links, and the acceptance gate

use super::{non_blank, Workspace};
use crate::error::Result;
use foundry_model::{
    Dataset, EntityId, EntityKind, Patch, Problem, ProblemPatch, ProblemStatus, RoadmapItemProblem,
    SignalProblem,
};
use foundry_store::{EntityStore, Filter, ProblemWithLinks, StoreExt};
use foundry_strategy::{check_problem_transition, GatingResult, JustificationIndex};
use tracing::{debug, info, warn};

impl<S: EntityStore> Workspace<S> {
    /// Create a problem; always starts as `draft`
    ///
    /// # Errors
    /// The store rejected the insert.
    pub async fn create_problem(&self, mut problem: Problem) -> Result<Problem> {
        problem.status = ProblemStatus::Draft;
        let problem = self.insert(problem).await?;
        info!(problem = %problem.id, "problem created");
        Ok(problem)
    }

    /// All problems, newest first
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_problems(&self) -> Result<Vec<Problem>> {
        let mut problems = self
            .store
            .find_as::<Problem>(EntityKind::Problem, &Filter::All)
            .await?;
        problems.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(problems)
    }

    /// Problem with its signals and roadmap items
    ///
    /// # Errors
    /// Store read failed.
    pub async fn problem(&self, id: &EntityId) -> Result<Option<ProblemWithLinks>> {
        Ok(self.store.problem_with_links(id).await?)
    }

    /// Gated partial update
    ///
    /// Moving to `accepted` needs at least one roadmap item link. A blocked
    /// transition writes nothing, including the other patched fields. A
    /// missing id succeeds without writing.
    ///
    /// # Errors
    /// Store read or write failed.
    pub async fn update_problem(&self, id: &EntityId, patch: ProblemPatch) -> Result<GatingResult> {
        let Some(existing) = self.store.get::<Problem>(EntityKind::Problem, id).await? else {
            debug!(problem = %id, "update of missing problem ignored");
            return Ok(GatingResult::Success);
        };

        if let Some(target) = patch.status {
            let links = self
                .store
                .find_as::<RoadmapItemProblem>(
                    EntityKind::RoadmapItemProblem,
                    &Filter::Problem(id.clone()),
                )
                .await?;
            let index = JustificationIndex::build(&Dataset {
                roadmap_item_problems: links,
                ..Dataset::default()
            });
            let result = check_problem_transition(&index, id, target);
            if let GatingResult::Blocked(failure) = &result {
                warn!(
                    problem = %id,
                    from = %existing.status,
                    to = %target,
                    missing = ?failure.codes(),
                    "problem transition blocked"
                );
                return Ok(result);
            }
        }

        let status = patch.status;
        self.store
            .update(EntityKind::Problem, id, Patch::Problem(patch))
            .await?;
        match status {
            Some(to) if to != existing.status => {
                info!(problem = %id, from = %existing.status, %to, "problem status changed");
            }
            _ => debug!(problem = %id, "problem updated"),
        }
        Ok(GatingResult::Success)
    }

    /// Delete a problem and every link to it
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_problem(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Problem, id).await?;
        info!(problem = %id, "problem deleted");
        Ok(())
    }

    /// Record a signal as evidence for a problem
    ///
    /// A blank quote is stored as no quote.
    ///
    /// # Errors
    /// Either end is missing, or the store write failed.
    pub async fn link_signal_to_problem(
        &self,
        problem_id: &EntityId,
        signal_id: &EntityId,
        quote: Option<String>,
    ) -> Result<SignalProblem> {
        let link = SignalProblem::new(signal_id.clone(), problem_id.clone(), non_blank(quote));
        let link = self.insert(link).await?;
        info!(problem = %problem_id, signal = %signal_id, "signal linked");
        Ok(link)
    }

    /// Remove one signal/problem link
    ///
    /// # Errors
    /// Store write failed.
    pub async fn unlink_signal_from_problem(&self, link_id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::SignalProblem, link_id).await?;
        debug!(link = %link_id, "signal unlinked");
        Ok(())
    }
}
