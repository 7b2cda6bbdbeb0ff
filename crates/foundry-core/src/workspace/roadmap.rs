//! Roadmap items: scoring, hierarchy links, and the commit gate

use super::Workspace;
use crate::error::{FoundryError, Result};
use foundry_model::{
    EntityId, EntityKind, Patch, RiceInputs, RoadmapItem, RoadmapItemObjective, RoadmapItemPatch,
    RoadmapItemProblem, RoadmapStatus, RICE_MAX, RICE_MIN,
};
use foundry_store::{EntityStore, Filter, RoadmapItemWithLinks, StoreExt};
use foundry_strategy::{
    check_roadmap_transition, requires_commit_check, GatingResult, JustificationIndex,
};
use tracing::{debug, info, warn};

/// Reject present inputs outside the RICE range
fn check_rice(inputs: &RiceInputs) -> Result<()> {
    let fields = [
        ("reach", inputs.reach),
        ("impact", inputs.impact),
        ("confidence", inputs.confidence),
        ("effort", inputs.effort),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            if !(RICE_MIN..=RICE_MAX).contains(&value) {
                return Err(FoundryError::InvalidInput(format!(
                    "{name} must be between {RICE_MIN} and {RICE_MAX}, got {value}"
                )));
            }
        }
    }
    Ok(())
}

impl<S: EntityStore> Workspace<S> {
    /// Create a roadmap item with its derived score
    ///
    /// # Errors
    /// RICE input out of range, or the store rejected the insert.
    pub async fn create_roadmap_item(&self, mut item: RoadmapItem) -> Result<RoadmapItem> {
        let inputs = item.rice();
        check_rice(&inputs)?;
        item.score = inputs.score();
        let item = self.insert(item).await?;
        info!(
            item = %item.id,
            item_type = %item.item_type,
            score = ?item.score,
            "roadmap item created"
        );
        Ok(item)
    }

    /// All roadmap items, highest score first, unscored last
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_roadmap_items(&self) -> Result<Vec<RoadmapItem>> {
        let mut items = self
            .store
            .find_as::<RoadmapItem>(EntityKind::RoadmapItem, &Filter::All)
            .await?;
        items.sort_by(|a, b| match (a.score, b.score) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(items)
    }

    /// Roadmap item with parent, children, problems and objectives
    ///
    /// # Errors
    /// Store read failed.
    pub async fn roadmap_item(&self, id: &EntityId) -> Result<Option<RoadmapItemWithLinks>> {
        Ok(self.store.roadmap_item_with_links(id).await?)
    }

    /// Gated partial update with score recomputation
    ///
    /// Moving to `committed` from any other status is checked against the
    /// stored links, using the patched type and parent when present. The
    /// score is recomputed from stored inputs overlaid with patched ones. A
    /// blocked transition writes nothing; a missing id succeeds without
    /// writing.
    ///
    /// # Errors
    /// RICE input out of range, or a store read or write failed.
    pub async fn update_roadmap_item(
        &self,
        id: &EntityId,
        mut patch: RoadmapItemPatch,
    ) -> Result<GatingResult> {
        let Some(existing) = self
            .store
            .get::<RoadmapItem>(EntityKind::RoadmapItem, id)
            .await?
        else {
            debug!(item = %id, "update of missing roadmap item ignored");
            return Ok(GatingResult::Success);
        };

        if let Some(target) = patch.status {
            let result = self.check_commit(&existing, &patch, target).await?;
            if let GatingResult::Blocked(failure) = &result {
                warn!(
                    item = %id,
                    item_type = %existing.item_type,
                    from = %existing.status,
                    to = %target,
                    missing = ?failure.codes(),
                    "roadmap transition blocked"
                );
                return Ok(result);
            }
        }

        let update = patch.rice();
        check_rice(&update)?;
        patch.score = Some(existing.rice().merged(update).score());

        let status = patch.status;
        self.store
            .update(EntityKind::RoadmapItem, id, Patch::RoadmapItem(patch))
            .await?;
        match status {
            Some(to) if to != existing.status => {
                info!(item = %id, from = %existing.status, %to, "roadmap status changed");
            }
            _ => debug!(item = %id, "roadmap item updated"),
        }
        Ok(GatingResult::Success)
    }

    /// Gate `existing` moving to `target` with the pending type and parent
    async fn check_commit(
        &self,
        existing: &RoadmapItem,
        patch: &RoadmapItemPatch,
        target: RoadmapStatus,
    ) -> Result<GatingResult> {
        if !requires_commit_check(existing.status, target) {
            return Ok(GatingResult::Success);
        }
        let mut pending = existing.clone();
        if let Some(item_type) = patch.item_type {
            pending.item_type = item_type;
        }
        if let Some(parent_id) = &patch.parent_id {
            pending.parent_id.clone_from(parent_id);
        }
        let hierarchy = self.store.hierarchy_for(pending.clone()).await?;
        debug!(
            item = %pending.id,
            members = hierarchy.roadmap_items.len(),
            problems = hierarchy.problems.len(),
            "hierarchy loaded for commit check"
        );
        let index = JustificationIndex::build(&hierarchy);
        Ok(check_roadmap_transition(
            &index,
            &pending,
            existing.status,
            target,
        ))
    }

    /// Delete an item, its links, and its PRD references
    ///
    /// Children keep their `parent_id`; the graph reports them as orphans
    /// if they relied on this item.
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_roadmap_item(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::RoadmapItem, id).await?;
        info!(item = %id, "roadmap item deleted");
        Ok(())
    }

    /// Justify an item with a problem
    ///
    /// # Errors
    /// Either end is missing, or the store write failed.
    pub async fn link_problem_to_roadmap_item(
        &self,
        item_id: &EntityId,
        problem_id: &EntityId,
    ) -> Result<RoadmapItemProblem> {
        let link = self
            .insert(RoadmapItemProblem::new(item_id.clone(), problem_id.clone()))
            .await?;
        info!(item = %item_id, problem = %problem_id, "problem linked");
        Ok(link)
    }

    /// Remove one item/problem link
    ///
    /// # Errors
    /// Store write failed.
    pub async fn unlink_problem_from_roadmap_item(&self, link_id: &EntityId) -> Result<()> {
        self.store
            .delete(EntityKind::RoadmapItemProblem, link_id)
            .await?;
        debug!(link = %link_id, "problem unlinked");
        Ok(())
    }

    /// Align an item with an objective
    ///
    /// # Errors
    /// Impact outside the RICE range, either end missing, or the store
    /// write failed.
    pub async fn link_objective_to_roadmap_item(
        &self,
        item_id: &EntityId,
        objective_id: &EntityId,
        impact: Option<u8>,
    ) -> Result<RoadmapItemObjective> {
        if let Some(value) = impact {
            if !(RICE_MIN..=RICE_MAX).contains(&value) {
                return Err(FoundryError::InvalidInput(format!(
                    "impact to objective must be between {RICE_MIN} and {RICE_MAX}, got {value}"
                )));
            }
        }
        let link = self
            .insert(RoadmapItemObjective::new(
                item_id.clone(),
                objective_id.clone(),
                impact,
            ))
            .await?;
        info!(item = %item_id, objective = %objective_id, "objective linked");
        Ok(link)
    }

    /// Remove one item/objective link
    ///
    /// # Errors
    /// Store write failed.
    pub async fn unlink_objective_from_roadmap_item(&self, link_id: &EntityId) -> Result<()> {
        self.store
            .delete(EntityKind::RoadmapItemObjective, link_id)
            .await?;
        debug!(link = %link_id, "objective unlinked");
        Ok(())
    }

    /// Apply RICE inputs a human accepted from a suggestion
    ///
    /// Inputs are clamped into the RICE range; absent ones keep their
    /// stored value. Returns the new score.
    ///
    /// # Errors
    /// [`FoundryError::NotFound`] for an unknown item, or the store write
    /// failed.
    pub async fn apply_score_suggestion(
        &self,
        item_id: &EntityId,
        inputs: RiceInputs,
    ) -> Result<Option<f64>> {
        let existing: RoadmapItem = self.require(EntityKind::RoadmapItem, item_id).await?;
        let inputs = inputs.clamped();
        let score = existing.rice().merged(inputs).score();
        let patch = RoadmapItemPatch {
            reach: inputs.reach,
            impact: inputs.impact,
            confidence: inputs.confidence,
            effort: inputs.effort,
            score: Some(score),
            ..RoadmapItemPatch::default()
        };
        self.store
            .update(EntityKind::RoadmapItem, item_id, Patch::RoadmapItem(patch))
            .await?;
        info!(item = %item_id, score = ?score, "score suggestion applied");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::{Objective, Problem, ProblemStatus, RoadmapItemType};
    use foundry_store::MemoryStore;
    use foundry_strategy::Requirement;

    fn workspace() -> Workspace<MemoryStore> {
        Workspace::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn score_is_derived_on_create() {
        let ws = workspace();
        let item = RoadmapItem::new("Export", RoadmapItemType::Feature)
            .with_rice(RiceInputs::new(8, 5, 7, 3));
        let stored = ws.create_roadmap_item(item).await.unwrap();
        assert_eq!(stored.score, Some(93.3));

        let unscored = ws
            .create_roadmap_item(RoadmapItem::new("Later", RoadmapItemType::Feature))
            .await
            .unwrap();
        assert_eq!(unscored.score, None);
    }

    #[tokio::test]
    async fn out_of_range_inputs_are_rejected() {
        let ws = workspace();
        let item = RoadmapItem::new("Export", RoadmapItemType::Feature)
            .with_rice(RiceInputs::new(11, 5, 7, 3));
        let err = ws.create_roadmap_item(item).await.unwrap_err();
        assert!(matches!(err, FoundryError::InvalidInput(ref m) if m.starts_with("reach")));
    }

    #[tokio::test]
    async fn update_merges_inputs_into_score() {
        let ws = workspace();
        let item = RoadmapItem::new("Export", RoadmapItemType::Feature)
            .with_id("f1")
            .with_rice(RiceInputs::new(8, 5, 7, 3));
        ws.create_roadmap_item(item).await.unwrap();

        let patch = RoadmapItemPatch {
            effort: Some(7),
            ..RoadmapItemPatch::default()
        };
        assert!(ws.update_roadmap_item(&"f1".into(), patch).await.unwrap().is_success());
        let stored = ws.roadmap_item(&"f1".into()).await.unwrap().unwrap().item;
        assert_eq!(stored.effort, Some(7));
        assert_eq!(stored.score, Some(40.0));
    }

    #[tokio::test]
    async fn items_list_by_score_with_unscored_last() {
        let ws = workspace();
        for (id, rice) in [
            ("low", Some(RiceInputs::new(1, 1, 1, 10))),
            ("none", None),
            ("high", Some(RiceInputs::new(10, 10, 10, 1))),
        ] {
            let mut item = RoadmapItem::new(id, RoadmapItemType::Feature).with_id(id);
            if let Some(rice) = rice {
                item = item.with_rice(rice);
            }
            ws.create_roadmap_item(item).await.unwrap();
        }
        let ids: Vec<_> = ws
            .list_roadmap_items()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id.to_string())
            .collect();
        assert_eq!(ids, ["high", "low", "none"]);
    }

    #[tokio::test]
    async fn initiative_commit_walkthrough() {
        let ws = workspace();
        let id = EntityId::from("i1");
        ws.create_roadmap_item(RoadmapItem::new("Reliability", RoadmapItemType::Initiative).with_id("i1"))
            .await
            .unwrap();

        let result = ws
            .update_roadmap_item(&id, RoadmapItemPatch::status(RoadmapStatus::Committed))
            .await
            .unwrap();
        assert_eq!(
            result.missing(),
            [Requirement::Objective, Requirement::AcceptedProblem]
        );

        ws.create_objective(Objective::new("Retention").with_id("o1"))
            .await
            .unwrap();
        ws.create_problem(Problem::new("Exports", "fail").with_id("p1"))
            .await
            .unwrap();
        ws.link_objective_to_roadmap_item(&id, &"o1".into(), Some(8))
            .await
            .unwrap();
        ws.link_problem_to_roadmap_item(&id, &"p1".into()).await.unwrap();

        let result = ws
            .update_roadmap_item(&id, RoadmapItemPatch::status(RoadmapStatus::Committed))
            .await
            .unwrap();
        assert_eq!(result.missing(), [Requirement::AcceptedProblem]);

        assert!(ws
            .update_problem(
                &"p1".into(),
                foundry_model::ProblemPatch::status(ProblemStatus::Accepted)
            )
            .await
            .unwrap()
            .is_success());
        let result = ws
            .update_roadmap_item(&id, RoadmapItemPatch::status(RoadmapStatus::Committed))
            .await
            .unwrap();
        assert!(result.is_success());
        let stored = ws.roadmap_item(&id).await.unwrap().unwrap().item;
        assert_eq!(stored.status, RoadmapStatus::Committed);
    }

    #[tokio::test]
    async fn pending_parent_is_used_by_the_gate() {
        let ws = workspace();
        ws.create_roadmap_item(RoadmapItem::new("Platform", RoadmapItemType::Initiative).with_id("i1"))
            .await
            .unwrap();
        ws.create_problem(Problem::new("Exports", "fail").with_id("p1"))
            .await
            .unwrap();
        ws.link_problem_to_roadmap_item(&"i1".into(), &"p1".into())
            .await
            .unwrap();
        ws.update_problem(
            &"p1".into(),
            foundry_model::ProblemPatch::status(ProblemStatus::Accepted),
        )
        .await
        .unwrap();
        ws.create_roadmap_item(RoadmapItem::new("Export epic", RoadmapItemType::Epic).with_id("e1"))
            .await
            .unwrap();

        let patch = RoadmapItemPatch {
            status: Some(RoadmapStatus::Committed),
            parent_id: Some(Some("i1".into())),
            ..RoadmapItemPatch::default()
        };
        let result = ws.update_roadmap_item(&"e1".into(), patch).await.unwrap();
        assert!(result.is_success());
        let stored = ws.roadmap_item(&"e1".into()).await.unwrap().unwrap().item;
        assert_eq!(stored.parent_id, Some("i1".into()));
        assert_eq!(stored.status, RoadmapStatus::Committed);
    }

    #[tokio::test]
    async fn committed_items_are_not_revalidated() {
        let ws = workspace();
        let item = RoadmapItem::new("Legacy", RoadmapItemType::Feature)
            .with_id("f1")
            .with_status(RoadmapStatus::Committed);
        ws.create_roadmap_item(item).await.unwrap();
        let result = ws
            .update_roadmap_item(&"f1".into(), RoadmapItemPatch::status(RoadmapStatus::Committed))
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn suggestion_inputs_are_clamped() {
        let ws = workspace();
        ws.create_roadmap_item(RoadmapItem::new("Export", RoadmapItemType::Feature).with_id("f1"))
            .await
            .unwrap();
        let score = ws
            .apply_score_suggestion(&"f1".into(), RiceInputs::new(0, 12, 5, 2))
            .await
            .unwrap();
        assert_eq!(score, Some(25.0));
        let stored = ws.roadmap_item(&"f1".into()).await.unwrap().unwrap().item;
        assert_eq!(stored.reach, Some(1));
        assert_eq!(stored.impact, Some(10));

        let err = ws
            .apply_score_suggestion(&"missing".into(), RiceInputs::new(1, 1, 1, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
