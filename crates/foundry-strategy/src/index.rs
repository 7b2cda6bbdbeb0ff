//! Justification index
//!
//! One pass over a [`Dataset`] produces per-item link facts and the
//! id → parent lookup every rule needs. Both the status gate and the graph
//! evaluate [`JustificationIndex::missing_commit_requirements`], so a
//! transition the gate allows can never leave the item flagged as an orphan.
//!
//! Ancestor lookups are bounded to two hops (feature → epic → initiative).
//! A dangling or cyclic `parent_id` simply contributes nothing.

use crate::requirement::Requirement;
use foundry_model::{Dataset, EntityId, ProblemStatus, RoadmapItem, RoadmapItemType};
use std::collections::{HashMap, HashSet};

/// Link facts for one roadmap item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkFacts {
    /// Objective links
    pub objectives: usize,
    /// Problem links, any problem status
    pub problems: usize,
    /// Problem links whose problem is accepted
    pub accepted_problems: usize,
}

/// Position of an item in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub item_type: RoadmapItemType,
    pub parent_id: Option<EntityId>,
}

/// Pre-loaded hierarchy and link facts
#[derive(Debug, Clone, Default)]
pub struct JustificationIndex {
    hierarchy: HashMap<EntityId, HierarchyEntry>,
    item_links: HashMap<EntityId, LinkFacts>,
    problem_links: HashMap<EntityId, usize>,
}

impl JustificationIndex {
    /// Index every roadmap item and link in `dataset`
    #[must_use]
    pub fn build(dataset: &Dataset) -> Self {
        let accepted: HashSet<&EntityId> = dataset
            .problems
            .iter()
            .filter(|p| p.status == ProblemStatus::Accepted)
            .map(|p| &p.id)
            .collect();

        let hierarchy = dataset
            .roadmap_items
            .iter()
            .map(|item| {
                let entry = HierarchyEntry {
                    item_type: item.item_type,
                    parent_id: item.parent_id.clone(),
                };
                (item.id.clone(), entry)
            })
            .collect();

        let mut item_links: HashMap<EntityId, LinkFacts> = HashMap::new();
        let mut problem_links: HashMap<EntityId, usize> = HashMap::new();
        for link in &dataset.roadmap_item_problems {
            let facts = item_links.entry(link.roadmap_item_id.clone()).or_default();
            facts.problems += 1;
            if accepted.contains(&link.problem_id) {
                facts.accepted_problems += 1;
            }
            *problem_links.entry(link.problem_id.clone()).or_default() += 1;
        }
        for link in &dataset.roadmap_item_objectives {
            item_links
                .entry(link.roadmap_item_id.clone())
                .or_default()
                .objectives += 1;
        }

        Self {
            hierarchy,
            item_links,
            problem_links,
        }
    }

    /// Link facts for an item; zero when it has no links
    #[must_use]
    pub fn links(&self, item_id: &EntityId) -> LinkFacts {
        self.item_links.get(item_id).copied().unwrap_or_default()
    }

    /// Hierarchy entry for an indexed item
    #[must_use]
    pub fn entry(&self, item_id: &EntityId) -> Option<&HierarchyEntry> {
        self.hierarchy.get(item_id)
    }

    /// Number of roadmap item links on a problem
    #[must_use]
    pub fn roadmap_links_for_problem(&self, problem_id: &EntityId) -> usize {
        self.problem_links.get(problem_id).copied().unwrap_or(0)
    }

    /// Whether an item has its own accepted problem link
    #[inline]
    #[must_use]
    pub fn has_direct_accepted_problem(&self, item_id: &EntityId) -> bool {
        self.links(item_id).accepted_problems > 0
    }

    /// Parent recorded for an indexed item
    fn parent_of(&self, item_id: &EntityId) -> Option<&EntityId> {
        self.hierarchy.get(item_id)?.parent_id.as_ref()
    }

    /// Accepted problem on the item itself or on up to `hops` ancestors
    /// starting at `parent_id`
    fn accepted_within(&self, item_id: &EntityId, parent_id: Option<&EntityId>, hops: usize) -> bool {
        if self.has_direct_accepted_problem(item_id) {
            return true;
        }
        let mut ancestor = parent_id;
        for _ in 0..hops {
            let Some(id) = ancestor else { return false };
            if self.has_direct_accepted_problem(id) {
                return true;
            }
            ancestor = self.parent_of(id);
        }
        false
    }

    /// Requirements an item of `item_type` under `parent_id` lacks to be committed
    ///
    /// Type and parent are passed separately so a pending change can be
    /// evaluated against stored links. Requirements are reported in rule
    /// order and never short-circuit.
    #[must_use]
    pub fn missing_commit_requirements(
        &self,
        item_id: &EntityId,
        item_type: RoadmapItemType,
        parent_id: Option<&EntityId>,
    ) -> Vec<Requirement> {
        let mut missing = Vec::new();
        match item_type {
            RoadmapItemType::Initiative => {
                if self.links(item_id).objectives == 0 {
                    missing.push(Requirement::Objective);
                }
                if !self.accepted_within(item_id, None, 0) {
                    missing.push(Requirement::AcceptedProblem);
                }
            }
            RoadmapItemType::Epic => {
                if parent_id.is_none() {
                    missing.push(Requirement::ParentInitiative);
                }
                if !self.accepted_within(item_id, parent_id, 1) {
                    missing.push(Requirement::AcceptedProblem);
                }
            }
            RoadmapItemType::Feature => {
                if parent_id.is_none() {
                    missing.push(Requirement::ParentEpic);
                }
                if !self.accepted_within(item_id, parent_id, 2) {
                    missing.push(Requirement::AcceptedProblem);
                }
            }
        }
        missing
    }

    /// [`Self::missing_commit_requirements`] for a stored item
    #[must_use]
    pub fn missing_for(&self, item: &RoadmapItem) -> Vec<Requirement> {
        self.missing_commit_requirements(&item.id, item.item_type, item.parent_id.as_ref())
    }

    /// Whether an item's status claims more than its links support
    #[must_use]
    pub fn is_orphan_item(&self, item: &RoadmapItem) -> bool {
        item.status.claims_commitment() && !self.missing_for(item).is_empty()
    }

    /// Whether an accepted problem has nothing on the roadmap pointing at it
    #[must_use]
    pub fn is_orphan_problem(&self, problem_id: &EntityId, status: ProblemStatus) -> bool {
        status == ProblemStatus::Accepted && self.roadmap_links_for_problem(problem_id) == 0
    }
}
