//! Orphan Counter
//!
//! Dashboard totals computed with the graph's predicates, without building
//! labels, metadata or edges.

use crate::graph::{GraphSnapshot, NodeType};
use crate::index::JustificationIndex;
use foundry_model::{Dataset, RoadmapItemType};
use serde::{Deserialize, Serialize};

/// Orphans per node type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanCounts {
    pub problems: usize,
    pub initiatives: usize,
    pub epics: usize,
    pub features: usize,
}

impl OrphanCounts {
    /// Sum over all types
    #[must_use]
    pub fn total(&self) -> usize {
        self.problems + self.initiatives + self.epics + self.features
    }

    /// Group the orphan flags of an already built graph
    #[must_use]
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut counts = Self::default();
        for node in snapshot.orphans() {
            match node.node_type {
                NodeType::Problem => counts.problems += 1,
                NodeType::Initiative => counts.initiatives += 1,
                NodeType::Epic => counts.epics += 1,
                NodeType::Feature => counts.features += 1,
                NodeType::Objective | NodeType::Signal => {}
            }
        }
        counts
    }
}

/// Count orphans in `dataset`
#[must_use]
pub fn count_orphans(dataset: &Dataset) -> OrphanCounts {
    let index = JustificationIndex::build(dataset);
    let mut counts = OrphanCounts {
        problems: dataset
            .problems
            .iter()
            .filter(|p| index.is_orphan_problem(&p.id, p.status))
            .count(),
        ..OrphanCounts::default()
    };
    for item in dataset.roadmap_items.iter().filter(|i| index.is_orphan_item(i)) {
        match item.item_type {
            RoadmapItemType::Initiative => counts.initiatives += 1,
            RoadmapItemType::Epic => counts.epics += 1,
            RoadmapItemType::Feature => counts.features += 1,
        }
    }
    counts
}
