//! Query filters

use foundry_model::{EntityId, EntityKind, Record};

/// Selection criterion for [`crate::EntityStore::find`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every record of the kind
    All,
    /// Record with this id
    Id(EntityId),
    /// Links and PRDs attached to this roadmap item
    RoadmapItem(EntityId),
    /// Links attached to this problem
    Problem(EntityId),
    /// Links attached to this signal
    Signal(EntityId),
    /// Links attached to this objective
    Objective(EntityId),
    /// Roadmap items whose parent is this item
    Parent(EntityId),
    /// Roadmap items scheduled in this release
    Release(EntityId),
}

impl Filter {
    /// Whether the filter means anything for `kind`
    #[must_use]
    pub fn applies_to(&self, kind: EntityKind) -> bool {
        use EntityKind as K;
        match self {
            Filter::All | Filter::Id(_) => true,
            Filter::RoadmapItem(_) => matches!(
                kind,
                K::RoadmapItemProblem | K::RoadmapItemObjective | K::Prd
            ),
            Filter::Problem(_) => matches!(kind, K::SignalProblem | K::RoadmapItemProblem),
            Filter::Signal(_) => kind == K::SignalProblem,
            Filter::Objective(_) => kind == K::RoadmapItemObjective,
            Filter::Parent(_) | Filter::Release(_) => kind == K::RoadmapItem,
        }
    }

    /// Whether `record` is selected
    ///
    /// Records of a kind the filter does not apply to never match.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match (self, record) {
            (Filter::All, _) => true,
            (Filter::Id(id), r) => r.id() == id,
            (Filter::RoadmapItem(id), Record::RoadmapItemProblem(l)) => &l.roadmap_item_id == id,
            (Filter::RoadmapItem(id), Record::RoadmapItemObjective(l)) => {
                &l.roadmap_item_id == id
            }
            (Filter::RoadmapItem(id), Record::Prd(p)) => p.roadmap_item_id.as_ref() == Some(id),
            (Filter::Problem(id), Record::SignalProblem(l)) => &l.problem_id == id,
            (Filter::Problem(id), Record::RoadmapItemProblem(l)) => &l.problem_id == id,
            (Filter::Signal(id), Record::SignalProblem(l)) => &l.signal_id == id,
            (Filter::Objective(id), Record::RoadmapItemObjective(l)) => &l.objective_id == id,
            (Filter::Parent(id), Record::RoadmapItem(i)) => i.parent_id.as_ref() == Some(id),
            (Filter::Release(id), Record::RoadmapItem(i)) => i.release_id.as_ref() == Some(id),
            _ => false,
        }
    }
}
