//! Whole-workspace snapshot
//!
//! A [`Dataset`] is every record of every kind, in store order. It is what
//! read-only analyses consume and what the file-backed store writes.

use crate::entity::{
    Objective, Prd, Problem, Release, RoadmapItem, RoadmapItemObjective, RoadmapItemProblem,
    Signal, SignalProblem,
};
use crate::id::EntityId;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Every record, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub signals: Vec<Signal>,
    pub problems: Vec<Problem>,
    pub objectives: Vec<Objective>,
    pub roadmap_items: Vec<RoadmapItem>,
    pub releases: Vec<Release>,
    pub prds: Vec<Prd>,
    pub signal_problems: Vec<SignalProblem>,
    pub roadmap_item_problems: Vec<RoadmapItemProblem>,
    pub roadmap_item_objectives: Vec<RoadmapItemObjective>,
}

impl Dataset {
    /// Empty dataset
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the matching group
    pub fn push(&mut self, record: Record) {
        match record {
            Record::Signal(r) => self.signals.push(r),
            Record::Problem(r) => self.problems.push(r),
            Record::Objective(r) => self.objectives.push(r),
            Record::RoadmapItem(r) => self.roadmap_items.push(r),
            Record::Release(r) => self.releases.push(r),
            Record::Prd(r) => self.prds.push(r),
            Record::SignalProblem(r) => self.signal_problems.push(r),
            Record::RoadmapItemProblem(r) => self.roadmap_item_problems.push(r),
            Record::RoadmapItemObjective(r) => self.roadmap_item_objectives.push(r),
        }
    }

    /// Builder-style [`Dataset::push`]
    #[must_use]
    pub fn with(mut self, record: impl Into<Record>) -> Self {
        self.push(record.into());
        self
    }

    /// Every record, entities first, then junctions
    ///
    /// Replaying this order into an empty store satisfies every reference.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.signals.into_iter().map(Record::from));
        out.extend(self.problems.into_iter().map(Record::from));
        out.extend(self.objectives.into_iter().map(Record::from));
        out.extend(self.releases.into_iter().map(Record::from));
        out.extend(self.roadmap_items.into_iter().map(Record::from));
        out.extend(self.prds.into_iter().map(Record::from));
        out.extend(self.signal_problems.into_iter().map(Record::from));
        out.extend(self.roadmap_item_problems.into_iter().map(Record::from));
        out.extend(self.roadmap_item_objectives.into_iter().map(Record::from));
        out
    }

    /// Total number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.signals.len()
            + self.problems.len()
            + self.objectives.len()
            + self.roadmap_items.len()
            + self.releases.len()
            + self.prds.len()
            + self.signal_problems.len()
            + self.roadmap_item_problems.len()
            + self.roadmap_item_objectives.len()
    }

    /// Whether there are no records at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Problem by id
    #[must_use]
    pub fn problem(&self, id: &EntityId) -> Option<&Problem> {
        self.problems.iter().find(|p| &p.id == id)
    }

    /// Roadmap item by id
    #[must_use]
    pub fn roadmap_item(&self, id: &EntityId) -> Option<&RoadmapItem> {
        self.roadmap_items.iter().find(|i| &i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::RoadmapItemType;

    #[test]
    fn records_replay_entities_before_links() {
        let dataset = Dataset::new()
            .with(RoadmapItemProblem::new("i".into(), "p".into()))
            .with(RoadmapItem::new("I", RoadmapItemType::Initiative).with_id("i"))
            .with(Problem::new("P", "s").with_id("p"));
        assert_eq!(dataset.len(), 3);

        let kinds: Vec<_> = dataset.into_records().iter().map(Record::kind).collect();
        let link_pos = kinds
            .iter()
            .position(|k| k.is_link())
            .expect("link present");
        assert!(kinds[..link_pos].iter().all(|k| !k.is_link()));
    }

    #[test]
    fn empty_json_object_is_empty_dataset() {
        let dataset: Dataset = serde_json::from_str("{}").unwrap();
        assert!(dataset.is_empty());
    }
}
