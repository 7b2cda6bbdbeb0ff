//! In-memory entity store
//!
//! Rows live in insertion-ordered maps behind a single `RwLock`, one table
//! per [`EntityKind`]. Every write holds the lock for its full duration, so
//! a reader never observes a half-applied cascade.

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use foundry_model::{Dataset, EntityId, EntityKind, KindMismatch, Patch, Record, Touch};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

type Table = IndexMap<EntityId, Record>;

#[derive(Debug, Clone, Default)]
struct Tables {
    by_kind: IndexMap<EntityKind, Table>,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> Option<&Table> {
        self.by_kind.get(&kind)
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut Table {
        self.by_kind.entry(kind).or_default()
    }

    fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.table(kind).is_some_and(|t| t.contains_key(id))
    }

    fn require(&self, kind: EntityKind, target: EntityKind, id: &EntityId) -> Result<(), StoreError> {
        if self.contains(target, id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference {
                kind,
                target,
                target_id: id.clone(),
            })
        }
    }

    /// Every id the record points at must exist
    ///
    /// `parent_id` is exempt: a dangling parent is a tolerated state.
    fn check_references(&self, record: &Record) -> Result<(), StoreError> {
        let kind = record.kind();
        match record {
            Record::SignalProblem(l) => {
                self.require(kind, EntityKind::Signal, &l.signal_id)?;
                self.require(kind, EntityKind::Problem, &l.problem_id)
            }
            Record::RoadmapItemProblem(l) => {
                self.require(kind, EntityKind::RoadmapItem, &l.roadmap_item_id)?;
                self.require(kind, EntityKind::Problem, &l.problem_id)
            }
            Record::RoadmapItemObjective(l) => {
                self.require(kind, EntityKind::RoadmapItem, &l.roadmap_item_id)?;
                self.require(kind, EntityKind::Objective, &l.objective_id)
            }
            Record::RoadmapItem(item) => match &item.release_id {
                Some(release) => self.require(kind, EntityKind::Release, release),
                None => Ok(()),
            },
            Record::Prd(prd) => match &prd.roadmap_item_id {
                Some(item) => self.require(kind, EntityKind::RoadmapItem, item),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn retain(&mut self, kind: EntityKind, mut keep: impl FnMut(&Record) -> bool) -> usize {
        let table = self.table_mut(kind);
        let before = table.len();
        table.retain(|_, r| keep(r));
        before - table.len()
    }

    fn cascade(&mut self, kind: EntityKind, id: &EntityId, now: DateTime<Utc>) {
        match kind {
            EntityKind::Signal => {
                let n = self.retain(EntityKind::SignalProblem, |r| {
                    !matches!(r, Record::SignalProblem(l) if &l.signal_id == id)
                });
                trace!(removed = n, "cascaded signal links");
            }
            EntityKind::Problem => {
                let evidence = self.retain(EntityKind::SignalProblem, |r| {
                    !matches!(r, Record::SignalProblem(l) if &l.problem_id == id)
                });
                let justification = self.retain(EntityKind::RoadmapItemProblem, |r| {
                    !matches!(r, Record::RoadmapItemProblem(l) if &l.problem_id == id)
                });
                trace!(evidence, justification, "cascaded problem links");
            }
            EntityKind::Objective => {
                let n = self.retain(EntityKind::RoadmapItemObjective, |r| {
                    !matches!(r, Record::RoadmapItemObjective(l) if &l.objective_id == id)
                });
                trace!(removed = n, "cascaded objective links");
            }
            EntityKind::RoadmapItem => {
                self.retain(EntityKind::RoadmapItemProblem, |r| {
                    !matches!(r, Record::RoadmapItemProblem(l) if &l.roadmap_item_id == id)
                });
                self.retain(EntityKind::RoadmapItemObjective, |r| {
                    !matches!(r, Record::RoadmapItemObjective(l) if &l.roadmap_item_id == id)
                });
                for record in self.table_mut(EntityKind::Prd).values_mut() {
                    if let Record::Prd(prd) = record {
                        if prd.roadmap_item_id.as_ref() == Some(id) {
                            prd.roadmap_item_id = None;
                            prd.touch(now);
                        }
                    }
                }
            }
            EntityKind::Release => {
                for record in self.table_mut(EntityKind::RoadmapItem).values_mut() {
                    if let Record::RoadmapItem(item) = record {
                        if item.release_id.as_ref() == Some(id) {
                            item.release_id = None;
                            item.touch(now);
                        }
                    }
                }
            }
            EntityKind::Prd
            | EntityKind::SignalProblem
            | EntityKind::RoadmapItemProblem
            | EntityKind::RoadmapItemObjective => {}
        }
    }
}

fn apply_patch(record: &mut Record, patch: Patch, now: DateTime<Utc>) -> Result<(), KindMismatch> {
    match (record, patch) {
        (Record::Signal(r), Patch::Signal(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (Record::Problem(r), Patch::Problem(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (Record::Objective(r), Patch::Objective(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (Record::RoadmapItem(r), Patch::RoadmapItem(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (Record::Release(r), Patch::Release(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (Record::Prd(r), Patch::Prd(p)) => {
            p.apply(r);
            r.touch(now);
        }
        (record, patch) => {
            return Err(KindMismatch {
                expected: record.kind(),
                found: patch.kind(),
            })
        }
    }
    Ok(())
}

/// Entity store held entirely in memory
///
/// Also the working set of [`crate::FileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated from a dataset
    ///
    /// # Errors
    /// Fails if the dataset holds duplicate ids or dangling references.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in dataset.into_records() {
            store.put(record)?;
        }
        Ok(store)
    }

    /// Copy of every record
    #[must_use]
    pub fn snapshot(&self) -> Dataset {
        let tables = self.tables.read();
        let mut dataset = Dataset::new();
        for record in tables.by_kind.values().flat_map(IndexMap::values) {
            dataset.push(record.clone());
        }
        dataset
    }

    /// Independent copy of the current state
    pub(crate) fn fork(&self) -> Self {
        Self {
            tables: RwLock::new(self.tables.read().clone()),
        }
    }

    /// Replace the current state with that of `other`
    pub(crate) fn adopt(&self, other: Self) {
        *self.tables.write() = other.tables.into_inner();
    }

    /// Number of stored records of `kind`
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables.read().table(kind).map_or(0, IndexMap::len)
    }

    /// Synchronous [`EntityStore::find`]
    ///
    /// # Errors
    /// [`StoreError::UnsupportedFilter`] when `filter` does not apply to `kind`.
    pub fn select(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        if !filter.applies_to(kind) {
            return Err(StoreError::UnsupportedFilter {
                kind,
                filter: filter.clone(),
            });
        }
        let tables = self.tables.read();
        let Some(table) = tables.table(kind) else {
            return Ok(Vec::new());
        };
        let rows = match filter {
            Filter::Id(id) => table.get(id).cloned().into_iter().collect(),
            _ => table.values().filter(|r| filter.matches(r)).cloned().collect(),
        };
        Ok(rows)
    }

    /// Synchronous [`EntityStore::insert`]
    ///
    /// # Errors
    /// Duplicate id or a reference to a missing record.
    pub fn put(&self, record: Record) -> Result<Record, StoreError> {
        let kind = record.kind();
        let mut tables = self.tables.write();
        if tables.contains(kind, record.id()) {
            return Err(StoreError::Duplicate {
                kind,
                id: record.id().clone(),
            });
        }
        tables.check_references(&record)?;
        debug!(%kind, id = %record.id(), "insert");
        tables
            .table_mut(kind)
            .insert(record.id().clone(), record.clone());
        Ok(record)
    }

    /// Synchronous [`EntityStore::update`]
    ///
    /// Returns whether a record was changed.
    ///
    /// # Errors
    /// Patch for another kind, or a patched reference to a missing record.
    pub fn patch(&self, kind: EntityKind, id: &EntityId, patch: Patch) -> Result<bool, StoreError> {
        if patch.kind() != kind {
            return Err(KindMismatch {
                expected: kind,
                found: patch.kind(),
            }
            .into());
        }
        let mut tables = self.tables.write();
        let Some(current) = tables.table(kind).and_then(|t| t.get(id)) else {
            debug!(%kind, %id, "update of missing record ignored");
            return Ok(false);
        };
        let mut next = current.clone();
        apply_patch(&mut next, patch, Utc::now())?;
        tables.check_references(&next)?;
        debug!(%kind, %id, "update");
        tables.table_mut(kind).insert(id.clone(), next);
        Ok(true)
    }

    /// Synchronous [`EntityStore::delete`]
    ///
    /// Returns whether a record was removed.
    pub fn remove(&self, kind: EntityKind, id: &EntityId) -> bool {
        let mut tables = self.tables.write();
        if tables.table_mut(kind).shift_remove(id).is_none() {
            debug!(%kind, %id, "delete of missing record ignored");
            return false;
        }
        debug!(%kind, %id, "delete");
        tables.cascade(kind, id, Utc::now());
        true
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn find(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        self.select(kind, filter)
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        self.put(record)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: Patch,
    ) -> Result<(), StoreError> {
        self.patch(kind, id, patch).map(|_| ())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), StoreError> {
        self.remove(kind, id);
        Ok(())
    }

    async fn load_dataset(&self) -> Result<Dataset, StoreError> {
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::{
        Prd, Problem, ProblemPatch, ProblemStatus, Release, RoadmapItem, RoadmapItemPatch,
        RoadmapItemProblem, RoadmapItemType, Signal, SignalPatch, SignalProblem,
    };

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.put(Signal::new("slow exports").with_id("s1").into()).unwrap();
        store.put(Problem::new("Export", "Exports time out").with_id("p1").into()).unwrap();
        store
            .put(RoadmapItem::new("Export v2", RoadmapItemType::Initiative).with_id("i1").into())
            .unwrap();
        store
            .put(SignalProblem::new("s1".into(), "p1".into(), Some("timing out".into())).into())
            .unwrap();
        store
            .put(RoadmapItemProblem::new("i1".into(), "p1".into()).into())
            .unwrap();
        store
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = seeded();
        let err = store.put(Signal::new("again").with_id("s1").into()).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { kind: EntityKind::Signal, .. }));
    }

    #[test]
    fn links_require_both_ends() {
        let store = seeded();
        let err = store
            .put(SignalProblem::new("s1".into(), "nope".into(), None).into())
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference { target: EntityKind::Problem, .. }
        ));
    }

    #[test]
    fn filter_must_apply_to_kind() {
        let store = seeded();
        let err = store
            .select(EntityKind::Problem, &Filter::Signal("s1".into()))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFilter { .. }));
    }

    #[test]
    fn update_stamps_and_ignores_missing() {
        let store = seeded();
        let before = store.select(EntityKind::Problem, &Filter::Id("p1".into())).unwrap();
        let Record::Problem(before) = &before[0] else { panic!("problem") };

        let changed = store
            .patch(
                EntityKind::Problem,
                &"p1".into(),
                Patch::Problem(ProblemPatch::status(ProblemStatus::Accepted)),
            )
            .unwrap();
        assert!(changed);
        let after = store.select(EntityKind::Problem, &Filter::Id("p1".into())).unwrap();
        let Record::Problem(after) = &after[0] else { panic!("problem") };
        assert_eq!(after.status, ProblemStatus::Accepted);
        assert!(after.updated_at >= before.updated_at);

        let changed = store
            .patch(
                EntityKind::Problem,
                &"gone".into(),
                Patch::Problem(ProblemPatch::default()),
            )
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn patch_kind_must_match() {
        let store = seeded();
        let err = store
            .patch(EntityKind::Problem, &"p1".into(), Patch::Signal(SignalPatch::default()))
            .unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch(_)));
    }

    #[test]
    fn patched_release_must_exist() {
        let store = seeded();
        let err = store
            .patch(
                EntityKind::RoadmapItem,
                &"i1".into(),
                Patch::RoadmapItem(RoadmapItemPatch {
                    release_id: Some(Some("r9".into())),
                    ..RoadmapItemPatch::default()
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { .. }));
    }

    #[test]
    fn deleting_problem_cascades_both_link_kinds() {
        let store = seeded();
        assert!(store.remove(EntityKind::Problem, &"p1".into()));
        assert_eq!(store.count(EntityKind::SignalProblem), 0);
        assert_eq!(store.count(EntityKind::RoadmapItemProblem), 0);
        assert_eq!(store.count(EntityKind::Signal), 1);
        assert!(!store.remove(EntityKind::Problem, &"p1".into()));
    }

    #[test]
    fn deleting_item_detaches_prds_and_leaves_children_dangling() {
        let store = seeded();
        store
            .put(RoadmapItem::new("Child", RoadmapItemType::Epic).with_id("e1").with_parent("i1").into())
            .unwrap();
        store.put(Prd::new("Export PRD").with_id("d1").for_item("i1").into()).unwrap();

        store.remove(EntityKind::RoadmapItem, &"i1".into());

        let prd = store.select(EntityKind::Prd, &Filter::Id("d1".into())).unwrap();
        assert!(matches!(&prd[0], Record::Prd(p) if p.roadmap_item_id.is_none()));
        let child = store.select(EntityKind::RoadmapItem, &Filter::Id("e1".into())).unwrap();
        assert!(
            matches!(&child[0], Record::RoadmapItem(i) if i.parent_id == Some("i1".into()))
        );
        assert_eq!(store.count(EntityKind::RoadmapItemProblem), 0);
    }

    #[test]
    fn deleting_release_unschedules_items() {
        let store = seeded();
        store.put(Release::new("Q3").with_id("r1").into()).unwrap();
        store
            .patch(
                EntityKind::RoadmapItem,
                &"i1".into(),
                Patch::RoadmapItem(RoadmapItemPatch {
                    release_id: Some(Some("r1".into())),
                    ..RoadmapItemPatch::default()
                }),
            )
            .unwrap();
        assert_eq!(
            store.select(EntityKind::RoadmapItem, &Filter::Release("r1".into())).unwrap().len(),
            1
        );

        store.remove(EntityKind::Release, &"r1".into());
        assert!(store
            .select(EntityKind::RoadmapItem, &Filter::Release("r1".into()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn snapshot_replays_into_fresh_store() {
        let store = seeded();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 5);
        let copy = MemoryStore::from_dataset(snapshot.clone()).unwrap();
        assert_eq!(copy.snapshot(), snapshot);
    }

    #[test]
    fn fork_is_independent_until_adopted() {
        let store = seeded();
        let next = store.fork();
        assert!(next.remove(EntityKind::Problem, &"p1".into()));
        assert_eq!(store.count(EntityKind::Problem), 1);
        assert_eq!(store.count(EntityKind::SignalProblem), 1);

        store.adopt(next);
        assert_eq!(store.count(EntityKind::Problem), 0);
        assert_eq!(store.count(EntityKind::SignalProblem), 0);
        assert_eq!(store.count(EntityKind::RoadmapItemProblem), 0);
    }
}
