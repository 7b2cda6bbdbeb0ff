//! Typed and eager-loading helpers over [`EntityStore`]
//!
//! Every helper is built from the trait's `find`, so it works for any
//! backend. Loaded views are plain owned values; nothing here caches.

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::EntityStore;
use foundry_model::{
    downcast_all, Dataset, EntityId, EntityKind, KindMismatch, Objective, Problem, Record,
    RoadmapItem, RoadmapItemObjective, RoadmapItemProblem, Signal, SignalProblem,
};
use serde::Serialize;
use std::collections::HashSet;

/// Ancestors loaded above a roadmap item (feature → epic → initiative)
pub const MAX_ANCESTORS: usize = 2;

/// Problem reached through a roadmap item link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedProblem {
    pub link: RoadmapItemProblem,
    pub problem: Problem,
}

/// Objective reached through a roadmap item link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedObjective {
    pub link: RoadmapItemObjective,
    pub objective: Objective,
}

/// Signal reached through a problem link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedSignal {
    pub link: SignalProblem,
    pub signal: Signal,
}

/// Roadmap item with its direct relations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapItemWithLinks {
    pub item: RoadmapItem,
    pub parent: Option<RoadmapItem>,
    pub children: Vec<RoadmapItem>,
    pub problems: Vec<LinkedProblem>,
    pub objectives: Vec<LinkedObjective>,
}

/// Problem with its evidence and the items it justifies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemWithLinks {
    pub problem: Problem,
    pub signals: Vec<LinkedSignal>,
    pub roadmap_items: Vec<RoadmapItem>,
}

/// Typed reads layered on any [`EntityStore`]
#[async_trait::async_trait]
pub trait StoreExt: EntityStore {
    /// [`EntityStore::find`] converted to a concrete record type
    async fn find_as<T>(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<T>, StoreError>
    where
        T: TryFrom<Record, Error = KindMismatch> + Send,
    {
        Ok(downcast_all(self.find(kind, filter).await?)?)
    }

    /// Single record by id
    async fn get<T>(&self, kind: EntityKind, id: &EntityId) -> Result<Option<T>, StoreError>
    where
        T: TryFrom<Record, Error = KindMismatch> + Send,
    {
        let found = self.find(kind, &Filter::Id(id.clone())).await?;
        match found.into_iter().next() {
            Some(record) => Ok(Some(T::try_from(record)?)),
            None => Ok(None),
        }
    }

    /// Roadmap item with parent, children, problems and objectives
    async fn roadmap_item_with_links(
        &self,
        id: &EntityId,
    ) -> Result<Option<RoadmapItemWithLinks>, StoreError> {
        let Some(item) = self.get::<RoadmapItem>(EntityKind::RoadmapItem, id).await? else {
            return Ok(None);
        };
        let parent = match &item.parent_id {
            Some(parent_id) => self.get::<RoadmapItem>(EntityKind::RoadmapItem, parent_id).await?,
            None => None,
        };
        let children = self
            .find_as::<RoadmapItem>(EntityKind::RoadmapItem, &Filter::Parent(id.clone()))
            .await?;

        let problem_links: Vec<RoadmapItemProblem> = self
            .find_as(EntityKind::RoadmapItemProblem, &Filter::RoadmapItem(id.clone()))
            .await?;
        let mut problems = Vec::with_capacity(problem_links.len());
        for link in problem_links {
            if let Some(problem) = self.get::<Problem>(EntityKind::Problem, &link.problem_id).await? {
                problems.push(LinkedProblem { link, problem });
            }
        }

        let objective_links: Vec<RoadmapItemObjective> = self
            .find_as(EntityKind::RoadmapItemObjective, &Filter::RoadmapItem(id.clone()))
            .await?;
        let mut objectives = Vec::with_capacity(objective_links.len());
        for link in objective_links {
            if let Some(objective) = self.get::<Objective>(EntityKind::Objective, &link.objective_id).await? {
                objectives.push(LinkedObjective { link, objective });
            }
        }

        Ok(Some(RoadmapItemWithLinks {
            item,
            parent,
            children,
            problems,
            objectives,
        }))
    }

    /// Problem with its signals and justified roadmap items
    async fn problem_with_links(
        &self,
        id: &EntityId,
    ) -> Result<Option<ProblemWithLinks>, StoreError> {
        let Some(problem) = self.get::<Problem>(EntityKind::Problem, id).await? else {
            return Ok(None);
        };

        let signal_links: Vec<SignalProblem> = self
            .find_as(EntityKind::SignalProblem, &Filter::Problem(id.clone()))
            .await?;
        let mut signals = Vec::with_capacity(signal_links.len());
        for link in signal_links {
            if let Some(signal) = self.get::<Signal>(EntityKind::Signal, &link.signal_id).await? {
                signals.push(LinkedSignal { link, signal });
            }
        }

        let item_links: Vec<RoadmapItemProblem> = self
            .find_as(EntityKind::RoadmapItemProblem, &Filter::Problem(id.clone()))
            .await?;
        let mut roadmap_items = Vec::with_capacity(item_links.len());
        for link in item_links {
            if let Some(item) = self
                .get::<RoadmapItem>(EntityKind::RoadmapItem, &link.roadmap_item_id)
                .await?
            {
                roadmap_items.push(item);
            }
        }

        Ok(Some(ProblemWithLinks {
            problem,
            signals,
            roadmap_items,
        }))
    }

    /// Item, its ancestors and the links that justify or align them
    ///
    /// `item` is taken by value so callers can pass a pending, not yet
    /// persisted version. The ancestor walk follows `parent_id` at most
    /// [`MAX_ANCESTORS`] hops and stops at a missing or repeated id.
    async fn hierarchy_for(&self, item: RoadmapItem) -> Result<Dataset, StoreError> {
        let mut dataset = Dataset::new();
        let mut seen = HashSet::from([item.id.clone()]);
        let mut next_parent = item.parent_id.clone();
        let mut members = vec![item];

        while members.len() <= MAX_ANCESTORS {
            let Some(parent_id) = next_parent.take() else { break };
            if !seen.insert(parent_id.clone()) {
                break;
            }
            let Some(parent) = self.get::<RoadmapItem>(EntityKind::RoadmapItem, &parent_id).await?
            else {
                break;
            };
            next_parent.clone_from(&parent.parent_id);
            members.push(parent);
        }

        let mut problem_ids = HashSet::new();
        for member in &members {
            let problem_links: Vec<RoadmapItemProblem> = self
                .find_as(
                    EntityKind::RoadmapItemProblem,
                    &Filter::RoadmapItem(member.id.clone()),
                )
                .await?;
            for link in problem_links {
                if problem_ids.insert(link.problem_id.clone()) {
                    if let Some(problem) =
                        self.get::<Problem>(EntityKind::Problem, &link.problem_id).await?
                    {
                        dataset.problems.push(problem);
                    }
                }
                dataset.roadmap_item_problems.push(link);
            }
            let objective_links: Vec<RoadmapItemObjective> = self
                .find_as(
                    EntityKind::RoadmapItemObjective,
                    &Filter::RoadmapItem(member.id.clone()),
                )
                .await?;
            dataset.roadmap_item_objectives.extend(objective_links);
        }
        dataset.roadmap_items = members;
        Ok(dataset)
    }
}

impl<S: EntityStore + ?Sized> StoreExt for S {}
