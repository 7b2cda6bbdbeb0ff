//! Typed partial updates
//!
//! `None` leaves a field unchanged. For nullable fields the inner option
//! distinguishes "set" (`Some(Some(v))`) from "clear" (`Some(None)`).

use crate::entity::{EntityKind, Objective, Prd, Problem, Release, RoadmapItem, Signal};
use crate::id::EntityId;
use crate::vocab::{
    EffortSize, Frequency, PrdStatus, ProblemStatus, ReleaseStatus, RenewalRisk,
    RetentionOrGrowth, RoadmapItemType, RoadmapStatus, Severity, SignalSource, SignalStatus,
};
use chrono::{DateTime, Utc};

#[inline]
fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Partial update of a [`Signal`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalPatch {
    pub raw_text: Option<String>,
    pub source: Option<Option<SignalSource>>,
    pub source_url: Option<Option<String>>,
    pub customer: Option<Option<String>>,
    pub arr: Option<Option<String>>,
    pub severity: Option<Option<Severity>>,
    pub frequency: Option<Option<Frequency>>,
    pub renewal_risk: Option<Option<RenewalRisk>>,
    pub status: Option<SignalStatus>,
}

impl SignalPatch {
    /// Patch that only changes status
    #[must_use]
    pub fn status(status: SignalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply onto a record
    pub fn apply(self, target: &mut Signal) {
        set(&mut target.raw_text, self.raw_text);
        set(&mut target.source, self.source);
        set(&mut target.source_url, self.source_url);
        set(&mut target.customer, self.customer);
        set(&mut target.arr, self.arr);
        set(&mut target.severity, self.severity);
        set(&mut target.frequency, self.frequency);
        set(&mut target.renewal_risk, self.renewal_risk);
        set(&mut target.status, self.status);
    }
}

/// Partial update of a [`Problem`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemPatch {
    pub title: Option<String>,
    pub statement: Option<String>,
    pub who_affected: Option<Option<String>>,
    pub workflow_block: Option<Option<String>>,
    pub business_impact: Option<Option<String>>,
    pub retention_or_growth: Option<Option<RetentionOrGrowth>>,
    pub frequency: Option<Option<Frequency>>,
    pub severity: Option<Option<Severity>>,
    pub status: Option<ProblemStatus>,
}

impl ProblemPatch {
    /// Patch that only changes status
    #[must_use]
    pub fn status(status: ProblemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply onto a record
    pub fn apply(self, target: &mut Problem) {
        set(&mut target.title, self.title);
        set(&mut target.statement, self.statement);
        set(&mut target.who_affected, self.who_affected);
        set(&mut target.workflow_block, self.workflow_block);
        set(&mut target.business_impact, self.business_impact);
        set(&mut target.retention_or_growth, self.retention_or_growth);
        set(&mut target.frequency, self.frequency);
        set(&mut target.severity, self.severity);
        set(&mut target.status, self.status);
    }
}

/// Partial update of an [`Objective`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectivePatch {
    pub name: Option<String>,
    pub timeframe: Option<Option<String>>,
    pub metric: Option<Option<String>>,
    pub weight: Option<f64>,
}

impl ObjectivePatch {
    /// Apply onto a record
    pub fn apply(self, target: &mut Objective) {
        set(&mut target.name, self.name);
        set(&mut target.timeframe, self.timeframe);
        set(&mut target.metric, self.metric);
        set(&mut target.weight, self.weight);
    }
}

/// Partial update of a [`RoadmapItem`]
///
/// `score` is derived; callers set it from the merged RICE inputs rather
/// than from user input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadmapItemPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub rationale: Option<Option<String>>,
    pub item_type: Option<RoadmapItemType>,
    pub status: Option<RoadmapStatus>,
    pub target_month: Option<Option<String>>,
    pub effort_size: Option<Option<EffortSize>>,
    pub reach: Option<u8>,
    pub impact: Option<u8>,
    pub confidence: Option<u8>,
    pub effort: Option<u8>,
    pub score: Option<Option<f64>>,
    pub parent_id: Option<Option<EntityId>>,
    pub release_id: Option<Option<EntityId>>,
}

impl RoadmapItemPatch {
    /// Patch that only changes status
    #[must_use]
    pub fn status(status: RoadmapStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// RICE inputs carried by this patch
    #[must_use]
    pub fn rice(&self) -> crate::rice::RiceInputs {
        crate::rice::RiceInputs {
            reach: self.reach,
            impact: self.impact,
            confidence: self.confidence,
            effort: self.effort,
        }
    }

    /// Apply onto a record
    pub fn apply(self, target: &mut RoadmapItem) {
        set(&mut target.title, self.title);
        set(&mut target.description, self.description);
        set(&mut target.rationale, self.rationale);
        set(&mut target.item_type, self.item_type);
        set(&mut target.status, self.status);
        set(&mut target.target_month, self.target_month);
        set(&mut target.effort_size, self.effort_size);
        set(&mut target.reach, self.reach.map(Some));
        set(&mut target.impact, self.impact.map(Some));
        set(&mut target.confidence, self.confidence.map(Some));
        set(&mut target.effort, self.effort.map(Some));
        set(&mut target.score, self.score);
        set(&mut target.parent_id, self.parent_id);
        set(&mut target.release_id, self.release_id);
    }
}

/// Partial update of a [`Release`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleasePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub target_date: Option<Option<String>>,
    pub status: Option<ReleaseStatus>,
}

impl ReleasePatch {
    /// Apply onto a record
    pub fn apply(self, target: &mut Release) {
        set(&mut target.name, self.name);
        set(&mut target.description, self.description);
        set(&mut target.target_date, self.target_date);
        set(&mut target.status, self.status);
    }
}

/// Partial update of a [`Prd`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrdPatch {
    pub title: Option<String>,
    pub roadmap_item_id: Option<Option<EntityId>>,
    pub summary: Option<Option<String>>,
    pub problem_statement: Option<Option<String>>,
    pub objectives: Option<Option<String>>,
    pub user_stories: Option<Option<String>>,
    pub design_asset_link: Option<Option<String>>,
    pub open_questions: Option<Option<String>>,
    pub acceptance_criteria: Option<Option<String>>,
    pub evidence: Option<Option<String>>,
    pub status: Option<PrdStatus>,
}

impl PrdPatch {
    /// Apply onto a record
    pub fn apply(self, target: &mut Prd) {
        set(&mut target.title, self.title);
        set(&mut target.roadmap_item_id, self.roadmap_item_id);
        set(&mut target.summary, self.summary);
        set(&mut target.problem_statement, self.problem_statement);
        set(&mut target.objectives, self.objectives);
        set(&mut target.user_stories, self.user_stories);
        set(&mut target.design_asset_link, self.design_asset_link);
        set(&mut target.open_questions, self.open_questions);
        set(&mut target.acceptance_criteria, self.acceptance_criteria);
        set(&mut target.evidence, self.evidence);
        set(&mut target.status, self.status);
    }
}

/// Tagged patch envelope; only entity kinds are updatable
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Signal patch
    Signal(SignalPatch),
    /// Problem patch
    Problem(ProblemPatch),
    /// Objective patch
    Objective(ObjectivePatch),
    /// Roadmap item patch
    RoadmapItem(RoadmapItemPatch),
    /// Release patch
    Release(ReleasePatch),
    /// PRD patch
    Prd(PrdPatch),
}

impl Patch {
    /// Kind this patch targets
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Patch::Signal(_) => EntityKind::Signal,
            Patch::Problem(_) => EntityKind::Problem,
            Patch::Objective(_) => EntityKind::Objective,
            Patch::RoadmapItem(_) => EntityKind::RoadmapItem,
            Patch::Release(_) => EntityKind::Release,
            Patch::Prd(_) => EntityKind::Prd,
        }
    }
}

/// Records that carry an update timestamp
pub trait Touch {
    /// Stamp the update time
    fn touch(&mut self, at: DateTime<Utc>);
}

macro_rules! touch_impls {
    ($($ty:ty),+) => {
        $(impl Touch for $ty {
            fn touch(&mut self, at: DateTime<Utc>) {
                self.updated_at = at;
            }
        })+
    };
}

touch_impls!(Signal, Problem, Objective, RoadmapItem, Release, Prd);
