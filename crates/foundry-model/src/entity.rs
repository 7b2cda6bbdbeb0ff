//! Entity and link records
//!
//! Six entity kinds (signal, problem, objective, roadmap item, release, PRD)
//! and three junction kinds. The roadmap item's parent pointer is a field,
//! not a separate link record.

use crate::id::EntityId;
use crate::rice::RiceInputs;
use crate::vocab::{
    EffortSize, Frequency, PrdStatus, ProblemStatus, ReleaseStatus, RenewalRisk,
    RetentionOrGrowth, RoadmapItemType, RoadmapStatus, Severity, SignalSource, SignalStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind discriminator for records, patches, and store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// [`Signal`]
    Signal,
    /// [`Problem`]
    Problem,
    /// [`Objective`]
    Objective,
    /// [`RoadmapItem`]
    RoadmapItem,
    /// [`Release`]
    Release,
    /// [`Prd`]
    Prd,
    /// [`SignalProblem`]
    SignalProblem,
    /// [`RoadmapItemProblem`]
    RoadmapItemProblem,
    /// [`RoadmapItemObjective`]
    RoadmapItemObjective,
}

impl EntityKind {
    /// Whether this kind is a junction record
    #[inline]
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            Self::SignalProblem | Self::RoadmapItemProblem | Self::RoadmapItemObjective
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signal => "signal",
            Self::Problem => "problem",
            Self::Objective => "objective",
            Self::RoadmapItem => "roadmap item",
            Self::Release => "release",
            Self::Prd => "prd",
            Self::SignalProblem => "signal/problem link",
            Self::RoadmapItemProblem => "roadmap item/problem link",
            Self::RoadmapItemObjective => "roadmap item/objective link",
        };
        f.write_str(name)
    }
}

/// Raw voice-of-customer observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Identifier
    pub id: EntityId,
    /// Captured text
    pub raw_text: String,
    /// Capture channel
    pub source: Option<SignalSource>,
    /// Link back to the source system
    pub source_url: Option<String>,
    /// Customer or account name
    pub customer: Option<String>,
    /// Account revenue, free text
    pub arr: Option<String>,
    /// Pain severity
    pub severity: Option<Severity>,
    /// Pain frequency
    pub frequency: Option<Frequency>,
    /// Renewal risk
    pub renewal_risk: Option<RenewalRisk>,
    /// Lifecycle
    pub status: SignalStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Signal {
    /// New signal with status `new`
    #[must_use]
    pub fn new(raw_text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            raw_text: raw_text.into(),
            source: None,
            source_url: None,
            customer: None,
            arr: None,
            severity: None,
            frequency: None,
            renewal_risk: None,
            status: SignalStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// With source
    #[must_use]
    pub fn with_source(mut self, source: SignalSource) -> Self {
        self.source = Some(source);
        self
    }

    /// With customer
    #[must_use]
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// With ARR
    #[must_use]
    pub fn with_arr(mut self, arr: impl Into<String>) -> Self {
        self.arr = Some(arr.into());
        self
    }

    /// With severity
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// With frequency
    #[must_use]
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Display label: customer, else source, else `Signal`
    #[must_use]
    pub fn label(&self) -> String {
        self.customer
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| self.source.map(|s| s.as_str().to_string()))
            .unwrap_or_else(|| "Signal".to_string())
    }
}

/// Validated statement of user or business pain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Identifier
    pub id: EntityId,
    /// Short title
    pub title: String,
    /// Problem statement
    pub statement: String,
    /// Who feels the pain
    pub who_affected: Option<String>,
    /// Which workflow is blocked
    pub workflow_block: Option<String>,
    /// Business impact narrative
    pub business_impact: Option<String>,
    /// Retention, growth, or both
    pub retention_or_growth: Option<RetentionOrGrowth>,
    /// Lifecycle
    pub status: ProblemStatus,
    /// Pain frequency
    pub frequency: Option<Frequency>,
    /// Pain severity
    pub severity: Option<Severity>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Problem {
    /// New problem in `draft`
    #[must_use]
    pub fn new(title: impl Into<String>, statement: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            title: title.into(),
            statement: statement.into(),
            who_affected: None,
            workflow_block: None,
            business_impact: None,
            retention_or_growth: None,
            status: ProblemStatus::Draft,
            frequency: None,
            severity: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// With status
    #[must_use]
    pub fn with_status(mut self, status: ProblemStatus) -> Self {
        self.status = status;
        self
    }

    /// With severity
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// With affected audience
    #[must_use]
    pub fn with_who_affected(mut self, who: impl Into<String>) -> Self {
        self.who_affected = Some(who.into());
        self
    }
}

/// Strategic goal roadmap items align to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Identifier
    pub id: EntityId,
    /// Name
    pub name: String,
    /// Timeframe, free text
    pub timeframe: Option<String>,
    /// Success metric
    pub metric: Option<String>,
    /// Priority multiplier
    pub weight: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Objective {
    /// Default weight for new objectives
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    /// New objective with default weight
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            name: name.into(),
            timeframe: None,
            metric: None,
            weight: Self::DEFAULT_WEIGHT,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// With weight
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// With timeframe
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// With metric
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }
}

/// Planned unit of work in the initiative > epic > feature hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapItem {
    /// Identifier
    pub id: EntityId,
    /// Title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Why this work matters
    pub rationale: Option<String>,
    /// Hierarchy level
    #[serde(rename = "type")]
    pub item_type: RoadmapItemType,
    /// Lifecycle
    pub status: RoadmapStatus,
    /// Target month, free text
    pub target_month: Option<String>,
    /// T-shirt size
    pub effort_size: Option<EffortSize>,
    /// RICE reach
    pub reach: Option<u8>,
    /// RICE impact
    pub impact: Option<u8>,
    /// RICE confidence
    pub confidence: Option<u8>,
    /// RICE effort
    pub effort: Option<u8>,
    /// Derived RICE score
    pub score: Option<f64>,
    /// Item one hierarchy level above
    pub parent_id: Option<EntityId>,
    /// Assigned release
    pub release_id: Option<EntityId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl RoadmapItem {
    /// New `proposed` item of the given type
    #[must_use]
    pub fn new(title: impl Into<String>, item_type: RoadmapItemType) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            title: title.into(),
            description: None,
            rationale: None,
            item_type,
            status: RoadmapStatus::Proposed,
            target_month: None,
            effort_size: None,
            reach: None,
            impact: None,
            confidence: None,
            effort: None,
            score: None,
            parent_id: None,
            release_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// With status
    #[must_use]
    pub fn with_status(mut self, status: RoadmapStatus) -> Self {
        self.status = status;
        self
    }

    /// With parent
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<EntityId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With RICE inputs; the score is recomputed
    #[must_use]
    pub fn with_rice(mut self, inputs: RiceInputs) -> Self {
        self.set_rice(inputs);
        self
    }

    /// Current RICE inputs
    #[inline]
    #[must_use]
    pub fn rice(&self) -> RiceInputs {
        RiceInputs {
            reach: self.reach,
            impact: self.impact,
            confidence: self.confidence,
            effort: self.effort,
        }
    }

    /// Replace RICE inputs and recompute the score
    pub fn set_rice(&mut self, inputs: RiceInputs) {
        self.reach = inputs.reach;
        self.impact = inputs.impact;
        self.confidence = inputs.confidence;
        self.effort = inputs.effort;
        self.score = inputs.score();
    }
}

/// Named, dated release that items are assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Identifier
    pub id: EntityId,
    /// Name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Target date, free text (ISO date by convention)
    pub target_date: Option<String>,
    /// Lifecycle
    pub status: ReleaseStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Release {
    /// New `planned` release
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            name: name.into(),
            description: None,
            target_date: None,
            status: ReleaseStatus::Planned,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// With target date
    #[must_use]
    pub fn with_target_date(mut self, date: impl Into<String>) -> Self {
        self.target_date = Some(date.into());
        self
    }
}

/// Product requirements document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prd {
    /// Identifier
    pub id: EntityId,
    /// Roadmap item this PRD specifies
    pub roadmap_item_id: Option<EntityId>,
    /// Title
    pub title: String,
    /// Lifecycle
    pub status: PrdStatus,
    /// Summary section
    pub summary: Option<String>,
    /// Problem statement section
    pub problem_statement: Option<String>,
    /// Objectives section
    pub objectives: Option<String>,
    /// User stories section
    pub user_stories: Option<String>,
    /// Design asset link
    pub design_asset_link: Option<String>,
    /// Open questions section
    pub open_questions: Option<String>,
    /// Acceptance criteria section
    pub acceptance_criteria: Option<String>,
    /// Evidence section
    pub evidence: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Editable PRD section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrdSection {
    /// `summary`
    Summary,
    /// `problem_statement`
    ProblemStatement,
    /// `objectives`
    Objectives,
    /// `user_stories`
    UserStories,
    /// `design_asset_link`
    DesignAssetLink,
    /// `open_questions`
    OpenQuestions,
    /// `acceptance_criteria`
    AcceptanceCriteria,
    /// `evidence`
    Evidence,
}

impl Prd {
    /// New `draft` PRD
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            roadmap_item_id: None,
            title: title.into(),
            status: PrdStatus::Draft,
            summary: None,
            problem_statement: None,
            objectives: None,
            user_stories: None,
            design_asset_link: None,
            open_questions: None,
            acceptance_criteria: None,
            evidence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// With explicit id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    /// Tied to a roadmap item
    #[must_use]
    pub fn for_item(mut self, roadmap_item_id: impl Into<EntityId>) -> Self {
        self.roadmap_item_id = Some(roadmap_item_id.into());
        self
    }

    /// Mutable access to one section
    pub fn section_mut(&mut self, section: PrdSection) -> &mut Option<String> {
        match section {
            PrdSection::Summary => &mut self.summary,
            PrdSection::ProblemStatement => &mut self.problem_statement,
            PrdSection::Objectives => &mut self.objectives,
            PrdSection::UserStories => &mut self.user_stories,
            PrdSection::DesignAssetLink => &mut self.design_asset_link,
            PrdSection::OpenQuestions => &mut self.open_questions,
            PrdSection::AcceptanceCriteria => &mut self.acceptance_criteria,
            PrdSection::Evidence => &mut self.evidence,
        }
    }
}

/// Signal is evidence for a problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalProblem {
    /// Identifier
    pub id: EntityId,
    /// Evidence
    pub signal_id: EntityId,
    /// Supported problem
    pub problem_id: EntityId,
    /// Supporting quote from the signal
    pub quote: Option<String>,
}

impl SignalProblem {
    /// New link with generated id
    #[must_use]
    pub fn new(signal_id: EntityId, problem_id: EntityId, quote: Option<String>) -> Self {
        Self {
            id: EntityId::generate(),
            signal_id,
            problem_id,
            quote,
        }
    }
}

/// Roadmap item is justified by a problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItemProblem {
    /// Identifier
    pub id: EntityId,
    /// Justified item
    pub roadmap_item_id: EntityId,
    /// Justifying problem
    pub problem_id: EntityId,
}

impl RoadmapItemProblem {
    /// New link with generated id
    #[must_use]
    pub fn new(roadmap_item_id: EntityId, problem_id: EntityId) -> Self {
        Self {
            id: EntityId::generate(),
            roadmap_item_id,
            problem_id,
        }
    }
}

/// Roadmap item aligns to an objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItemObjective {
    /// Identifier
    pub id: EntityId,
    /// Aligned item
    pub roadmap_item_id: EntityId,
    /// Target objective
    pub objective_id: EntityId,
    /// Estimated contribution to the objective
    pub impact_to_objective: Option<u8>,
}

impl RoadmapItemObjective {
    /// New link with generated id
    #[must_use]
    pub fn new(
        roadmap_item_id: EntityId,
        objective_id: EntityId,
        impact_to_objective: Option<u8>,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            roadmap_item_id,
            objective_id,
            impact_to_objective,
        }
    }
}
