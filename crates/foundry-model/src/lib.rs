//! Foundry Model
//!
//! Typed records for the product-management workspace:
//! - Entities: signals, problems, objectives, roadmap items, releases, PRDs
//! - Junctions: signal/problem, roadmap item/problem, roadmap item/objective
//! - Typed partial updates ([`Patch`])
//! - RICE scoring
//! - Structured signal capture templates
//!
//! Everything here is pure data; persistence lives in `foundry-store`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dataset;
pub mod entity;
pub mod id;
pub mod patch;
pub mod record;
pub mod rice;
pub mod signal_compose;
pub mod vocab;

pub use dataset::Dataset;
pub use entity::{
    EntityKind, Objective, Prd, PrdSection, Problem, Release, RoadmapItem, RoadmapItemObjective,
    RoadmapItemProblem, Signal, SignalProblem,
};
pub use id::EntityId;
pub use patch::{
    ObjectivePatch, Patch, PrdPatch, ProblemPatch, ReleasePatch, RoadmapItemPatch, SignalPatch,
    Touch,
};
pub use record::{downcast_all, KindMismatch, Record};
pub use rice::{rice_score, RiceInputs, RICE_MAX, RICE_MIN};
pub use signal_compose::StructuredSignal;
pub use vocab::{
    EffortSize, Frequency, PrdStatus, ProblemStatus, ReleaseStatus, RenewalRisk,
    RetentionOrGrowth, RoadmapItemType, RoadmapStatus, Severity, SignalSource, SignalStatus,
    UnknownVariant,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
