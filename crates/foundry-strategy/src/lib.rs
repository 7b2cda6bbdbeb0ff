//! Foundry Strategy
//!
//! Consistency engine for the strategy graph (objectives, roadmap items,
//! problems, signals):
//! - [`gate`]: prospective check of one status transition
//! - [`graph`]: retrospective projection of the whole dataset with orphan flags
//! - [`orphans`]: orphan totals for dashboards
//!
//! All three share [`JustificationIndex`], so the gate and the graph can never
//! disagree about the same link state. Everything here is pure; callers load
//! the [`foundry_model::Dataset`] it runs over.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod gate;
pub mod graph;
pub mod index;
pub mod orphans;
pub mod requirement;

pub use gate::{check_problem_transition, check_roadmap_transition, requires_commit_check};
pub use graph::{
    build_graph, EdgeType, GraphBuilder, GraphEdge, GraphNode, GraphSnapshot, NodeMeta, NodeType,
};
pub use index::{HierarchyEntry, JustificationIndex, LinkFacts};
pub use orphans::{count_orphans, OrphanCounts};
pub use requirement::{GatingFailure, GatingResult, Requirement, PROBLEM_ACCEPT_MESSAGE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
