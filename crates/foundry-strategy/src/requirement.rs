//! Gating outcomes
//!
//! A blocked transition is data, not an error. Callers branch on
//! [`GatingResult`] and show [`GatingFailure::message`] to the user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A link or field a transition needs but does not have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requirement {
    /// At least one objective link (initiatives)
    #[serde(rename = "objective")]
    Objective,
    /// An accepted problem, direct or inherited from an ancestor
    #[serde(rename = "acceptedProblem")]
    AcceptedProblem,
    /// A parent item (epics)
    #[serde(rename = "parentInitiative")]
    ParentInitiative,
    /// A parent item (features)
    #[serde(rename = "parentEpic")]
    ParentEpic,
    /// At least one roadmap item link (problems)
    #[serde(rename = "roadmapItem")]
    RoadmapItem,
}

impl Requirement {
    /// Stable wire code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::AcceptedProblem => "acceptedProblem",
            Self::ParentInitiative => "parentInitiative",
            Self::ParentEpic => "parentEpic",
            Self::RoadmapItem => "roadmapItem",
        }
    }

    /// Clause used when composing a commit message
    #[must_use]
    pub fn clause(&self) -> &'static str {
        match self {
            Self::Objective => "Link to at least 1 Objective",
            Self::AcceptedProblem => "Link to at least 1 Accepted Problem",
            Self::ParentInitiative => "Set a parent Initiative",
            Self::ParentEpic => "Set a parent Epic",
            Self::RoadmapItem => "Link to at least one Initiative or Feature",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Message for a problem that cannot be accepted yet
pub const PROBLEM_ACCEPT_MESSAGE: &str =
    "Must link to at least one Initiative or Feature before accepting.";

/// A blocked transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingFailure {
    /// Every unmet requirement, in rule order
    pub missing: Vec<Requirement>,
    /// Human-readable summary
    pub message: String,
}

impl GatingFailure {
    /// Failure for a problem with no roadmap item links
    #[must_use]
    pub fn problem_unlinked() -> Self {
        Self {
            missing: vec![Requirement::RoadmapItem],
            message: PROBLEM_ACCEPT_MESSAGE.to_string(),
        }
    }

    /// Failure for a roadmap item commit; message lists one clause per requirement
    #[must_use]
    pub fn commit(missing: Vec<Requirement>) -> Self {
        let clauses: Vec<&str> = missing.iter().map(Requirement::clause).collect();
        let message = format!("Before committing: {}.", clauses.join("; "));
        Self { missing, message }
    }

    /// Requirement codes, as exposed to callers
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.missing.iter().map(Requirement::code).collect()
    }
}

impl fmt::Display for GatingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a gated transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GatingResult {
    /// Transition allowed (or nothing to gate)
    Success,
    /// Transition refused
    Blocked(GatingFailure),
}

impl GatingResult {
    /// Whether the transition may proceed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure details, if blocked
    #[must_use]
    pub fn failure(&self) -> Option<&GatingFailure> {
        match self {
            Self::Success => None,
            Self::Blocked(failure) => Some(failure),
        }
    }

    /// Unmet requirements; empty on success
    #[must_use]
    pub fn missing(&self) -> &[Requirement] {
        match self {
            Self::Success => &[],
            Self::Blocked(failure) => &failure.missing,
        }
    }
}

impl From<Vec<Requirement>> for GatingResult {
    /// Commit outcome from a list of unmet requirements
    fn from(missing: Vec<Requirement>) -> Self {
        if missing.is_empty() {
            Self::Success
        } else {
            Self::Blocked(GatingFailure::commit(missing))
        }
    }
}
