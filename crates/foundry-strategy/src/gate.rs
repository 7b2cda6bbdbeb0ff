//! Status Gate
//!
//! Decides whether a single status transition may proceed. The gate is a
//! pure function of the requested status and the links in a
//! [`JustificationIndex`]; it never writes.
//!
//! - Problem → `accepted` needs at least one roadmap item link.
//! - Roadmap item → `committed` needs the type-specific links, with accepted
//!   problems inherited from up to two ancestors.
//! - Every other transition is allowed.

use crate::index::JustificationIndex;
use crate::requirement::{GatingFailure, GatingResult};
use foundry_model::{EntityId, ProblemStatus, RoadmapItem, RoadmapStatus};
use tracing::debug;

/// Gate a problem status change
#[must_use]
pub fn check_problem_transition(
    index: &JustificationIndex,
    problem_id: &EntityId,
    target: ProblemStatus,
) -> GatingResult {
    if target != ProblemStatus::Accepted {
        return GatingResult::Success;
    }
    let links = index.roadmap_links_for_problem(problem_id);
    debug!(problem = %problem_id, links, "checking problem acceptance");
    if links == 0 {
        GatingResult::Blocked(GatingFailure::problem_unlinked())
    } else {
        GatingResult::Success
    }
}

/// Whether moving from `current` to `target` needs the commit check
///
/// Only an entry into `committed` is gated.
#[inline]
#[must_use]
pub fn requires_commit_check(current: RoadmapStatus, target: RoadmapStatus) -> bool {
    target == RoadmapStatus::Committed && current != RoadmapStatus::Committed
}

/// Gate a roadmap item status change
///
/// `pending` carries the effective type and parent (stored values overlaid
/// with the requested change); `current` is the stored status. Items that
/// are already committed are not re-validated.
#[must_use]
pub fn check_roadmap_transition(
    index: &JustificationIndex,
    pending: &RoadmapItem,
    current: RoadmapStatus,
    target: RoadmapStatus,
) -> GatingResult {
    if !requires_commit_check(current, target) {
        return GatingResult::Success;
    }
    let missing = index.missing_for(pending);
    debug!(
        item = %pending.id,
        item_type = %pending.item_type,
        missing = missing.len(),
        "checking roadmap commit"
    );
    GatingResult::from(missing)
}
