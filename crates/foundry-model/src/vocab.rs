//! Closed vocabularies used by entity records
//!
//! Every status and tag that the workspace stores is a closed enum with a
//! stable wire spelling. The spelling is what serde writes, what
//! [`std::str::FromStr`] accepts, and what graph nodes expose as status text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire spelling does not name any variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} value: '{value}'")]
pub struct UnknownVariant {
    /// Vocabulary name, e.g. `roadmap status`
    pub vocabulary: &'static str,
    /// Rejected input
    pub value: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable wire spelling
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        vocabulary: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Signal lifecycle
    SignalStatus("signal status") {
        /// Captured, not yet triaged
        New => "new",
        /// Turned into one or more problems
        Processed => "processed",
        /// Triaged away
        Discarded => "discarded",
    }
}

vocabulary! {
    /// Problem lifecycle
    ProblemStatus("problem status") {
        /// Initial state on create
        Draft => "draft",
        /// Statement refined
        Shaped => "shaped",
        /// Put forward for acceptance
        Proposed => "proposed",
        /// Validated; justifies roadmap work
        Accepted => "accepted",
        /// Not worth solving
        Rejected => "rejected",
    }
}

vocabulary! {
    /// Roadmap item lifecycle
    RoadmapStatus("roadmap status") {
        /// Candidate work
        Proposed => "proposed",
        /// Committed work; gated
        Committed => "committed",
        /// Being delivered
        InProgress => "in-progress",
        /// Delivered
        Done => "done",
    }
}

impl RoadmapStatus {
    /// Whether the status claims a commitment that must be justified.
    ///
    /// `in-progress` and `done` carry the same claim as `committed`.
    #[inline]
    #[must_use]
    pub fn claims_commitment(&self) -> bool {
        matches!(self, Self::Committed | Self::InProgress | Self::Done)
    }
}

impl Default for RoadmapStatus {
    fn default() -> Self {
        Self::Proposed
    }
}

vocabulary! {
    /// Roadmap hierarchy level
    RoadmapItemType("roadmap item type") {
        /// Top level
        Initiative => "initiative",
        /// Child of an initiative
        Epic => "epic",
        /// Child of an epic (legacy: of an initiative)
        Feature => "feature",
    }
}

impl Default for RoadmapItemType {
    fn default() -> Self {
        Self::Feature
    }
}

vocabulary! {
    /// PRD lifecycle
    PrdStatus("prd status") {
        /// Being written
        Draft => "draft",
        /// Under review
        Review => "review",
        /// Open questions closed and acceptance criteria present
        Ready => "ready",
    }
}

vocabulary! {
    /// Release lifecycle
    ReleaseStatus("release status") {
        /// Scheduled
        Planned => "planned",
        /// Currently shipping
        Active => "active",
        /// Shipped
        Released => "released",
    }
}

vocabulary! {
    /// Pain severity shared by signals, problems, and AI suggestions
    Severity("severity") {
        /// Blocking
        Critical => "critical",
        /// Serious
        High => "high",
        /// Noticeable
        Medium => "medium",
        /// Minor
        Low => "low",
    }
}

vocabulary! {
    /// How often the pain occurs
    Frequency("frequency") {
        /// Every day
        Daily => "daily",
        /// Every week
        Weekly => "weekly",
        /// Every month
        Monthly => "monthly",
        /// Seldom
        Rare => "rare",
    }
}

vocabulary! {
    /// Where a signal was captured
    SignalSource("signal source") {
        /// Call recordings
        Gong => "gong",
        /// Support tickets
        Zendesk => "zendesk",
        /// Email threads
        Email => "email",
        /// Chat
        Slack => "slack",
        /// Anything else
        Other => "other",
    }
}

vocabulary! {
    /// Renewal risk attached to a signal's account
    RenewalRisk("renewal risk") {
        /// Likely to churn
        High => "high",
        /// Watch
        Medium => "medium",
        /// Safe
        Low => "low",
    }
}

vocabulary! {
    /// Whether a problem drives retention, growth, or both
    RetentionOrGrowth("retention or growth") {
        /// Keeps customers
        Retention => "retention",
        /// Wins customers
        Growth => "growth",
        /// Both
        Both => "both",
    }
}

vocabulary! {
    /// T-shirt effort size
    EffortSize("effort size") {
        /// Extra small
        Xs => "XS",
        /// Small
        S => "S",
        /// Medium
        M => "M",
        /// Large
        L => "L",
        /// Extra large
        Xl => "XL",
    }
}
