//! Tagged record envelope exchanged with the entity store

use crate::entity::{
    EntityKind, Objective, Prd, Problem, Release, RoadmapItem, RoadmapItemObjective,
    RoadmapItemProblem, Signal, SignalProblem,
};
use crate::id::EntityId;
use serde::{Deserialize, Serialize};

/// One stored row of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Record {
    /// Signal row
    Signal(Signal),
    /// Problem row
    Problem(Problem),
    /// Objective row
    Objective(Objective),
    /// Roadmap item row
    RoadmapItem(RoadmapItem),
    /// Release row
    Release(Release),
    /// PRD row
    Prd(Prd),
    /// Signal/problem junction row
    SignalProblem(SignalProblem),
    /// Roadmap item/problem junction row
    RoadmapItemProblem(RoadmapItemProblem),
    /// Roadmap item/objective junction row
    RoadmapItemObjective(RoadmapItemObjective),
}

/// A record did not have the expected kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} record, found {found}")]
pub struct KindMismatch {
    /// Kind the caller asked for
    pub expected: EntityKind,
    /// Kind the record carries
    pub found: EntityKind,
}

macro_rules! record_conversions {
    ($($variant:ident),+ $(,)?) => {
        impl Record {
            /// Kind of this record
            #[must_use]
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Record::$variant(_) => EntityKind::$variant,)+
                }
            }

            /// Identifier of this record
            #[must_use]
            pub fn id(&self) -> &EntityId {
                match self {
                    $(Record::$variant(r) => &r.id,)+
                }
            }
        }

        $(
            impl From<$variant> for Record {
                fn from(value: $variant) -> Self {
                    Record::$variant(value)
                }
            }

            impl TryFrom<Record> for $variant {
                type Error = KindMismatch;

                fn try_from(value: Record) -> Result<Self, Self::Error> {
                    match value {
                        Record::$variant(inner) => Ok(inner),
                        other => Err(KindMismatch {
                            expected: EntityKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }
            }
        )+
    };
}

record_conversions!(
    Signal,
    Problem,
    Objective,
    RoadmapItem,
    Release,
    Prd,
    SignalProblem,
    RoadmapItemProblem,
    RoadmapItemObjective,
);

/// Convert a batch of records into one concrete kind
///
/// # Errors
/// Fails on the first record of another kind.
pub fn downcast_all<T>(records: Vec<Record>) -> Result<Vec<T>, KindMismatch>
where
    T: TryFrom<Record, Error = KindMismatch>,
{
    records.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::RoadmapItemType;

    #[test]
    fn round_trips_through_envelope() {
        let problem = Problem::new("Slow export", "Exports time out").with_id("p1");
        let record = Record::from(problem.clone());
        assert_eq!(record.kind(), EntityKind::Problem);
        assert_eq!(record.id().as_str(), "p1");
        assert_eq!(Problem::try_from(record).unwrap(), problem);
    }

    #[test]
    fn wrong_kind_is_reported() {
        let record = Record::from(RoadmapItem::new("x", RoadmapItemType::Epic));
        let err = Problem::try_from(record).unwrap_err();
        assert_eq!(err.expected, EntityKind::Problem);
        assert_eq!(err.found, EntityKind::RoadmapItem);
    }
}
