//! Error types for the entity store

use crate::filter::Filter;
use foundry_model::{EntityId, EntityKind, KindMismatch};

/// Entity store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert with an id that is already taken
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: EntityKind, id: EntityId },

    /// Write references an entity that does not exist
    #[error("{kind} references missing {target} '{target_id}'")]
    MissingReference {
        kind: EntityKind,
        target: EntityKind,
        target_id: EntityId,
    },

    /// Filter has no meaning for the queried kind
    #[error("filter {filter:?} does not apply to {kind}")]
    UnsupportedFilter { kind: EntityKind, filter: Filter },

    /// Record or patch kind disagrees with the requested kind
    #[error(transparent)]
    KindMismatch(#[from] KindMismatch),

    /// Backing file I/O failed
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be encoded or decoded
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Whether the caller's request was malformed rather than the store failing
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Duplicate { .. }
                | Self::MissingReference { .. }
                | Self::UnsupportedFilter { .. }
                | Self::KindMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_kind_and_id() {
        let err = StoreError::Duplicate {
            kind: EntityKind::RoadmapItem,
            id: EntityId::from("i1"),
        };
        assert_eq!(err.to_string(), "roadmap item 'i1' already exists");
        assert!(err.is_caller_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_is_retryable() {
        let err = StoreError::from(std::io::Error::other("disk full"));
        assert!(err.is_retryable());
        assert!(!err.is_caller_error());
    }
}
