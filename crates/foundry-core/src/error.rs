//! Error types for the workspace service
//!
//! Blocked status transitions are not errors; they come back as
//! [`foundry_strategy::GatingResult`]. What remains here:
//! - store failures
//! - missing entities for operations that need one
//! - rejected input
//! - generation and configuration failures

use crate::ai::GenerationError;
use crate::config::ConfigError;
use foundry_model::{EntityId, EntityKind};
use foundry_store::StoreError;

/// Main workspace error type
#[derive(Debug, thiserror::Error)]
pub enum FoundryError {
    /// Persistence failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Operation needs an entity that does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// Input rejected before reaching the store
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// AI collaborator failed
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FoundryError {
    /// Not-found error for `kind`
    #[inline]
    pub fn not_found(kind: EntityKind, id: &EntityId) -> Self {
        Self::NotFound {
            kind,
            id: id.clone(),
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Generation(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Check if error is a missing entity
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for workspace operations
pub type Result<T, E = FoundryError> = std::result::Result<T, E>;
