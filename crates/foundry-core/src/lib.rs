//! Foundry Core
//!
//! The workspace service that sits between callers and the entity store:
//! - Gated status updates for problems and roadmap items
//! - RICE score derivation on every roadmap write
//! - Strategy graph and orphan counts over the current state
//! - AI suggestion flows that only write once a human accepts
//!
//! # Example
//!
//! ```rust,ignore
//! use foundry_core::{FoundryConfig, Workspace};
//! use foundry_model::{ProblemPatch, ProblemStatus};
//! use foundry_store::FileStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FoundryConfig::from_env();
//! let workspace = Workspace::new(FileStore::open(&config.data_path).await?);
//!
//! let result = workspace
//!     .update_problem(&"p1".into(), ProblemPatch::status(ProblemStatus::Accepted))
//!     .await?;
//! if let Some(failure) = result.failure() {
//!     println!("{}", failure.message);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod ai;
pub mod config;
pub mod error;
pub mod workspace;

pub use ai::{
    DimensionSuggestion, ExtractedQuote, ExtractionResult, GenerationError, InsightGenerator,
    MissingMetadata, ScoreSuggestion, ScoringContext, ScoringObjective, ScoringProblem,
    Sentiment, SignalContext, SuggestedProblem,
};
pub use config::{AiConfig, AiProvider, ConfigError, FoundryConfig};
pub use error::{FoundryError, Result};
pub use workspace::{Workspace, OBJECTIVE_WEIGHT_RANGE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
