//! Foundry Store
//!
//! Persistence collaborator for the strategy engine:
//! - [`EntityStore`]: find / insert / update / delete over tagged records
//! - [`MemoryStore`]: lock-protected in-memory tables with cascade rules
//! - [`FileStore`]: JSON document on disk, rewritten atomically per write
//! - [`StoreExt`]: typed reads and eager loading of linked records

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod ext;
pub mod file;
pub mod filter;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use ext::{
    LinkedObjective, LinkedProblem, LinkedSignal, ProblemWithLinks, RoadmapItemWithLinks,
    StoreExt, MAX_ANCESTORS,
};
pub use file::FileStore;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use store::EntityStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
