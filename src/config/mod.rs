//! Engine configuration.
//!
//! Loads an [`EngineConfig`] from YAML, applies `CMDTREE_*` environment
//! overrides and validates the result.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult};
pub use schema::{CoordinatorKind, EngineConfig};
pub use validation::{ValidationResult, Validator};
