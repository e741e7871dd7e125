//! Declarative rule tables and the engine that evaluates them.
//!
//! - `requirement`: (platform, options) -> required packages
//! - `variable`: (platform, dependency facts) -> build variables

pub mod requirement;
pub mod variable;

pub use requirement::{evaluate_requirements, RequirementRule};
pub use variable::{
    artifact_dir, derive_variables, normalize_separators, transitive_lookups, ArtifactDir,
    PathVariableRule, VariableKey,
};
