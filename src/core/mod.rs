//! Core data structures.
//!
//! This module contains the values a resolution run is built from:
//! - Platform descriptors and option schemas/sets
//! - Requirements handed to the package index
//! - Dependency facts reported back by it
//! - The resulting variable set
//! - Recipes bundling the rule tables

pub mod condition;
pub mod dependency_info;
pub mod manifest;
pub mod options;
pub mod platform;
pub mod recipe;
pub mod requirement;
pub mod variables;

pub use condition::{OptionCondition, OsClass, PlatformCondition};
pub use dependency_info::{DependencyInfo, DependencyInfoProvider, DependencyInfoSet};
pub use manifest::RECIPE_FILE_NAME;
pub use options::{EffectiveOptions, OptionDecl, OptionSchema, OptionSet, OptionValue};
pub use platform::{BuildType, OsFamily, PlatformDescriptor};
pub use recipe::Recipe;
pub use requirement::Requirement;
pub use variables::{VariableSet, VariableValue};
