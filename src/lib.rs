//! recipe-resolve - conditional build-configuration resolver
//!
//! Given a target platform and a set of feature toggles, this crate
//! computes the upstream packages a native project requires (with any
//! options forced onto them) and the build variables a native build
//! generator needs to find shared-library artifacts.
//!
//! Resolution is a pure function of its inputs. The one external
//! collaborator is the caller's package index, reached through
//! [`DependencyInfoProvider`].

pub mod core;
pub mod index;
pub mod recipes;
pub mod resolver;
pub mod rules;
pub mod util;

/// Test fixtures and a recording dependency info provider.
///
/// This module is only available when running unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    dependency_info::{DependencyInfo, DependencyInfoProvider, DependencyInfoSet, ProviderError},
    options::{OptionDecl, OptionSchema, OptionSet, OptionValue},
    platform::{BuildType, OsFamily, PlatformDescriptor},
    recipe::Recipe,
    requirement::Requirement,
    variables::{VariableSet, VariableValue},
};

pub use index::PackageIndex;
pub use resolver::{Resolution, ResolveError, Resolver};
