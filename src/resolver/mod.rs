//! Build-configuration resolution.
//!
//! The resolver is pure and deterministic: it evaluates a recipe's rule
//! tables against explicit inputs and performs no I/O of its own. The only
//! outside call it makes is to the caller's dependency info provider.
//!
//! Resolution runs in two phases, matching the protocol with the external
//! package index:
//!
//! 1. [`Resolver::compute_requirements`]: platform + options -> requirements
//! 2. [`Resolver::compute_variables`]: requirements + dependency facts -> variables
//!
//! [`Resolver::resolve`] composes both against a provider.

pub mod errors;

pub use errors::ResolveError;

use rayon::prelude::*;

use crate::core::dependency_info::{DependencyInfoProvider, DependencyInfoSet};
use crate::core::options::{EffectiveOptions, OptionSet};
use crate::core::platform::PlatformDescriptor;
use crate::core::recipe::Recipe;
use crate::core::requirement::Requirement;
use crate::core::variables::VariableSet;
use crate::rules::{derive_variables, evaluate_requirements, transitive_lookups};

/// Requirements and variables from one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Packages to hand to the package index, in rule order
    pub requirements: Vec<Requirement>,
    /// Variables for the native build generator
    pub variables: VariableSet,
}

/// Evaluates a recipe.
#[derive(Debug, Clone)]
pub struct Resolver {
    recipe: Recipe,
}

impl Resolver {
    pub fn new(recipe: Recipe) -> Self {
        Resolver { recipe }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Options in effect for a platform.
    pub fn effective_options(
        &self,
        platform: &PlatformDescriptor,
        options: &OptionSet,
    ) -> Result<EffectiveOptions, ResolveError> {
        EffectiveOptions::bind(self.recipe.schema(), platform, options)
    }

    /// Phase one: the requirement list for a platform and option set.
    pub fn compute_requirements(
        &self,
        platform: &PlatformDescriptor,
        options: &OptionSet,
    ) -> Result<Vec<Requirement>, ResolveError> {
        let effective = self.effective_options(platform, options)?;
        evaluate_requirements(self.recipe.requirement_rules(), platform, &effective)
    }

    /// Phase two: variables from the requirement list and resolved facts.
    ///
    /// `infos` must cover every requirement, plus any transitive package
    /// whose variable rule gate is open.
    pub fn compute_variables(
        &self,
        platform: &PlatformDescriptor,
        options: &OptionSet,
        requirements: &[Requirement],
        infos: &DependencyInfoSet,
    ) -> Result<VariableSet, ResolveError> {
        let effective = self.effective_options(platform, options)?;
        derive_variables(
            platform,
            &effective,
            requirements,
            self.recipe.variable_rules(),
            infos,
        )
    }

    /// Resolve the variable set, querying `provider` for dependency facts.
    pub fn resolve<P>(
        &self,
        platform: &PlatformDescriptor,
        options: &OptionSet,
        provider: &P,
    ) -> Result<VariableSet, ResolveError>
    where
        P: DependencyInfoProvider + ?Sized,
    {
        self.resolve_full(platform, options, provider)
            .map(|resolution| resolution.variables)
    }

    /// Like [`Resolver::resolve`], also returning the requirement list.
    pub fn resolve_full<P>(
        &self,
        platform: &PlatformDescriptor,
        options: &OptionSet,
        provider: &P,
    ) -> Result<Resolution, ResolveError>
    where
        P: DependencyInfoProvider + ?Sized,
    {
        tracing::debug!("resolving `{}` for {}", self.recipe.name(), platform);

        let effective = self.effective_options(platform, options)?;
        let requirements =
            evaluate_requirements(self.recipe.requirement_rules(), platform, &effective)?;

        let mut infos = DependencyInfoSet::new();
        for req in &requirements {
            infos.insert(provider.lookup(req.package_id(), platform)?);
        }

        let transitive = transitive_lookups(
            self.recipe.variable_rules(),
            platform,
            &requirements,
            &infos,
        );
        for package_id in transitive {
            if !infos.contains(package_id) {
                infos.insert(provider.lookup(package_id, platform)?);
            }
        }

        let variables = derive_variables(
            platform,
            &effective,
            &requirements,
            self.recipe.variable_rules(),
            &infos,
        )?;

        tracing::info!(
            "resolved {} requirements and {} variables for {}",
            requirements.len(),
            variables.len(),
            platform
        );

        Ok(Resolution {
            requirements,
            variables,
        })
    }

    /// Resolve several platform/option combinations in parallel.
    ///
    /// Results come back in input order; each run fails or succeeds on its own.
    pub fn resolve_matrix<P>(
        &self,
        runs: &[(PlatformDescriptor, OptionSet)],
        provider: &P,
    ) -> Vec<Result<Resolution, ResolveError>>
    where
        P: DependencyInfoProvider + Sync + ?Sized,
    {
        runs.par_iter()
            .map(|(platform, options)| self.resolve_full(platform, options, provider))
            .collect()
    }
}
