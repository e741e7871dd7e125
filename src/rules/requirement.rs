//! Requirement rules and their evaluation.
//!
//! Each rule pairs a requirement template with a platform condition and an
//! option condition. Rules are evaluated in declaration order and produce
//! a requirement list with unique package ids.

use std::collections::HashMap;

use crate::core::condition::{OptionCondition, PlatformCondition};
use crate::core::options::EffectiveOptions;
use crate::core::platform::PlatformDescriptor;
use crate::core::requirement::Requirement;
use crate::resolver::ResolveError;

/// A conditional package requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementRule {
    requirement: Requirement,
    platform: PlatformCondition,
    when: OptionCondition,
}

impl RequirementRule {
    /// A rule that always requires the package.
    pub fn new(requirement: Requirement) -> Self {
        RequirementRule {
            requirement,
            platform: PlatformCondition::any(),
            when: OptionCondition::Always,
        }
    }

    /// Restrict the rule to matching platforms.
    pub fn on(mut self, platform: PlatformCondition) -> Self {
        self.platform = platform;
        self
    }

    /// Gate the rule on option values.
    pub fn when(mut self, condition: OptionCondition) -> Self {
        self.when = condition;
        self
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn platform(&self) -> &PlatformCondition {
        &self.platform
    }

    pub fn condition(&self) -> &OptionCondition {
        &self.when
    }

    /// Check whether the rule fires.
    pub fn matches(&self, platform: &PlatformDescriptor, options: &EffectiveOptions) -> bool {
        self.platform.matches(platform) && self.when.evaluate(options)
    }
}

/// Evaluate requirement rules in order.
///
/// The first matching rule for a package fixes its entry. A later matching
/// rule that agrees is skipped; one that disagrees on version or forced
/// options fails the whole evaluation.
pub fn evaluate_requirements(
    rules: &[RequirementRule],
    platform: &PlatformDescriptor,
    options: &EffectiveOptions,
) -> Result<Vec<Requirement>, ResolveError> {
    let mut requirements: Vec<Requirement> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for rule in rules {
        if !rule.matches(platform, options) {
            tracing::trace!(
                "rule for `{}` does not apply on {}",
                rule.requirement.package_id(),
                platform
            );
            continue;
        }

        let req = &rule.requirement;
        match index.get(req.package_id()) {
            Some(&pos) => {
                let existing = &requirements[pos];
                if !existing.is_compatible_with(req) {
                    return Err(ResolveError::ConflictingRequirement {
                        package: req.package_id().to_string(),
                        first: existing.to_string(),
                        second: req.to_string(),
                    });
                }
                tracing::trace!("`{}` already required", req.package_id());
            }
            None => {
                tracing::debug!("requiring {}", req);
                index.insert(req.package_id(), requirements.len());
                requirements.push(req.clone());
            }
        }
    }

    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::OsClass;
    use crate::core::options::{OptionDecl, OptionSchema, OptionSet};
    use crate::core::platform::{BuildType, OsFamily};

    fn req(reference: &str) -> Requirement {
        Requirement::parse(reference).unwrap()
    }

    fn schema() -> OptionSchema {
        OptionSchema::new().with_option(
            OptionDecl::boolean("with_audio", true)
                .available_on(PlatformCondition::class(OsClass::Interactive)),
        )
    }

    fn eval(
        rules: &[RequirementRule],
        os: OsFamily,
        opts: OptionSet,
    ) -> Result<Vec<Requirement>, ResolveError> {
        let platform = PlatformDescriptor::new(os, "x86_64", "gcc", BuildType::Release);
        let effective = EffectiveOptions::bind(&schema(), &platform, &opts)?;
        evaluate_requirements(rules, &platform, &effective)
    }

    fn ids(reqs: &[Requirement]) -> Vec<&str> {
        reqs.iter().map(|r| r.package_id()).collect()
    }

    fn rules() -> Vec<RequirementRule> {
        vec![
            RequirementRule::new(req("popl/1.3.0")),
            RequirementRule::new(req("sdl/2.28.5"))
                .on(PlatformCondition::class(OsClass::Interactive)),
            RequirementRule::new(req("sdl_mixer/2.8.0"))
                .when(OptionCondition::is_true("with_audio")),
        ]
    }

    #[test]
    fn test_declared_order_preserved() {
        let reqs = eval(&rules(), OsFamily::Linux, OptionSet::new()).unwrap();
        assert_eq!(ids(&reqs), vec!["popl", "sdl", "sdl_mixer"]);
    }

    #[test]
    fn test_bare_metal_drops_interactive_packages() {
        let reqs = eval(
            &rules(),
            OsFamily::BareMetal,
            OptionSet::new().with("with_audio", true),
        )
        .unwrap();
        assert_eq!(ids(&reqs), vec!["popl"]);
    }

    #[test]
    fn test_option_gated_package() {
        let reqs = eval(
            &rules(),
            OsFamily::Windows,
            OptionSet::new().with("with_audio", false),
        )
        .unwrap();
        assert_eq!(ids(&reqs), vec!["popl", "sdl"]);
    }

    #[test]
    fn test_agreeing_duplicates_collapse() {
        let mut rules = rules();
        rules.push(RequirementRule::new(req("popl/1.3.0")));
        let reqs = eval(&rules, OsFamily::Linux, OptionSet::new()).unwrap();
        assert_eq!(ids(&reqs).iter().filter(|id| **id == "popl").count(), 1);
    }

    #[test]
    fn test_conflicting_forced_options() {
        let rules = vec![
            RequirementRule::new(req("sdl/2.28.5").with_forced("shared", true)),
            RequirementRule::new(req("sdl/2.28.5").with_forced("shared", false))
                .on(PlatformCondition::os([OsFamily::Linux])),
        ];

        let err = eval(&rules, OsFamily::Linux, OptionSet::new()).unwrap_err();
        match err {
            ResolveError::ConflictingRequirement { package, first, second } => {
                assert_eq!(package, "sdl");
                assert!(first.contains("shared=true"));
                assert!(second.contains("shared=false"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // The predicates do not overlap on Windows.
        assert!(eval(&rules, OsFamily::Windows, OptionSet::new()).is_ok());
    }

    #[test]
    fn test_conflicting_versions() {
        let rules = vec![
            RequirementRule::new(req("sdl/2.28.5")),
            RequirementRule::new(req("sdl/2.30.0")),
        ];
        assert!(matches!(
            eval(&rules, OsFamily::Macos, OptionSet::new()),
            Err(ResolveError::ConflictingRequirement { .. })
        ));
    }
}
