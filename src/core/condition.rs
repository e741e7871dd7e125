//! Predicates evaluated by the rule tables.
//!
//! A rule fires only when both its platform condition and its option
//! condition hold. Every predicate here is total: an option that does not
//! apply to the current platform simply reads as not applicable.

use serde::{Deserialize, Serialize};

use crate::core::options::{EffectiveOptions, OptionValue};
use crate::core::platform::{BuildType, OsFamily, PlatformDescriptor};

/// Coarse OS classes used by platform conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsClass {
    Windows,
    Posix,
    /// Any platform that can host a display (everything but bare metal)
    Interactive,
    BareMetal,
}

impl OsClass {
    /// Check whether an OS belongs to this class.
    pub fn contains(&self, os: OsFamily) -> bool {
        match self {
            OsClass::Windows => os.is_windows(),
            OsClass::Posix => os.is_posix(),
            OsClass::Interactive => os.is_interactive(),
            OsClass::BareMetal => os.is_bare_metal(),
        }
    }
}

/// Platform condition for rules and option availability.
///
/// Empty lists match anything. Non-empty lists match when the platform
/// value is one of the listed entries. All present fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformCondition {
    /// Operating systems: "linux", "macos", "windows", ...
    pub os: Vec<OsFamily>,

    /// OS class: "windows", "posix", "interactive", "bare-metal"
    pub class: Option<OsClass>,

    /// CPU architectures: "x86_64", "armv8", ...
    pub arch: Vec<String>,

    /// Compiler names: "gcc", "clang", "msvc", ...
    pub compiler: Vec<String>,

    /// Build types
    pub build_type: Vec<BuildType>,

    /// Invert the whole condition
    pub negate: bool,
}

impl PlatformCondition {
    /// A condition matching every platform.
    pub fn any() -> Self {
        PlatformCondition::default()
    }

    /// Match a single OS class.
    pub fn class(class: OsClass) -> Self {
        PlatformCondition {
            class: Some(class),
            ..Default::default()
        }
    }

    /// Match any of the given operating systems.
    pub fn os(os: impl IntoIterator<Item = OsFamily>) -> Self {
        PlatformCondition {
            os: os.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Restrict to the given architectures.
    pub fn with_arch(mut self, arch: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.arch = arch.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given compilers.
    pub fn with_compiler(mut self, compiler: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.compiler = compiler.into_iter().map(Into::into).collect();
        self
    }

    /// Invert the condition.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Check if this condition matches the platform.
    pub fn matches(&self, platform: &PlatformDescriptor) -> bool {
        self.matches_positive(platform) != self.negate
    }

    fn matches_positive(&self, platform: &PlatformDescriptor) -> bool {
        if !self.os.is_empty() && !self.os.contains(&platform.os()) {
            return false;
        }
        if let Some(class) = self.class {
            if !class.contains(platform.os()) {
                return false;
            }
        }
        if !self.arch.is_empty() && !self.arch.iter().any(|a| a == platform.arch()) {
            return false;
        }
        if !self.compiler.is_empty() && !self.compiler.iter().any(|c| c == platform.compiler())
        {
            return false;
        }
        if !self.build_type.is_empty() && !self.build_type.contains(&platform.build_type()) {
            return false;
        }
        true
    }
}

/// Condition over effective option values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionCondition {
    #[default]
    Always,
    IsTrue(String),
    IsFalse(String),
    Equals { option: String, value: OptionValue },
    All(Vec<OptionCondition>),
    Any(Vec<OptionCondition>),
    Not(Box<OptionCondition>),
}

impl OptionCondition {
    pub fn is_true(option: impl Into<String>) -> Self {
        OptionCondition::IsTrue(option.into())
    }

    pub fn is_false(option: impl Into<String>) -> Self {
        OptionCondition::IsFalse(option.into())
    }

    pub fn equals(option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        OptionCondition::Equals {
            option: option.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the options in effect for a platform.
    ///
    /// `IsFalse` only holds for an applicable option set to false; an
    /// option missing from the platform's schema satisfies neither
    /// `IsTrue` nor `IsFalse`.
    pub fn evaluate(&self, options: &EffectiveOptions) -> bool {
        match self {
            OptionCondition::Always => true,
            OptionCondition::IsTrue(name) => options.get(name).is_true(),
            OptionCondition::IsFalse(name) => {
                options.is_applicable(name) && !options.get(name).is_true()
            }
            OptionCondition::Equals { option, value } => {
                options.is_applicable(option) && options.get(option) == value
            }
            OptionCondition::All(conds) => conds.iter().all(|c| c.evaluate(options)),
            OptionCondition::Any(conds) => conds.iter().any(|c| c.evaluate(options)),
            OptionCondition::Not(cond) => !cond.evaluate(options),
        }
    }

    /// Option names referenced by this condition.
    pub fn referenced_options(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            OptionCondition::Always => {}
            OptionCondition::IsTrue(name) | OptionCondition::IsFalse(name) => names.push(name),
            OptionCondition::Equals { option, .. } => names.push(option),
            OptionCondition::All(conds) | OptionCondition::Any(conds) => {
                for c in conds {
                    c.collect_names(names);
                }
            }
            OptionCondition::Not(cond) => cond.collect_names(names),
        }
    }
}
