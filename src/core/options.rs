//! Option schema, requested option values and the options in effect.
//!
//! - `OptionSchema` declares every option a recipe understands, its default,
//!   and on which platforms it exists.
//! - `OptionSet` is what the caller asked for.
//! - `EffectiveOptions` binds the two to a platform. It is the only view
//!   rules ever read, and it never fails a lookup.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::condition::PlatformCondition;
use crate::core::platform::PlatformDescriptor;
use crate::resolver::ResolveError;

/// Value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Enum(String),
}

/// Value read for options that do not apply to the current platform.
pub const NOT_APPLICABLE: OptionValue = OptionValue::Bool(false);

impl OptionValue {
    /// True only for `Bool(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, OptionValue::Bool(true))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Enum(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Enum(s) => Some(s),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Enum(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Enum(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Enum(s)
    }
}

/// Kind of values an option accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    /// One of a fixed set of names
    Enum { values: Vec<String> },
}

/// Declaration of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    name: String,
    kind: OptionKind,
    default: OptionValue,
    availability: PlatformCondition,
}

impl OptionDecl {
    /// Declare a boolean option.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        OptionDecl {
            name: name.into(),
            kind: OptionKind::Bool,
            default: OptionValue::Bool(default),
            availability: PlatformCondition::any(),
        }
    }

    /// Declare an enum option. The default must be one of `values`.
    pub fn enumeration(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
        default: impl Into<String>,
    ) -> Self {
        OptionDecl {
            name: name.into(),
            kind: OptionKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
            default: OptionValue::Enum(default.into()),
            availability: PlatformCondition::any(),
        }
    }

    /// Only declare this option on matching platforms.
    pub fn available_on(mut self, condition: PlatformCondition) -> Self {
        self.availability = condition;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }

    pub fn availability(&self) -> &PlatformCondition {
        &self.availability
    }

    /// Check whether the option exists on the platform.
    pub fn is_available(&self, platform: &PlatformDescriptor) -> bool {
        self.availability.matches(platform)
    }

    /// Check that a value fits this declaration.
    pub fn validate(&self, value: &OptionValue) -> Result<(), ResolveError> {
        match (&self.kind, value) {
            (OptionKind::Bool, OptionValue::Bool(_)) => Ok(()),
            (OptionKind::Enum { values }, OptionValue::Enum(v)) => {
                if values.iter().any(|allowed| allowed == v) {
                    Ok(())
                } else {
                    Err(ResolveError::InvalidOption {
                        name: self.name.clone(),
                        message: format!("`{}` is not one of: {}", v, values.join(", ")),
                    })
                }
            }
            (OptionKind::Bool, OptionValue::Enum(v)) => Err(ResolveError::InvalidOption {
                name: self.name.clone(),
                message: format!("expected a boolean, found `{}`", v),
            }),
            (OptionKind::Enum { .. }, OptionValue::Bool(b)) => Err(ResolveError::InvalidOption {
                name: self.name.clone(),
                message: format!("expected one of the declared values, found `{}`", b),
            }),
        }
    }
}

/// Ordered set of option declarations with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    decls: Vec<OptionDecl>,
}

impl OptionSchema {
    pub fn new() -> Self {
        OptionSchema::default()
    }

    /// Add a declaration, replacing any earlier one with the same name.
    pub fn with_option(mut self, decl: OptionDecl) -> Self {
        self.insert(decl);
        self
    }

    /// Add a declaration, replacing any earlier one with the same name.
    pub fn insert(&mut self, decl: OptionDecl) {
        match self.decls.iter_mut().find(|d| d.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.decls.push(decl),
        }
    }

    /// Look up a declaration.
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All declarations, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.decls.iter()
    }

    /// Declarations that exist on the given platform.
    pub fn applicable<'a>(
        &'a self,
        platform: &'a PlatformDescriptor,
    ) -> impl Iterator<Item = &'a OptionDecl> + 'a {
        self.decls.iter().filter(move |d| d.is_available(platform))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Option values requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    values: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Request a value for an option.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

/// The options in effect for one platform.
///
/// Holds exactly the options the schema makes available on the platform,
/// with caller values applied over defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveOptions {
    values: BTreeMap<String, OptionValue>,
}

impl EffectiveOptions {
    /// Bind requested values to a schema and platform.
    ///
    /// Requested values for options the schema does not declare, or that
    /// are unavailable on the platform, are dropped. A value of the wrong
    /// kind for an applicable option is an `InvalidOption` error.
    pub fn bind(
        schema: &OptionSchema,
        platform: &PlatformDescriptor,
        requested: &OptionSet,
    ) -> Result<Self, ResolveError> {
        let mut values = BTreeMap::new();

        for decl in schema.applicable(platform) {
            let value = match requested.get(decl.name()) {
                Some(v) => {
                    decl.validate(v)?;
                    v.clone()
                }
                None => decl.default_value().clone(),
            };
            values.insert(decl.name().to_string(), value);
        }

        for (name, _) in requested.iter() {
            if !schema.contains(name) {
                tracing::warn!("ignoring unknown option `{}`", name);
            } else if !values.contains_key(name) {
                tracing::debug!("option `{}` does not apply to {}", name, platform);
            }
        }

        Ok(EffectiveOptions { values })
    }

    /// Read an option. Never fails: inapplicable options read as
    /// [`NOT_APPLICABLE`].
    pub fn get(&self, name: &str) -> &OptionValue {
        self.values.get(name).unwrap_or(&NOT_APPLICABLE)
    }

    pub fn is_true(&self, name: &str) -> bool {
        self.get(name).is_true()
    }

    pub fn is_applicable(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Applicable options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::OsClass;
    use crate::core::platform::{BuildType, OsFamily};

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .with_option(OptionDecl::boolean("shared", false))
            .with_option(
                OptionDecl::boolean("with_audio", true)
                    .available_on(PlatformCondition::class(OsClass::Interactive)),
            )
            .with_option(OptionDecl::enumeration(
                "renderer",
                ["opengl", "software"],
                "opengl",
            ))
    }

    fn platform(os: OsFamily) -> PlatformDescriptor {
        PlatformDescriptor::new(os, "x86_64", "gcc", BuildType::Release)
    }

    #[test]
    fn test_defaults_fill_in() {
        let eff = EffectiveOptions::bind(&schema(), &platform(OsFamily::Linux), &OptionSet::new())
            .unwrap();
        assert!(!eff.is_true("shared"));
        assert!(eff.is_true("with_audio"));
        assert_eq!(eff.get("renderer"), &OptionValue::from("opengl"));
    }

    #[test]
    fn test_requested_values_override_defaults() {
        let requested = OptionSet::new()
            .with("with_audio", false)
            .with("renderer", "software");
        let eff = EffectiveOptions::bind(&schema(), &platform(OsFamily::Linux), &requested)
            .unwrap();
        assert!(!eff.is_true("with_audio"));
        assert_eq!(eff.get("renderer").as_str(), Some("software"));
    }

    #[test]
    fn test_unavailable_option_is_not_applicable() {
        let requested = OptionSet::new().with("with_audio", true);
        let eff = EffectiveOptions::bind(&schema(), &platform(OsFamily::BareMetal), &requested)
            .unwrap();
        assert!(!eff.is_applicable("with_audio"));
        assert_eq!(eff.get("with_audio"), &NOT_APPLICABLE);
        assert!(eff.iter().all(|(name, _)| name != "with_audio"));
    }

    #[test]
    fn test_unknown_option_reads_as_not_applicable() {
        let requested = OptionSet::new().with("turbo", true);
        let eff = EffectiveOptions::bind(&schema(), &platform(OsFamily::Linux), &requested)
            .unwrap();
        assert_eq!(eff.get("turbo"), &NOT_APPLICABLE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_enum = OptionSet::new().with("renderer", "vulkan");
        let err = EffectiveOptions::bind(&schema(), &platform(OsFamily::Linux), &bad_enum)
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidOption { ref name, .. } if name == "renderer"));

        let bad_kind = OptionSet::new().with("shared", "yes");
        assert!(
            EffectiveOptions::bind(&schema(), &platform(OsFamily::Linux), &bad_kind).is_err()
        );
    }

    #[test]
    fn test_schema_replaces_duplicate_names() {
        let schema = OptionSchema::new()
            .with_option(OptionDecl::boolean("shared", false))
            .with_option(OptionDecl::boolean("shared", true));
        assert_eq!(schema.len(), 1);
        assert_eq!(
            schema.get("shared").unwrap().default_value(),
            &OptionValue::Bool(true)
        );
    }
}
