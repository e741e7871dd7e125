//! Package requirements.
//!
//! A Requirement is what the resolver hands to the external package index:
//! a package name, a version constraint and any options the recipe forces
//! onto that package.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use semver::VersionReq;
use serde::Serialize;

use crate::core::options::OptionValue;
use crate::resolver::ResolveError;

/// A request for an upstream package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// Package name
    package_id: String,

    /// Version text as written in the reference
    version: String,

    /// Parsed version constraint
    #[serde(skip)]
    version_req: VersionReq,

    /// Options forced onto the package
    forced_options: BTreeMap<String, OptionValue>,
}

impl Requirement {
    /// Create a requirement from a name and version constraint text.
    ///
    /// The package id must be non-empty and use only ASCII alphanumerics
    /// and `_ - . +`, since it also forms variable keys.
    pub fn new(package_id: impl Into<String>, version: &str) -> Result<Self, ResolveError> {
        let package_id = package_id.into();
        let invalid = |reason: String| ResolveError::InvalidReference {
            reference: format!("{}/{}", package_id, version),
            reason,
        };

        if package_id.is_empty() {
            return Err(invalid("package name is empty".to_string()));
        }
        if !package_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
        {
            return Err(invalid("package name contains invalid characters".to_string()));
        }
        let version_req = VersionReq::parse(version).map_err(|e| invalid(e.to_string()))?;

        Ok(Requirement {
            package_id,
            version: version.to_string(),
            version_req,
            forced_options: BTreeMap::new(),
        })
    }

    /// Parse a `name/version` reference.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: &str| ResolveError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        // Drop an optional `@user/channel` suffix.
        let reference_core = reference.split('@').next().unwrap_or(reference);
        let (name, version) = reference_core
            .split_once('/')
            .ok_or_else(|| invalid("expected `name/version`"))?;

        if version.is_empty() {
            return Err(invalid("version is empty"));
        }

        Requirement::new(name, version)
    }

    /// Force an option onto the package.
    pub fn with_forced(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.forced_options.insert(name.into(), value.into());
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    pub fn forced_options(&self) -> &BTreeMap<String, OptionValue> {
        &self.forced_options
    }

    /// The `name/version` reference.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.package_id, self.version)
    }

    /// Check whether two requirements for the same package agree.
    pub fn is_compatible_with(&self, other: &Requirement) -> bool {
        self.package_id == other.package_id
            && self.version_req == other.version_req
            && self.forced_options == other.forced_options
    }

    /// Render forced options as `a=1, b=false`.
    pub fn forced_summary(&self) -> String {
        if self.forced_options.is_empty() {
            return "(none)".to_string();
        }
        self.forced_options
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Requirement {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())?;
        if !self.forced_options.is_empty() {
            write!(f, " [{}]", self.forced_summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let req = Requirement::parse("nlohmann_json/3.11.3").unwrap();
        assert_eq!(req.package_id(), "nlohmann_json");
        assert_eq!(req.version(), "3.11.3");
        assert!(req.version_req().matches(&semver::Version::new(3, 11, 3)));
        assert_eq!(req.reference(), "nlohmann_json/3.11.3");
    }

    #[test]
    fn test_parse_reference_with_channel() {
        let req = Requirement::parse("sdl/2.28.5@arcade/stable").unwrap();
        assert_eq!(req.package_id(), "sdl");
        assert_eq!(req.version(), "2.28.5");
    }

    #[test]
    fn test_parse_rejects_bad_references() {
        assert!(Requirement::parse("sdl").is_err());
        assert!(Requirement::parse("/1.0.0").is_err());
        assert!(Requirement::parse("sdl/").is_err());
        assert!(Requirement::parse("sd l/1.0.0").is_err());
        assert!(Requirement::parse("sdl/not-a-version").is_err());
    }

    #[test]
    fn test_new_checks_package_name() {
        let err = Requirement::new("", "1.0.0").unwrap_err();
        assert!(
            matches!(err, ResolveError::InvalidReference { ref reason, .. } if reason == "package name is empty")
        );
        assert!(Requirement::new("sd l", "1.0.0").is_err());
        assert!(Requirement::new("sdl/extra", "1.0.0").is_err());
        assert!(Requirement::new("sdl_mixer", "2.8.0").is_ok());
    }

    #[test]
    fn test_compatibility() {
        let a = Requirement::parse("sdl_mixer/2.8.0")
            .unwrap()
            .with_forced("flac", false);
        let b = Requirement::parse("sdl_mixer/2.8.0")
            .unwrap()
            .with_forced("flac", false);
        let c = Requirement::parse("sdl_mixer/2.8.0")
            .unwrap()
            .with_forced("flac", true);

        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
    }

    #[test]
    fn test_display() {
        let req = Requirement::parse("mach_emu/1.6.2")
            .unwrap()
            .with_forced("with_zlib", true);
        assert_eq!(req.to_string(), "mach_emu/1.6.2 [with_zlib=true]");
    }
}
