//! Variable derivation rules.
//!
//! Turns the requirement list plus the dependency facts reported by the
//! package index into build variables:
//!
//! - one path variable per shared-linkage dependency, pointing at the
//!   directory its runtime artifacts are loaded from
//! - one feature-flag variable per option in effect on the platform
//!
//! The directory choice lives in [`ArtifactDir::for_os`] and nowhere else.

use std::path::{Path, PathBuf};

use crate::core::condition::PlatformCondition;
use crate::core::dependency_info::{DependencyInfo, DependencyInfoSet};
use crate::core::options::EffectiveOptions;
use crate::core::platform::{OsFamily, PlatformDescriptor};
use crate::core::requirement::Requirement;
use crate::core::variables::{VariableSet, VariableValue};
use crate::resolver::ResolveError;

/// Which artifact directory of a dependency is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactDir {
    /// Runtime directory (DLLs live next to executables on Windows)
    Binary,
    /// Library directory (shared objects on Posix)
    Library,
}

impl ArtifactDir {
    /// Windows family loads shared libraries from the binary directory;
    /// every other platform from the library directory.
    pub fn for_os(os: OsFamily) -> Self {
        if os.is_windows() {
            ArtifactDir::Binary
        } else {
            ArtifactDir::Library
        }
    }

    /// Key suffix for derived variable names.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactDir::Binary => "BinDir",
            ArtifactDir::Library => "LibDir",
        }
    }

    /// Pick the matching directory out of a dependency's facts.
    pub fn select<'a>(&self, info: &'a DependencyInfo) -> &'a Path {
        match self {
            ArtifactDir::Binary => info.binary_dir(),
            ArtifactDir::Library => info.library_dir(),
        }
    }
}

/// The separator-normalized directory to surface for a dependency.
pub fn artifact_dir(
    os: OsFamily,
    info: &DependencyInfo,
) -> Result<(ArtifactDir, PathBuf), ResolveError> {
    let kind = ArtifactDir::for_os(os);
    Ok((kind, normalize_separators(kind.select(info))?))
}

/// Replace backslashes with forward slashes.
///
/// Every other byte of the path is kept as reported.
#[cfg(unix)]
pub fn normalize_separators(path: &Path) -> Result<PathBuf, ResolveError> {
    use std::ffi::OsString;
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = path
        .as_os_str()
        .as_bytes()
        .iter()
        .map(|&b| if b == b'\\' { b'/' } else { b })
        .collect();
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

/// Replace backslashes with forward slashes.
///
/// Paths that are not valid Unicode are rejected rather than rewritten
/// lossily.
#[cfg(not(unix))]
pub fn normalize_separators(path: &Path) -> Result<PathBuf, ResolveError> {
    let text = path.to_str().ok_or_else(|| ResolveError::InvalidPath {
        path: path.to_string_lossy().into_owned(),
    })?;
    Ok(PathBuf::from(text.replace('\\', "/")))
}

/// `sdl_mixer` -> `sdlMixer`, `nlohmann-json` -> `nlohmannJson`.
pub fn camel_case_stem(package_id: &str) -> String {
    let mut stem = String::with_capacity(package_id.len());
    let mut upper_next = false;

    for c in package_id.chars() {
        if matches!(c, '_' | '-' | '.') {
            upper_next = !stem.is_empty();
            continue;
        }
        if upper_next {
            stem.extend(c.to_uppercase());
            upper_next = false;
        } else {
            stem.push(c);
        }
    }

    stem
}

/// How a path variable's key is formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKey {
    /// `<stem>BinDir` or `<stem>LibDir` depending on the directory chosen
    Derived { stem: String },
    /// Exactly this key on every platform
    Fixed(String),
}

impl VariableKey {
    /// Derive the key from the package id.
    pub fn for_package(package_id: &str) -> Self {
        VariableKey::Derived {
            stem: camel_case_stem(package_id),
        }
    }

    pub fn render(&self, dir: ArtifactDir) -> String {
        match self {
            VariableKey::Derived { stem } => format!("{}{}", stem, dir.suffix()),
            VariableKey::Fixed(key) => key.clone(),
        }
    }
}

/// Gate for dependencies that are not required directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitiveGate {
    /// Required package that pulls the dependency in
    pub parent: String,
    /// Option the parent must have been built with
    pub option: String,
}

/// Path variable rule for one package.
///
/// Without a gate the rule customizes the variable of a directly required
/// package. With a gate it surfaces a transitive dependency whenever the
/// parent reports the gating option as enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariableRule {
    package_id: String,
    key: VariableKey,
    platform: PlatformCondition,
    gate: Option<TransitiveGate>,
}

impl PathVariableRule {
    pub fn new(package_id: impl Into<String>) -> Self {
        let package_id = package_id.into();
        PathVariableRule {
            key: VariableKey::for_package(&package_id),
            package_id,
            platform: PlatformCondition::any(),
            gate: None,
        }
    }

    /// Use a custom stem for the derived key.
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.key = VariableKey::Derived { stem: stem.into() };
        self
    }

    /// Use the same key on every platform.
    pub fn with_fixed_key(mut self, key: impl Into<String>) -> Self {
        self.key = VariableKey::Fixed(key.into());
        self
    }

    /// Only emit on matching platforms.
    pub fn on(mut self, platform: PlatformCondition) -> Self {
        self.platform = platform;
        self
    }

    /// Surface a transitive dependency of `parent`.
    pub fn through(mut self, parent: impl Into<String>, option: impl Into<String>) -> Self {
        self.gate = Some(TransitiveGate {
            parent: parent.into(),
            option: option.into(),
        });
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn key(&self) -> &VariableKey {
        &self.key
    }

    pub fn gate(&self) -> Option<&TransitiveGate> {
        self.gate.as_ref()
    }

    /// Whether a gated rule is open: the parent is required, reported as
    /// built with the option, and the platform matches.
    fn gate_open(
        &self,
        platform: &PlatformDescriptor,
        requirements: &[Requirement],
        infos: &DependencyInfoSet,
    ) -> bool {
        let Some(gate) = &self.gate else {
            return false;
        };
        self.platform.matches(platform)
            && requirements.iter().any(|r| r.package_id() == gate.parent)
            && infos
                .get(&gate.parent)
                .is_some_and(|parent| parent.option_enabled(&gate.option))
    }
}

/// Transitive packages whose facts are needed for variable derivation.
///
/// `infos` must already hold the facts of every required package.
pub fn transitive_lookups<'r>(
    rules: &'r [PathVariableRule],
    platform: &PlatformDescriptor,
    requirements: &[Requirement],
    infos: &DependencyInfoSet,
) -> Vec<&'r str> {
    let mut packages: Vec<&str> = Vec::new();
    for rule in rules {
        if rule.gate_open(platform, requirements, infos) && !packages.contains(&rule.package_id())
        {
            packages.push(rule.package_id());
        }
    }
    packages
}

/// Derive the variable set.
///
/// Every required package must have facts in `infos`; a missing one is a
/// `MissingDependencyInfo` error and no variables are returned.
pub fn derive_variables(
    platform: &PlatformDescriptor,
    options: &EffectiveOptions,
    requirements: &[Requirement],
    rules: &[PathVariableRule],
    infos: &DependencyInfoSet,
) -> Result<VariableSet, ResolveError> {
    let mut vars = VariableSet::new();

    for req in requirements {
        let info = infos
            .get(req.package_id())
            .ok_or_else(|| ResolveError::MissingDependencyInfo {
                package: req.package_id().to_string(),
            })?;

        let mut direct = rules
            .iter()
            .filter(|r| r.gate.is_none() && r.package_id == req.package_id())
            .peekable();

        let key = if direct.peek().is_none() {
            VariableKey::for_package(req.package_id())
        } else if let Some(rule) = direct.find(|r| r.platform.matches(platform)) {
            rule.key.clone()
        } else {
            tracing::trace!("no path variable for `{}` on {}", req.package_id(), platform);
            continue;
        };

        emit_path(&mut vars, platform.os(), info, &key)?;
    }

    for rule in rules.iter().filter(|r| r.gate.is_some()) {
        if !rule.gate_open(platform, requirements, infos) {
            continue;
        }
        let info = infos
            .get(&rule.package_id)
            .ok_or_else(|| ResolveError::MissingDependencyInfo {
                package: rule.package_id.clone(),
            })?;
        emit_path(&mut vars, platform.os(), info, &rule.key)?;
    }

    for (name, value) in options.iter() {
        vars.insert(name, VariableValue::from(value))?;
    }

    Ok(vars)
}

fn emit_path(
    vars: &mut VariableSet,
    os: OsFamily,
    info: &DependencyInfo,
    key: &VariableKey,
) -> Result<(), ResolveError> {
    if !info.is_shared_linkage {
        tracing::trace!("`{}` is linked statically", info.package_id);
        return Ok(());
    }

    let (dir, path) = artifact_dir(os, info)?;
    let key = key.render(dir);
    tracing::debug!("{} = {}", key, path.display());
    vars.insert(key, VariableValue::Path(path))
}
