//! Facts about resolved packages, and the provider that supplies them.
//!
//! The resolver never computes these itself. After the caller's package
//! index has resolved the requirement list, it reports per-package linkage
//! and artifact directories through [`DependencyInfoProvider`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::options::OptionValue;
use crate::core::platform::PlatformDescriptor;

/// Platform-specific facts about one resolved package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    /// Package name
    pub package_id: String,

    /// Built as a shared library
    pub is_shared_linkage: bool,

    /// Runtime artifacts (DLLs on Windows)
    pub binary_dir: PathBuf,

    /// Link-time artifacts (and shared objects on Posix)
    pub library_dir: PathBuf,

    /// Options the package was built with
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
}

impl DependencyInfo {
    /// Describe a shared library package.
    pub fn shared(
        package_id: impl Into<String>,
        binary_dir: impl Into<PathBuf>,
        library_dir: impl Into<PathBuf>,
    ) -> Self {
        DependencyInfo {
            package_id: package_id.into(),
            is_shared_linkage: true,
            binary_dir: binary_dir.into(),
            library_dir: library_dir.into(),
            options: BTreeMap::new(),
        }
    }

    /// Describe a statically linked package.
    pub fn static_lib(
        package_id: impl Into<String>,
        binary_dir: impl Into<PathBuf>,
        library_dir: impl Into<PathBuf>,
    ) -> Self {
        DependencyInfo {
            is_shared_linkage: false,
            ..DependencyInfo::shared(package_id, binary_dir, library_dir)
        }
    }

    /// Record an option the package was built with.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn binary_dir(&self) -> &Path {
        &self.binary_dir
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Whether the package was built with a boolean option switched on.
    pub fn option_enabled(&self, name: &str) -> bool {
        self.options.get(name).is_some_and(OptionValue::is_true)
    }
}

/// Errors reported by a dependency info provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("unknown package `{package_id}`")]
    UnknownPackage { package_id: String },

    #[error("package index error for `{package_id}`: {message}")]
    Index { package_id: String, message: String },
}

impl ProviderError {
    pub fn unknown(package_id: impl Into<String>) -> Self {
        ProviderError::UnknownPackage {
            package_id: package_id.into(),
        }
    }
}

/// Synchronous lookup of dependency facts, backed by the caller's package index.
///
/// The resolver assumes the provider answers from a consistent snapshot for
/// the duration of one resolution.
pub trait DependencyInfoProvider {
    /// Report facts for a resolved package on a platform.
    fn lookup(
        &self,
        package_id: &str,
        platform: &PlatformDescriptor,
    ) -> Result<DependencyInfo, ProviderError>;
}

impl<F> DependencyInfoProvider for F
where
    F: Fn(&str, &PlatformDescriptor) -> Result<DependencyInfo, ProviderError>,
{
    fn lookup(
        &self,
        package_id: &str,
        platform: &PlatformDescriptor,
    ) -> Result<DependencyInfo, ProviderError> {
        self(package_id, platform)
    }
}

/// Dependency facts already gathered for one platform, keyed by package.
///
/// This is the input of the second phase of the two-phase protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyInfoSet {
    infos: BTreeMap<String, DependencyInfo>,
}

impl DependencyInfoSet {
    pub fn new() -> Self {
        DependencyInfoSet::default()
    }

    /// Insert facts for a package, replacing earlier ones.
    pub fn insert(&mut self, info: DependencyInfo) {
        self.infos.insert(info.package_id.clone(), info);
    }

    pub fn with(mut self, info: DependencyInfo) -> Self {
        self.insert(info);
        self
    }

    pub fn get(&self, package_id: &str) -> Option<&DependencyInfo> {
        self.infos.get(package_id)
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.infos.contains_key(package_id)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

impl FromIterator<DependencyInfo> for DependencyInfoSet {
    fn from_iter<I: IntoIterator<Item = DependencyInfo>>(iter: I) -> Self {
        let mut set = DependencyInfoSet::new();
        for info in iter {
            set.insert(info);
        }
        set
    }
}
