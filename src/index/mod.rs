//! In-memory package index snapshot.
//!
//! `PackageIndex` answers dependency info lookups from a snapshot taken
//! ahead of time, either built in code or loaded from an `index.toml`:
//!
//! ```toml
//! [packages.sdl]
//! shared = true
//! bindir = "/opt/sdl/bin"
//! libdir = "/opt/sdl/lib"
//!
//! [packages.sdl.os.windows]
//! bindir = 'C:\sdl\bin'
//! libdir = 'C:\sdl\lib'
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::dependency_info::{DependencyInfo, DependencyInfoProvider, ProviderError};
use crate::core::options::OptionValue;
use crate::core::platform::{OsFamily, PlatformDescriptor};

/// Conventional index file name.
pub const INDEX_FILE_NAME: &str = "index.toml";

/// Facts for one package, with optional per-OS overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexEntry {
    #[serde(default)]
    pub shared: bool,

    #[serde(default)]
    pub bindir: PathBuf,

    #[serde(default)]
    pub libdir: PathBuf,

    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,

    #[serde(default)]
    pub os: BTreeMap<OsFamily, EntryOverride>,
}

/// Per-OS override of an index entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryOverride {
    #[serde(default)]
    pub shared: Option<bool>,

    #[serde(default)]
    pub bindir: Option<PathBuf>,

    #[serde(default)]
    pub libdir: Option<PathBuf>,

    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
}

impl IndexEntry {
    /// Facts for this entry on a platform.
    fn info_for(&self, package_id: &str, os: OsFamily) -> DependencyInfo {
        let mut info = DependencyInfo {
            package_id: package_id.to_string(),
            is_shared_linkage: self.shared,
            binary_dir: self.bindir.clone(),
            library_dir: self.libdir.clone(),
            options: self.options.clone(),
        };

        if let Some(ov) = self.os.get(&os) {
            if let Some(shared) = ov.shared {
                info.is_shared_linkage = shared;
            }
            if let Some(ref bindir) = ov.bindir {
                info.binary_dir = bindir.clone();
            }
            if let Some(ref libdir) = ov.libdir {
                info.library_dir = libdir.clone();
            }
            info.options
                .extend(ov.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        info
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndex {
    #[serde(default)]
    packages: BTreeMap<String, IndexEntry>,
}

/// Snapshot of a package index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    packages: BTreeMap<String, IndexEntry>,
}

impl PackageIndex {
    pub fn new() -> Self {
        PackageIndex::default()
    }

    /// Add a package with the same facts on every platform.
    pub fn with(mut self, info: DependencyInfo) -> Self {
        self.insert(info);
        self
    }

    /// Add a package with the same facts on every platform.
    pub fn insert(&mut self, info: DependencyInfo) {
        self.packages.insert(
            info.package_id,
            IndexEntry {
                shared: info.is_shared_linkage,
                bindir: info.binary_dir,
                libdir: info.library_dir,
                options: info.options,
                os: BTreeMap::new(),
            },
        );
    }

    /// Add or replace a raw entry.
    pub fn insert_entry(&mut self, package_id: impl Into<String>, entry: IndexEntry) {
        self.packages.insert(package_id.into(), entry);
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.packages.contains_key(package_id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Load an index snapshot from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read package index: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse package index: {}", path.display()))
    }

    /// Parse an index snapshot from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let raw: RawIndex = toml::from_str(contents)?;
        tracing::debug!("loaded package index with {} packages", raw.packages.len());
        Ok(PackageIndex {
            packages: raw.packages,
        })
    }
}

impl DependencyInfoProvider for PackageIndex {
    fn lookup(
        &self,
        package_id: &str,
        platform: &PlatformDescriptor,
    ) -> Result<DependencyInfo, ProviderError> {
        self.packages
            .get(package_id)
            .map(|entry| entry.info_for(package_id, platform.os()))
            .ok_or_else(|| ProviderError::unknown(package_id))
    }
}
