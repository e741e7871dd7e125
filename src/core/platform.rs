//! Target platform descriptor.
//!
//! A `PlatformDescriptor` is the immutable description of the platform a
//! resolution run targets. It is built once from caller input and passed
//! explicitly to every evaluation; nothing here reads process-wide state
//! except the opt-in [`PlatformDescriptor::host`] helper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resolver::ResolveError;

/// Operating system family.
///
/// Names are read case-insensitively, so conan-style `"Windows"` and
/// `"Macos"` work in recipe and index files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OsFamily {
    Windows,
    Linux,
    Macos,
    FreeBsd,
    Android,
    /// No operating system (firmware, bare-metal boards)
    BareMetal,
}

impl OsFamily {
    /// Windows-family platforms load shared libraries from the binary directory.
    pub fn is_windows(&self) -> bool {
        matches!(self, OsFamily::Windows)
    }

    /// Bare-metal targets have no display or audio stack.
    pub fn is_bare_metal(&self) -> bool {
        matches!(self, OsFamily::BareMetal)
    }

    /// Posix-like: every hosted OS that is not Windows.
    pub fn is_posix(&self) -> bool {
        !self.is_windows() && !self.is_bare_metal()
    }

    /// Interactive platforms can host a window, input devices and audio.
    pub fn is_interactive(&self) -> bool {
        !self.is_bare_metal()
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Linux => "linux",
            OsFamily::Macos => "macos",
            OsFamily::FreeBsd => "freebsd",
            OsFamily::Android => "android",
            OsFamily::BareMetal => "baremetal",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for OsFamily {
    type Error = ResolveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for OsFamily {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(OsFamily::Windows),
            "linux" => Ok(OsFamily::Linux),
            "macos" | "darwin" => Ok(OsFamily::Macos),
            "freebsd" => Ok(OsFamily::FreeBsd),
            "android" => Ok(OsFamily::Android),
            "baremetal" | "bare-metal" | "none" => Ok(OsFamily::BareMetal),
            _ => Err(ResolveError::InvalidPlatform {
                field: "os",
                value: s.to_string(),
            }),
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Name as understood by CMake-style generators.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BuildType {
    type Error = ResolveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for BuildType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(ResolveError::InvalidPlatform {
                field: "build_type",
                value: s.to_string(),
            }),
        }
    }
}

/// The platform a resolution run targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    os: OsFamily,
    arch: String,
    compiler: String,
    #[serde(default)]
    build_type: BuildType,
}

impl PlatformDescriptor {
    /// Create a descriptor.
    pub fn new(
        os: OsFamily,
        arch: impl Into<String>,
        compiler: impl Into<String>,
        build_type: BuildType,
    ) -> Self {
        PlatformDescriptor {
            os,
            arch: arch.into(),
            compiler: compiler.into(),
            build_type,
        }
    }

    /// Describe the machine this process runs on.
    ///
    /// The compiler is guessed from the OS convention (`msvc` on Windows,
    /// `apple-clang` on macOS, `gcc` elsewhere).
    pub fn host(build_type: BuildType) -> Self {
        let os = OsFamily::from_str(std::env::consts::OS).unwrap_or(OsFamily::Linux);
        let compiler = match os {
            OsFamily::Windows => "msvc",
            OsFamily::Macos => "apple-clang",
            _ => "gcc",
        };
        PlatformDescriptor::new(os, std::env::consts::ARCH, compiler, build_type)
    }

    pub fn os(&self) -> OsFamily {
        self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}, {})",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}
