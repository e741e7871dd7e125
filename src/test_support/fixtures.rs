//! Test fixtures for common resolution scenarios.

use std::collections::BTreeMap;

use crate::core::options::OptionValue;
use crate::core::platform::{BuildType, OsFamily, PlatformDescriptor};
use crate::index::{EntryOverride, IndexEntry, PackageIndex};

pub fn linux_x64() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::Linux, "x86_64", "gcc", BuildType::Release)
}

pub fn macos_arm64() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::Macos, "armv8", "apple-clang", BuildType::Debug)
}

pub fn windows_x64() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::Windows, "x86_64", "msvc", BuildType::Release)
}

/// A Raspberry Pi class board without an OS.
pub fn bare_metal_arm() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::BareMetal, "armv6", "gcc", BuildType::MinSizeRel)
}

/// Index entry laid out like a conan cache, with Windows paths on Windows.
pub fn cache_entry(package_id: &str, shared: bool) -> IndexEntry {
    let mut os = BTreeMap::new();
    os.insert(
        OsFamily::Windows,
        EntryOverride {
            bindir: Some(format!(r"C:\conan\{}\bin", package_id).into()),
            libdir: Some(format!(r"C:\conan\{}\lib", package_id).into()),
            ..Default::default()
        },
    );

    IndexEntry {
        shared,
        bindir: format!("/home/dev/.conan2/p/{}/bin", package_id).into(),
        libdir: format!("/home/dev/.conan2/p/{}/lib", package_id).into(),
        options: BTreeMap::new(),
        os,
    }
}

/// Snapshot of every package the arcade recipe can pull in.
///
/// `mach_emu`, `sdl`, `sdl_mixer` and `zlib` are shared; the rest static.
pub fn arcade_index() -> PackageIndex {
    let mut index = PackageIndex::new();

    let mut mach_emu = cache_entry("mach_emu", true);
    mach_emu
        .options
        .insert("with_zlib".to_string(), OptionValue::Bool(true));
    index.insert_entry("mach_emu", mach_emu);

    for (package_id, shared) in [
        ("meen_hw", false),
        ("nlohmann_json", false),
        ("popl", false),
        ("sdl", true),
        ("sdl_mixer", true),
        ("zlib", true),
    ] {
        index.insert_entry(package_id, cache_entry(package_id, shared));
    }

    index
}
