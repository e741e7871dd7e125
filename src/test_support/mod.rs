//! Test utilities and mocks for unit tests.
//!
//! Provides fixture platforms, a fixture package index, and a provider
//! that records every lookup it answers.

pub mod fixtures;

use std::sync::Mutex;

use crate::core::dependency_info::{DependencyInfo, DependencyInfoProvider, ProviderError};
use crate::core::platform::PlatformDescriptor;

pub use fixtures::*;

/// Provider wrapper that records the package ids it was asked for.
pub struct RecordingProvider<P> {
    inner: P,
    calls: Mutex<Vec<String>>,
}

impl<P: DependencyInfoProvider> RecordingProvider<P> {
    pub fn new(inner: P) -> Self {
        RecordingProvider {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Package ids looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl<P: DependencyInfoProvider> DependencyInfoProvider for RecordingProvider<P> {
    fn lookup(
        &self,
        package_id: &str,
        platform: &PlatformDescriptor,
    ) -> Result<DependencyInfo, ProviderError> {
        self.calls.lock().unwrap().push(package_id.to_string());
        self.inner.lookup(package_id, platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionSet;
    use crate::recipes::arcade;
    use crate::resolver::Resolver;

    #[test]
    fn test_zlib_not_looked_up_when_gate_closed() {
        let mut index = arcade_index();
        let mut mach_emu = cache_entry("mach_emu", true);
        mach_emu.options.insert("with_zlib".to_string(), false.into());
        index.insert_entry("mach_emu", mach_emu);

        let provider = RecordingProvider::new(index);
        let resolver = Resolver::new(arcade::recipe().unwrap());
        let vars = resolver
            .resolve(&linux_x64(), &OptionSet::new().with("with_zlib", false), &provider)
            .unwrap();

        assert!(!provider.calls().iter().any(|c| c == "zlib"));
        assert!(!vars.contains_key("zlibLibDir"));
    }

    #[test]
    fn test_lookups_follow_requirement_order() {
        let provider = RecordingProvider::new(arcade_index());
        let resolver = Resolver::new(arcade::recipe().unwrap());
        resolver
            .resolve(&macos_arm64(), &OptionSet::new(), &provider)
            .unwrap();

        assert_eq!(
            provider.calls(),
            vec!["mach_emu", "meen_hw", "nlohmann_json", "popl", "sdl", "sdl_mixer", "zlib"]
        );
    }
}
