//! Hashing utilities for fingerprinting resolver output.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(&mut self) -> String {
        hex::encode(std::mem::take(&mut self.hasher).finalize())
    }

    /// Finalize and return a short fingerprint (first 16 chars).
    pub fn finish_short(&mut self) -> String {
        self.finish()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        let fp1 = Fingerprint::new().update_str("hello").update_str("world").finish();
        let fp2 = Fingerprint::new().update_str("hello").update_str("world").finish();
        let fp3 = Fingerprint::new()
            .update_str("hello")
            .update_str("different")
            .finish();

        assert_eq!(fp1, fp2);
        assert_ne!(fp1, fp3);
        assert_eq!(fp1.len(), 64);
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        let a = Fingerprint::new().update_str("ab").update_str("c").finish();
        let b = Fingerprint::new().update_str("a").update_str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_finish_short() {
        let short = Fingerprint::new().update_str("sdl").finish_short();
        assert_eq!(short.len(), 16);
    }
}
