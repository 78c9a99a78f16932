use serde::Serialize;
use sha2::{Digest, Sha256};

/// Comment prefixes written by this tool; ignored when fingerprinting.
pub const METADATA_PREFIXES: [&str; 3] = ["# Source:", "# Section:", "# Auto-generated"];

/// Length of the short, externally used fingerprint (8 bytes in hex).
pub const SHORT_LEN: usize = 16;

/// SHA-256 of a group's normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint {
    digest: String,
}

impl Fingerprint {
    /// Fingerprint `text` after stripping provenance comments and outer whitespace.
    pub fn of(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize(text).as_bytes());
        Self {
            digest: hex::encode(hasher.finalize()),
        }
    }

    /// Full lower-case hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// First 16 hex characters; used as the registry key and file name.
    ///
    /// Truncation trades a small collision risk for short file names.
    pub fn short(&self) -> &str {
        &self.digest[..SHORT_LEN]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// Drop metadata comment lines, rejoin, and trim the whole block.
pub fn normalize(text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            let t = line.trim();
            !METADATA_PREFIXES.iter().any(|p| t.starts_with(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
