//! Content-addressed deduplication of dependency groups.
//!
//! - [`DedupRegistry`]: run-scoped, in-memory map from short fingerprint to
//!   the first-seen body and every source that produced it.
//! - [`store::HashedStore`]: the on-disk mirror, one `{short}.toml` file per
//!   fingerprint whose `# Sources:` line is merged on every write.

pub mod store;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fingerprint::Fingerprint;

pub use store::HashedStore;

#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub fingerprint: Fingerprint,
    /// Body of the first group that produced this fingerprint.
    pub body: String,
    /// Source identifiers in first-seen order, without duplicates.
    pub sources: Vec<String>,
}

impl RegistryEntry {
    pub fn is_shared(&self) -> bool {
        self.sources.len() > 1
    }

    pub fn sorted_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.sources.iter().map(String::as_str).collect();
        sources.sort_unstable();
        sources
    }
}

/// Created once per run and passed by `&mut` into group processing.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` produced `fingerprint`.
    ///
    /// Returns `true` when the fingerprint was not seen before. `body` is only
    /// stored on first sight; re-recording an existing source is a no-op.
    pub fn record(&mut self, fingerprint: &Fingerprint, body: &str, source: &str) -> bool {
        match self.entries.get_mut(fingerprint.short()) {
            Some(entry) => {
                if !entry.sources.iter().any(|s| s == source) {
                    entry.sources.push(source.to_string());
                }
                false
            }
            None => {
                self.entries.insert(
                    fingerprint.short().to_string(),
                    RegistryEntry {
                        fingerprint: fingerprint.clone(),
                        body: body.to_string(),
                        sources: vec![source.to_string()],
                    },
                );
                true
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, short: &str) -> Option<&RegistryEntry> {
        self.entries.get(short)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by short fingerprint.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Entries produced by more than one source.
    pub fn shared(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.iter().filter(|e| e.is_shared())
    }

    pub fn duplicates(&self) -> usize {
        self.shared().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sight_creates_entry() {
        let mut registry = DedupRegistry::new();
        let fp = Fingerprint::of("serde = \"1\"");
        assert!(registry.record(&fp, "serde = \"1\"", "a/dependencies/group01"));
        assert_eq!(registry.len(), 1);

        let entry = registry.get(fp.short()).unwrap();
        assert_eq!(entry.sources, vec!["a/dependencies/group01"]);
        assert!(!entry.is_shared());
    }

    #[test]
    fn test_sources_accumulate_in_order() {
        let mut registry = DedupRegistry::new();
        let fp = Fingerprint::of("serde = \"1\"");
        registry.record(&fp, "serde = \"1\"", "z/dependencies/group01");
        assert!(!registry.record(&fp, "serde = \"1\"", "a/dependencies/group02"));

        let entry = registry.get(fp.short()).unwrap();
        assert_eq!(
            entry.sources,
            vec!["z/dependencies/group01", "a/dependencies/group02"]
        );
        assert_eq!(
            entry.sorted_sources(),
            vec!["a/dependencies/group02", "z/dependencies/group01"]
        );
        assert_eq!(registry.duplicates(), 1);
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut registry = DedupRegistry::new();
        let fp = Fingerprint::of("log = \"0.4\"");
        registry.record(&fp, "log = \"0.4\"", "a/dependencies/group01");
        registry.record(&fp, "log = \"0.4\"", "a/dependencies/group01");

        assert_eq!(registry.get(fp.short()).unwrap().sources.len(), 1);
        assert_eq!(registry.duplicates(), 0);
    }

    #[test]
    fn test_body_is_first_writer_wins() {
        let mut registry = DedupRegistry::new();
        let body = "log = \"0.4\"";
        let fp = Fingerprint::of(body);
        registry.record(&fp, body, "a/dependencies/group01");
        registry.record(&fp, "# Source: x\nlog = \"0.4\"", "b/dependencies/group01");

        assert_eq!(registry.get(fp.short()).unwrap().body, body);
    }

    #[test]
    fn test_distinct_content_distinct_entries() {
        let mut registry = DedupRegistry::new();
        registry.record(&Fingerprint::of("a = \"1\""), "a = \"1\"", "x/dependencies/group01");
        registry.record(&Fingerprint::of("b = \"1\""), "b = \"1\"", "x/dependencies/group02");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.shared().count(), 0);
    }
}
