use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::fingerprint::Fingerprint;

const HASH_PREFIX: &str = "# Hash:";
const SOURCES_PREFIX: &str = "# Sources:";
const AUTO_GENERATED: &str = "# Auto-generated - do not edit";

/// One file per short fingerprint under `dir`.
///
/// The body is written once; later writes only merge the `# Sources:` line.
pub struct HashedStore {
    dir: PathBuf,
}

impl HashedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.toml", fingerprint.short()))
    }

    /// Write or merge the record for `fingerprint` and return its path.
    pub fn persist(
        &self,
        fingerprint: &Fingerprint,
        body: &str,
        sources: &[String],
    ) -> Result<PathBuf> {
        let path = self.path_for(fingerprint);

        if !path.exists() {
            let sorted: BTreeSet<&str> = sources.iter().map(String::as_str).collect();
            let content = format!(
                "{} {}\n{} {}\n{}\n\n{}\n",
                HASH_PREFIX,
                fingerprint.digest(),
                SOURCES_PREFIX,
                sorted.into_iter().collect::<Vec<_>>().join(", "),
                AUTO_GENERATED,
                body
            );
            std::fs::write(&path, content)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            return Ok(path);
        }

        let existing = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;

        match merge_sources(&existing, sources) {
            Some(updated) if updated != existing => {
                std::fs::write(&path, updated)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
            }
            Some(_) => {}
            None => tracing::warn!("{} has no sources line, leaving it untouched", path.display()),
        }

        Ok(path)
    }
}

/// Parse the comma separated list from a `# Sources:` line.
pub fn parse_sources(content: &str) -> Option<Vec<String>> {
    content
        .split('\n')
        .find_map(|line| line.strip_prefix(SOURCES_PREFIX))
        .map(|rest| {
            rest.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
}

/// Rewrite the first `# Sources:` line with the sorted union; every other line is kept.
fn merge_sources(content: &str, sources: &[String]) -> Option<String> {
    let existing = parse_sources(content)?;

    let union: BTreeSet<&str> = existing
        .iter()
        .chain(sources.iter())
        .map(String::as_str)
        .collect();
    let line = format!(
        "{} {}",
        SOURCES_PREFIX,
        union.into_iter().collect::<Vec<_>>().join(", ")
    );

    let mut lines: Vec<&str> = content.split('\n').collect();
    let pos = lines.iter().position(|l| l.starts_with(SOURCES_PREFIX))?;
    lines[pos] = &line;
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BODY: &str = "url = { version = \"2\", features = [\"serde\"] }";

    fn store() -> (TempDir, HashedStore) {
        let dir = TempDir::new().unwrap();
        let store = HashedStore::new(dir.path());
        (dir, store)
    }

    fn sources(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_write_layout() {
        let (_dir, store) = store();
        let fp = Fingerprint::of(BODY);
        let path = store.persist(&fp, BODY, &sources(&["b/x/group01", "a/x/group01"])).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("{}.toml", fp.short())
        );
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!(
                "# Hash: {}\n# Sources: a/x/group01, b/x/group01\n# Auto-generated - do not edit\n\n{}\n",
                fp.digest(),
                BODY
            )
        );
    }

    #[test]
    fn test_union_of_sources() {
        let (_dir, store) = store();
        let fp = Fingerprint::of(BODY);
        store.persist(&fp, BODY, &sources(&["b/x/group01"])).unwrap();
        let path = store.persist(&fp, BODY, &sources(&["a/x/group02"])).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            parse_sources(&content).unwrap(),
            vec!["a/x/group02", "b/x/group01"]
        );
    }

    #[test]
    fn test_repeat_source_is_idempotent() {
        let (_dir, store) = store();
        let fp = Fingerprint::of(BODY);
        store.persist(&fp, BODY, &sources(&["a/x/group01"])).unwrap();
        let first = std::fs::read_to_string(store.path_for(&fp)).unwrap();
        store.persist(&fp, BODY, &sources(&["a/x/group01"])).unwrap();
        let second = std::fs::read_to_string(store.path_for(&fp)).unwrap();

        assert_eq!(first, second);
        assert_eq!(parse_sources(&second).unwrap(), vec!["a/x/group01"]);
    }

    #[test]
    fn test_body_never_rewritten() {
        let (_dir, store) = store();
        let fp = Fingerprint::of(BODY);
        store.persist(&fp, BODY, &sources(&["a/x/group01"])).unwrap();
        store
            .persist(&fp, "something = \"else\"", &sources(&["b/x/group01"]))
            .unwrap();

        let content = std::fs::read_to_string(store.path_for(&fp)).unwrap();
        assert!(content.ends_with(&format!("\n\n{}\n", BODY)));
        assert!(!content.contains("something"));
    }

    #[test]
    fn test_sources_are_case_sensitive() {
        let (_dir, store) = store();
        let fp = Fingerprint::of(BODY);
        store.persist(&fp, BODY, &sources(&["Repo/x/group01"])).unwrap();
        store.persist(&fp, BODY, &sources(&["repo/x/group01"])).unwrap();

        let content = std::fs::read_to_string(store.path_for(&fp)).unwrap();
        assert_eq!(
            parse_sources(&content).unwrap(),
            vec!["Repo/x/group01", "repo/x/group01"]
        );
    }

    #[test]
    fn test_write_failure_is_reported() {
        let store = HashedStore::new("/nonexistent/cargo-snippets/hashed");
        let fp = Fingerprint::of(BODY);
        assert!(store.persist(&fp, BODY, &sources(&["a/x/group01"])).is_err());
    }

    #[test]
    fn test_parse_sources_ignores_empty_entries() {
        let content = "# Hash: abc\n# Sources: a, , b,\n\nx = 1";
        assert_eq!(parse_sources(content).unwrap(), vec!["a", "b"]);
        assert!(parse_sources("x = 1").is_none());
    }
}
