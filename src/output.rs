use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::OutputConfig;
use crate::models::{Section, SourceId};

const AUTO_GENERATED: &str = "# Auto-generated - do not edit";

/// Alias index file written into the grouped directory.
pub const ALIAS_INDEX: &str = "index.json";

/// Resolved output directories for one run.
#[derive(Debug, Clone)]
pub struct Layout {
    pub sections: PathBuf,
    pub grouped: PathBuf,
    pub hashed: PathBuf,
    pub documents: PathBuf,
    owner: String,
}

impl Layout {
    pub fn new(root: &Path, config: &OutputConfig, owner: &str) -> Self {
        Self {
            sections: root.join(&config.sections_dir),
            grouped: root.join(&config.grouped_dir),
            hashed: root.join(&config.hashed_dir),
            documents: root.join(&config.documents_dir),
            owner: owner.to_string(),
        }
    }

    /// Create every output directory. Failure here aborts the run.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.sections, &self.grouped, &self.hashed, &self.documents] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Save a fetched manifest as `{repo}_Cargo.toml`.
    pub fn write_document(&self, repo: &str, content: &str) -> Result<PathBuf> {
        let path = self.documents.join(format!("{}_Cargo.toml", repo));
        let text = format!(
            "# Source: {}/{}\n{}\n\n{}",
            self.owner, repo, AUTO_GENERATED, content
        );
        std::fs::write(&path, text).with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(path)
    }

    /// Save a whole section as `{repo}_{safe-section}.toml`.
    pub fn write_section(&self, repo: &str, section: &Section) -> Result<PathBuf> {
        let path = self
            .sections
            .join(format!("{}_{}.toml", repo, section.safe_name()));
        let text = format!(
            "# Source: {}/{}\n# Section: [{}]\n{}\n\n{}\n",
            self.owner, repo, section.name, AUTO_GENERATED, section.body
        );
        std::fs::write(&path, text).with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(path)
    }

    /// Point `{repo}_{section}_group{NN}.toml` at the content-addressed file.
    ///
    /// Uses a relative symlink on Unix and a plain copy elsewhere. Whatever
    /// already sits at the alias path is replaced.
    pub fn link_alias(&self, source: &SourceId, target: &Path) -> Result<PathBuf> {
        let alias = self.grouped.join(source.alias_file_name());

        if alias.symlink_metadata().is_ok() {
            std::fs::remove_file(&alias)
                .with_context(|| format!("Cannot replace {}", alias.display()))?;
        }

        #[cfg(unix)]
        {
            let rel = relative_path(&self.grouped, target);
            std::os::unix::fs::symlink(&rel, &alias)
                .with_context(|| format!("Cannot link {} -> {}", alias.display(), rel.display()))?;
        }
        #[cfg(not(unix))]
        {
            std::fs::copy(target, &alias)
                .with_context(|| format!("Cannot copy {} to {}", target.display(), alias.display()))?;
        }

        Ok(alias)
    }

    /// Write the alias -> short fingerprint map as JSON.
    pub fn write_alias_index(&self, aliases: &BTreeMap<String, String>) -> Result<PathBuf> {
        let path = self.grouped.join(ALIAS_INDEX);
        let json = serde_json::to_string_pretty(aliases)?;
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(path)
    }
}

/// Path of `target` as seen from inside `from_dir`.
fn relative_path(from_dir: &Path, target: &Path) -> PathBuf {
    let from = from_dir.canonicalize().unwrap_or_else(|_| from_dir.to_path_buf());
    let to = target.canonicalize().unwrap_or_else(|_| target.to_path_buf());

    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for part in &to[common..] {
        rel.push(part);
    }
    rel
}
