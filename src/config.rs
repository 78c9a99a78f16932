use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.cargo-snippets/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where repositories and manifests come from.
    pub github: GithubConfig,
    /// Which tables are harvested.
    pub sections: SectionsConfig,
    /// Output directories, relative to the output root.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Organization whose repositories are harvested.
    pub owner: String,
    /// Search qualifier used for discovery (`language:<value>`).
    pub language: String,
    pub per_page: usize,
    pub api_url: String,
    pub raw_url: String,
    /// File fetched from each repository.
    pub manifest: String,
    pub user_agent: String,
    pub search_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Bearer token for the search API. Falls back to `GITHUB_TOKEN`.
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: "portal-co".to_string(),
            language: "Rust".to_string(),
            per_page: 100,
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            manifest: "Cargo.toml".to_string(),
            user_agent: "rice-snippets-downloader".to_string(),
            search_timeout_secs: 30,
            fetch_timeout_secs: 10,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    /// Table names harvested from each manifest, matched case-insensitively.
    pub headers: Vec<String>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            headers: vec![
                "dependencies".to_string(),
                "dev-dependencies".to_string(),
                "build-dependencies".to_string(),
                "workspace.dependencies".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Full section snippets, one per `(repo, section)`.
    pub sections_dir: PathBuf,
    /// Human-readable aliases to the hashed files.
    pub grouped_dir: PathBuf,
    /// Content-addressed group files.
    pub hashed_dir: PathBuf,
    /// Full fetched manifests.
    pub documents_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sections_dir: PathBuf::from("snippets/cargo"),
            grouped_dir: PathBuf::from("snippets/cargo-grouped"),
            hashed_dir: PathBuf::from("snippets/cargo-hashed"),
            documents_dir: PathBuf::from("cargo-tomls"),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<output_root>/.cargo-snippets/config.toml`
/// 3. `~/.config/cargo-snippets/config.toml`
/// 4. Built-in [`Config::default`]
///
/// A token from `GITHUB_TOKEN` is applied when the file does not set one.
pub fn load_config(output_root: &Path, config_override: Option<&Path>) -> Result<Config> {
    let mut config = match find_config(output_root, config_override) {
        Some(path) => read_config(&path)?,
        None => Config::default(),
    };

    if config.github.token.is_none() {
        config.github.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    }

    Ok(config)
}

fn find_config(output_root: &Path, config_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_override {
        return Some(path.to_path_buf());
    }

    let project_config = output_root.join(".cargo-snippets").join("config.toml");
    if project_config.exists() {
        return Some(project_config);
    }

    let home_config = dirs::home_dir()?
        .join(".config")
        .join("cargo-snippets")
        .join("config.toml");
    home_config.exists().then_some(home_config)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}
