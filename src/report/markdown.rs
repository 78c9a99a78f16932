use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::RunStats;
use crate::output::Layout;
use crate::registry::DedupRegistry;

const FOOTER: &str = "\n*Generated automatically by cargo-snippets*\n";

/// Write a README into each snippet directory. A failed write is logged and
/// counted in the returned number; the other READMEs are still attempted.
pub fn write_readmes(
    layout: &Layout,
    owner: &str,
    stats: &RunStats,
    registry: &DedupRegistry,
) -> usize {
    let readmes = [
        (layout.sections.as_path(), sections_readme(owner, stats)),
        (layout.grouped.as_path(), grouped_readme(stats)),
        (layout.hashed.as_path(), hashed_readme(stats, registry)),
    ];

    let mut failures = 0;
    for (dir, text) in readmes {
        if let Err(e) = write_readme(dir, &text) {
            tracing::error!("{:#}", e);
            failures += 1;
        }
    }
    failures
}

fn write_readme(dir: &Path, text: &str) -> Result<()> {
    let path = dir.join("README.md");
    std::fs::write(&path, text).with_context(|| format!("Cannot write {}", path.display()))
}

pub fn sections_readme(owner: &str, stats: &RunStats) -> String {
    let mut repos: Vec<&str> = stats.repos_with_deps.iter().map(String::as_str).collect();
    repos.sort_unstable();

    let mut out = String::new();
    out.push_str("# Cargo Dependency Snippets\n\n");
    out.push_str("This directory contains dependency sections extracted from Cargo.toml files\n");
    let _ = writeln!(out, "across the {} organization repositories.\n", owner);
    out.push_str("## Usage\n\n");
    out.push_str("These snippets can be used as templates for new Rust projects.\n");
    out.push_str("Simply copy the relevant dependencies into your Cargo.toml file.\n\n");
    out.push_str("For smaller, logically grouped snippets, see the `cargo-grouped/` directory.\n\n");
    out.push_str("For deduplicated hash-based snippets, see the `cargo-hashed/` directory.\n\n");
    out.push_str("## Repositories with Dependencies\n\n");
    for repo in repos {
        let _ = writeln!(out, "- [{repo}](https://github.com/{owner}/{repo})");
    }
    out.push('\n');
    out.push_str(FOOTER);
    out
}

pub fn grouped_readme(stats: &RunStats) -> String {
    let mut out = String::new();
    out.push_str("# Cargo Dependency Snippets (Grouped)\n\n");
    out.push_str("This directory contains aliases to deduplicated dependency snippets.\n");
    out.push_str("Each alias points to a hash-based file in `cargo-hashed/`; `index.json`\n");
    out.push_str("maps every alias to its hash.\n\n");
    out.push_str("## Naming Convention\n\n");
    out.push_str("Aliases are named: `{repo}_{section}_group{NN}.toml`\n\n");
    out.push_str("Where:\n");
    out.push_str("- `{repo}` is the repository name\n");
    out.push_str("- `{section}` is the dependency section (e.g., `dependencies`, `workspace-dependencies`)\n");
    out.push_str("- `{NN}` is the group number within that section\n\n");
    let _ = writeln!(out, "Total grouped snippets: {}", stats.groups_extracted);
    let _ = writeln!(out, "Unique content files: {}\n", stats.unique_hashes);
    out.push_str(FOOTER);
    out
}

pub fn hashed_readme(stats: &RunStats, registry: &DedupRegistry) -> String {
    let mut out = String::new();
    out.push_str("# Cargo Dependency Snippets (Hash-Based)\n\n");
    out.push_str("This directory contains deduplicated dependency snippets identified by SHA256 hash.\n\n");
    out.push_str("## Naming Convention\n\n");
    out.push_str("Files are named: `{hash}.toml` where `{hash}` is the first 16 characters of the SHA256 hash.\n\n");
    out.push_str("## Deduplication\n\n");
    out.push_str("Multiple repositories may share the same dependency groups.\n");
    out.push_str("Each file contains a `# Sources:` comment listing all sources that share this content.\n\n");
    let _ = writeln!(out, "Total unique snippets: {}\n", stats.unique_hashes);

    let mut shared = registry.shared().peekable();
    if shared.peek().is_some() {
        out.push_str("## Shared Snippets\n\n");
        out.push_str("The following snippets are shared by multiple sources:\n\n");
        for entry in shared {
            let _ = writeln!(out, "### `{}.toml`", entry.fingerprint.short());
            for source in entry.sorted_sources() {
                let _ = writeln!(out, "- {source}");
            }
            out.push('\n');
        }
    }

    out.push_str(FOOTER);
    out
}
