//! Run reports.
//!
//! - [`terminal`]: colored summary box and shared-snippet table; respects `--verbose` / `--quiet`.
//! - [`markdown`]: README files written next to the snippets.
//! - [`json`]: machine-readable stats plus every registry entry.

pub mod markdown;
pub mod terminal;

pub mod json {
    use anyhow::Result;
    use serde::Serialize;

    use crate::models::RunStats;
    use crate::registry::{DedupRegistry, RegistryEntry};

    #[derive(Serialize)]
    struct JsonReport<'a> {
        owner: &'a str,
        stats: &'a RunStats,
        snippets: Vec<&'a RegistryEntry>,
    }

    pub fn render(stats: &RunStats, registry: &DedupRegistry, owner: &str) -> Result<String> {
        let report = JsonReport {
            owner,
            stats,
            snippets: registry.iter().collect(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

}
