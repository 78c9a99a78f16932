use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::RunStats;
use crate::registry::{DedupRegistry, RegistryEntry};

/// Render a colored terminal summary of the run.
pub fn render(stats: &RunStats, registry: &DedupRegistry, owner: &str, verbose: bool, quiet: bool) {
    if quiet {
        println!(
            "Repos: {}  Downloaded: {}  Failed: {}  Groups: {}  Unique: {}  Shared: {}",
            stats.total_repos,
            stats.downloaded.to_string().green(),
            stats.failed.to_string().red(),
            stats.groups_extracted,
            stats.unique_hashes,
            stats.duplicates.to_string().cyan(),
        );
        return;
    }

    println!(
        "\n {} v{}",
        "cargo-snippets".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Organization: {}\n", owner);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    for line in summary_lines(stats) {
        println!(" │  {:<48} │", line);
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if stats.failed > 0 || stats.write_failures > 0 {
        println!(
            " {} {} repositories failed to download, {} writes failed\n",
            "[WARN]".yellow().bold(),
            stats.failed,
            stats.write_failures
        );
    }

    let shared: Vec<&RegistryEntry> = registry.shared().collect();
    if !shared.is_empty() {
        println!(" {} Snippets shared by several sources:\n", "[SHARED]".cyan().bold());
        render_table(&shared);
        println!();
    }

    if verbose && !registry.is_empty() {
        println!(" {} All snippets:\n", "[ALL]".green().bold());
        render_table(&registry.iter().collect::<Vec<_>>());
        println!();
    }
}

fn summary_lines(stats: &RunStats) -> Vec<String> {
    vec![
        format!("Total repositories     : {:>5}", stats.total_repos),
        format!("Downloaded             : {:>5}", stats.downloaded),
        format!("Failed                 : {:>5}", stats.failed),
        format!("Repos with dependencies: {:>5}", stats.repos_with_deps.len()),
        format!("Sections extracted     : {:>5}", stats.sections_extracted),
        format!("Groups extracted       : {:>5}", stats.groups_extracted),
        format!("Unique content hashes  : {:>5}", stats.unique_hashes),
        format!("Duplicated snippets    : {:>5}", stats.duplicates),
    ]
}

fn render_table(entries: &[&RegistryEntry]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Hash").add_attribute(Attribute::Bold),
            Cell::new("Sources").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);

    for entry in entries {
        let count_color = if entry.is_shared() {
            Color::Cyan
        } else {
            Color::DarkGrey
        };
        table.add_row(vec![
            Cell::new(entry.fingerprint.short()),
            Cell::new(entry.sorted_sources().join("\n")),
            Cell::new(entry.sources.len())
                .fg(count_color)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}
