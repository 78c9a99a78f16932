//! `cargo-snippets`: harvest `Cargo.toml` dependency groups across an organization.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up `tracing`.
//! 2. Load config ([`config::load_config`]) and create the output layout ([`output`]).
//! 3. Discover the organization's repositories ([`github::search`]).
//! 4. Fetch each manifest with branch fallback ([`github::raw`]).
//! 5. Extract sections and groups ([`extract`]), fingerprint them ([`fingerprint`]),
//!    and deduplicate into the registry ([`registry`]) via [`pipeline::Harvester`].
//! 6. Write README summaries ([`report::markdown`]) and render the run report.
//!
//! Setup and discovery failures exit non-zero; per-repository and per-file
//! failures are logged and counted.

mod cli;
mod config;
mod extract;
mod fingerprint;
mod github;
mod models;
mod output;
mod pipeline;
mod registry;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, ReportFormat};
use config::load_config;
use github::raw::{fetch_manifest, FetchOutcome};
use github::search::discover_repos;
use output::Layout;
use pipeline::Harvester;
use registry::DedupRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = load_config(&cli.output, cli.config.as_deref())?;
    if let Some(owner) = &cli.owner {
        config.github.owner = owner.clone();
    }
    let owner = config.github.owner.clone();

    let layout = Layout::new(&cli.output, &config.output, &owner);
    layout.ensure()?;

    let client = reqwest::Client::builder()
        .build()
        .context("Cannot build HTTP client")?;

    let repos = discover_repos(&client, &config.github).await?;

    let mut registry = DedupRegistry::new();
    let mut harvester = Harvester::new(&config.sections.headers, layout.clone())?;

    let pb = if !cli.quiet && cli.verbose == 0 {
        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for repo in &repos {
        if let Some(pb) = &pb {
            pb.set_message(repo.name.clone());
        }
        tracing::info!("Processing {}", repo.full_name);

        let outcome =
            fetch_manifest(&client, &config.github, &repo.name, &repo.default_branch).await;

        // Log lines share stderr with the bar, so draw them with the bar hidden.
        suspend_bar(pb.as_ref(), || match outcome {
            Ok(FetchOutcome::Found(document)) => {
                harvester.process_repo(&mut registry, &repo.name, &document);
            }
            Ok(FetchOutcome::NotFound) => {
                tracing::warn!("[SKIP] No {} found in {}", config.github.manifest, repo.name);
                harvester.mark_failed();
            }
            Err(e) => {
                tracing::warn!("[ERROR] {}: {:#}", repo.name, e);
                harvester.mark_failed();
            }
        });

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let mut stats = harvester.finish(&registry, repos.len());
    if !cli.no_readme {
        let failures = report::markdown::write_readmes(&layout, &owner, &stats, &registry);
        stats.write_failures += failures;
    }

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&stats, &registry, &owner, cli.verbose > 0, cli.quiet);
        }
        ReportFormat::Json => {
            println!("{}", report::json::render(&stats, &registry, &owner)?);
        }
    }

    Ok(())
}

/// Run `f` with the progress bar (if any) cleared from the terminal.
fn suspend_bar<R>(pb: Option<&ProgressBar>, f: impl FnOnce() -> R) -> R {
    match pb {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `-v` / `-q`.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
