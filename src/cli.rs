use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cargo-snippets",
    about = "Harvest Cargo.toml dependency groups across an organization and deduplicate them",
    version
)]
pub struct Cli {
    /// Output root; snippet directories are created beneath it
    #[arg(default_value = ".")]
    pub output: PathBuf,

    /// GitHub organization to harvest (overrides the config file)
    #[arg(long)]
    pub owner: Option<String>,

    /// Config file [default: <output>/.cargo-snippets/config.toml, fallback ~/.config/cargo-snippets/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Skip writing README.md summaries into the snippet directories
    #[arg(long)]
    pub no_readme: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); also lists every snippet
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

impl Cli {
    /// Default `tracing` filter derived from `--quiet` / `-v`.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "cargo_snippets=error";
        }
        match self.verbose {
            0 => "cargo_snippets=warn",
            1 => "cargo_snippets=info",
            2 => "cargo_snippets=debug",
            _ => "cargo_snippets=trace",
        }
    }
}
