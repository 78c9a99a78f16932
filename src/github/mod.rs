//! Async HTTP clients for GitHub.
//!
//! - [`search`]: paginated repository discovery for an organization.
//! - [`raw`]: fetches a manifest from `raw.githubusercontent.com`, retrying
//!   once on the alternate default branch.

pub mod raw;
pub mod search;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::config::GithubConfig;

/// Build a GET request carrying the configured user agent and timeout.
fn get(client: &Client, config: &GithubConfig, url: &str, timeout_secs: u64) -> RequestBuilder {
    client
        .get(url)
        .header("User-Agent", config.user_agent.as_str())
        .timeout(Duration::from_secs(timeout_secs))
}
