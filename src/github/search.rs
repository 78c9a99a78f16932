use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::models::RepoInfo;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    full_name: String,
    default_branch: Option<String>,
}

/// Discover every repository of `config.owner` written in `config.language`.
///
/// Pages are requested until one comes back empty or short. Finding nothing
/// at all is an error, since the run has nothing to harvest.
pub async fn discover_repos(client: &Client, config: &GithubConfig) -> Result<Vec<RepoInfo>> {
    let mut repos = Vec::new();
    let mut page = 1;

    loop {
        let url = search_url(config, page);
        tracing::debug!("GET {}", url);

        let mut request = super::get(client, config, &url, config.search_timeout_secs)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Repository search failed for {}", config.owner))?;

        if !response.status().is_success() {
            bail!("GitHub API error: HTTP {} for {}", response.status(), url);
        }

        let body = response.text().await?;
        let items = parse_search_page(&body)?;
        let count = items.len();
        repos.extend(items);

        if is_last_page(count, config.per_page) {
            break;
        }
        page += 1;
    }

    if repos.is_empty() {
        bail!("No repositories found for {}", config.owner);
    }

    tracing::info!("Found {} {} repositories", repos.len(), config.language);
    Ok(repos)
}

fn search_url(config: &GithubConfig, page: usize) -> String {
    format!(
        "{}/search/repositories?q=org:{}+language:{}&per_page={}&page={}",
        config.api_url.trim_end_matches('/'),
        config.owner,
        config.language,
        config.per_page,
        page
    )
}

/// An empty page or one shorter than requested ends pagination.
fn is_last_page(items: usize, per_page: usize) -> bool {
    items == 0 || items < per_page
}

fn parse_search_page(body: &str) -> Result<Vec<RepoInfo>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Unexpected repository search response")?;

    Ok(response
        .items
        .into_iter()
        .map(|item| RepoInfo {
            name: item.name,
            full_name: item.full_name,
            default_branch: item.default_branch.unwrap_or_else(|| "main".to_string()),
        })
        .collect())
}
