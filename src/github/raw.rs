use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};

use crate::config::GithubConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(String),
    /// Neither the requested nor the alternate branch has the manifest.
    NotFound,
}

/// Fetch `config.manifest` from `repo` at `branch`.
///
/// A 404 is retried once against [`alternate_branch`]. Any other non-200
/// status, or a transport error, is returned as an error. No other retries.
pub async fn fetch_manifest(
    client: &Client,
    config: &GithubConfig,
    repo: &str,
    branch: &str,
) -> Result<FetchOutcome> {
    let mut response = send(client, config, repo, branch).await?;

    if response.status() == StatusCode::NOT_FOUND {
        let alt = alternate_branch(branch);
        tracing::debug!("{} not found on {}/{}, trying {}", config.manifest, repo, branch, alt);
        response = send(client, config, repo, alt).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
    }

    if response.status() != StatusCode::OK {
        bail!("HTTP {} for {}", response.status(), repo);
    }

    let text = response
        .text()
        .await
        .with_context(|| format!("Cannot read {} body for {}", config.manifest, repo))?;
    Ok(FetchOutcome::Found(text))
}

async fn send(
    client: &Client,
    config: &GithubConfig,
    repo: &str,
    branch: &str,
) -> Result<reqwest::Response> {
    let url = raw_url(config, repo, branch);
    tracing::debug!("GET {}", url);
    super::get(client, config, &url, config.fetch_timeout_secs)
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))
}

/// `main` falls back to `master`; every other branch falls back to `main`.
pub fn alternate_branch(branch: &str) -> &'static str {
    if branch == "main" {
        "master"
    } else {
        "main"
    }
}

fn raw_url(config: &GithubConfig, repo: &str, branch: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        config.raw_url.trim_end_matches('/'),
        config.owner,
        repo,
        branch,
        config.manifest
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_branch() {
        assert_eq!(alternate_branch("main"), "master");
        assert_eq!(alternate_branch("master"), "main");
        assert_eq!(alternate_branch("develop"), "main");
    }

    fn mock_config(server: &wiremock::MockServer) -> GithubConfig {
        GithubConfig {
            raw_url: server.uri(),
            ..GithubConfig::default()
        }
    }

    async fn respond(server: &wiremock::MockServer, branch: &str, status: u16, body: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(format!("/portal-co/rice/{}/Cargo.toml", branch)))
            .respond_with(wiremock::ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_found_on_requested_branch() {
        let server = wiremock::MockServer::start().await;
        respond(&server, "main", 200, "[dependencies]\nlog = \"0.4\"\n").await;

        let outcome = fetch_manifest(&Client::new(), &mock_config(&server), "rice", "main")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Found("[dependencies]\nlog = \"0.4\"\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_404_retries_alternate_branch() {
        let server = wiremock::MockServer::start().await;
        respond(&server, "main", 404, "").await;
        respond(&server, "master", 200, "[dependencies]\nserde = \"1\"").await;

        let outcome = fetch_manifest(&Client::new(), &mock_config(&server), "rice", "main")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Found("[dependencies]\nserde = \"1\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_other_branch_falls_back_to_main() {
        let server = wiremock::MockServer::start().await;
        respond(&server, "develop", 404, "").await;
        respond(&server, "main", 200, "x = 1").await;

        let outcome = fetch_manifest(&Client::new(), &mock_config(&server), "rice", "develop")
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Found("x = 1".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_both_branches_missing() {
        let server = wiremock::MockServer::start().await;
        respond(&server, "main", 404, "").await;
        respond(&server, "master", 404, "").await;

        let outcome = fetch_manifest(&Client::new(), &mock_config(&server), "rice", "main")
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_not_retried() {
        let server = wiremock::MockServer::start().await;
        respond(&server, "main", 500, "boom").await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/portal-co/rice/master/Cargo.toml"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = fetch_manifest(&Client::new(), &mock_config(&server), "rice", "main").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_url() {
        let config = GithubConfig::default();
        assert_eq!(
            raw_url(&config, "rice", "main"),
            "https://raw.githubusercontent.com/portal-co/rice/main/Cargo.toml"
        );
    }
}
