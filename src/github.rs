//! GitHub API interaction module
//!
//! Provides the [`ReleaseClient`] seam the installer and updater talk to, and
//! its blocking reqwest implementation.

use crate::types::{GitHubRelease, Settings};
use reqwest::blocking::{Client, Request};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_DOWNLOAD_URL: &str = "https://github.com";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("error requesting {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Message reported by the API in its error payload, passed through as is.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("error parsing {what} as JSON: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Read-only access to a release index plus raw artifact downloads.
pub trait ReleaseClient {
    fn latest_release(&self, org: &str, repo: &str) -> Result<GitHubRelease, GitHubError>;

    fn download_release_asset(
        &self,
        org: &str,
        repo: &str,
        tag: &str,
        asset: &str,
    ) -> Result<Vec<u8>, GitHubError>;

    /// Plain GET returning the body whatever the status code.
    fn download(&self, url: &str) -> Result<Vec<u8>, GitHubError>;
}

pub fn build_latest_release_url(api_url: &str, org: &str, repo: &str) -> String {
    format!("{}/repos/{}/{}/releases/latest", api_url, org, repo)
}

pub fn build_asset_url(
    download_url: &str,
    org: &str,
    repo: &str,
    tag: &str,
    asset: &str,
) -> String {
    format!(
        "{}/{}/{}/releases/download/{}/{}",
        download_url, org, repo, tag, asset
    )
}

/// Decodes a release index response. Non-success responses carry a
/// `{"message": ...}` payload whose text becomes the error.
pub fn parse_release(status: StatusCode, body: &[u8]) -> Result<GitHubRelease, GitHubError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(|source| GitHubError::Decode {
            what: "release response",
            source,
        });
    }

    let error: ErrorBody = serde_json::from_slice(body).map_err(|source| GitHubError::Decode {
        what: "error response",
        source,
    })?;
    Err(GitHubError::Api {
        status,
        message: error.message,
    })
}

pub struct GitHubClient {
    http: Client,
    api_url: String,
    download_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .user_agent(concat!("grab/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| GitHubError::Request {
                url: settings.api_url.clone(),
                source,
            })?;

        if settings.github_token.is_none() {
            tracing::debug!("No GitHub token set, API requests are unauthenticated");
        }

        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            download_url: settings.download_url.trim_end_matches('/').to_string(),
            token: settings.github_token.clone(),
        })
    }

    fn get_bytes(&self, url: &str) -> Result<(StatusCode, Vec<u8>), GitHubError> {
        let request_error = |source| GitHubError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().map_err(request_error)?;
        Ok((status, body.to_vec()))
    }

    /// Latest-release lookup with the GitHub API headers and, when a token is
    /// configured, the bearer credential.
    fn latest_release_request(&self, org: &str, repo: &str) -> Result<Request, GitHubError> {
        let url = build_latest_release_url(&self.api_url, org, repo);

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
            tracing::debug!("Using GitHub token");
        }

        request
            .build()
            .map_err(|source| GitHubError::Request { url, source })
    }
}

impl ReleaseClient for GitHubClient {
    fn latest_release(&self, org: &str, repo: &str) -> Result<GitHubRelease, GitHubError> {
        let request = self.latest_release_request(org, repo)?;
        let url = request.url().to_string();
        tracing::debug!("Fetching GitHub release info from: {}", url);

        let request_error = |source| GitHubError::Request {
            url: url.clone(),
            source,
        };
        let response = self.http.execute(request).map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().map_err(request_error)?;

        parse_release(status, &body)
    }

    fn download_release_asset(
        &self,
        org: &str,
        repo: &str,
        tag: &str,
        asset: &str,
    ) -> Result<Vec<u8>, GitHubError> {
        let url = build_asset_url(&self.download_url, org, repo, tag, asset);
        tracing::debug!("Downloading asset from GitHub: {}", url);
        self.download(&url)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, GitHubError> {
        let (status, body) = self.get_bytes(url)?;
        if !status.is_success() {
            tracing::warn!("GET {} returned status {}", url, status);
        }
        Ok(body)
    }
}
