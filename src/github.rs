//! # GitHub Label API Client
//!
//! Thin REST wrapper for the label surface the labeler touches:
//! mutating an item's labels, listing a pull request's changed files,
//! and keeping the repository's label catalog in sync with the
//! configuration. Label removal tolerates 404 so that repeated runs
//! stay idempotent at the API boundary.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use reqwest::{header, Client as HttpClient, Method, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::LabelSpec;
use crate::engine::{LabelAction, Operation};

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = "autolabel/0.1";

/// GitHub API client for label operations.
#[derive(Clone)]
pub struct GithubClient {
    http: HttpClient,
    base_url: String,
    token: String,
    owner: String,
    repo: String,
    rate_limit_remaining: i32,
    rate_limit_reset: Option<Instant>,
}

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded, resets in {reset_in:?}")]
    RateLimited { reset_in: Duration },
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepoLabel {
    name: String,
    color: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrFile {
    filename: String,
}

impl GithubClient {
    /// Create a client against api.github.com.
    ///
    /// # Errors
    /// Returns `GithubError::Http` if the HTTP client cannot be built.
    pub fn new(token: String, owner: String, repo: String) -> Result<Self, GithubError> {
        Self::with_base_url(token, owner, repo, API_ROOT.to_string())
    }

    /// Create a client against an explicit API root (for testing).
    ///
    /// # Errors
    /// Returns `GithubError::Http` if the HTTP client cannot be built.
    pub fn with_base_url(
        token: String,
        owner: String,
        repo: String,
        base_url: String,
    ) -> Result<Self, GithubError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
            owner,
            repo,
            rate_limit_remaining: 5000, // GitHub's default rate limit
            rate_limit_reset: None,
        })
    }

    /// Apply every operation in sequence, awaiting each mutation.
    ///
    /// The first failure aborts the remainder; earlier mutations stay
    /// applied (each operation is independent).
    ///
    /// # Errors
    /// Propagates the first failed mutation.
    pub async fn apply(&mut self, number: u64, operations: &[Operation]) -> Result<(), GithubError> {
        for operation in operations {
            match operation.action {
                LabelAction::Add => self.add_label(number, &operation.label).await?,
                LabelAction::Remove => self.remove_label(number, &operation.label).await?,
            }
        }
        Ok(())
    }

    /// Add a label to an issue or pull request.
    ///
    /// # Errors
    /// Returns `GithubError::Api` on a non-success response.
    pub async fn add_label(&mut self, number: u64, label: &str) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.base_url, self.owner, self.repo, number
        );
        let body = serde_json::json!({ "labels": [label] });

        let response = self.request(Method::POST, &url, Some(body)).await?;
        let status = response.status();
        if status.is_success() {
            info!("added label \"{label}\" to #{number}");
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    /// Remove a label from an issue or pull request.
    ///
    /// A 404 means the label is already absent and is treated as
    /// success, so re-running a computed operation cannot fail.
    ///
    /// # Errors
    /// Returns `GithubError::Api` on any other non-success response.
    pub async fn remove_label(&mut self, number: u64, label: &str) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels/{}",
            self.base_url, self.owner, self.repo, number, label
        );

        let response = self.request(Method::DELETE, &url, None).await?;
        match response.status().as_u16() {
            404 => {
                debug!("label \"{label}\" already absent from #{number}");
                Ok(())
            }
            status if (200..300).contains(&status) => {
                info!("removed label \"{label}\" from #{number}");
                Ok(())
            }
            _ => Err(api_error(response).await),
        }
    }

    /// Paths of the files a pull request touches.
    ///
    /// # Errors
    /// Returns `GithubError::Api` on a non-success response.
    pub async fn pr_files(&mut self, number: u64) -> Result<Vec<String>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files?per_page=100",
            self.base_url, self.owner, self.repo, number
        );

        let response = self.request(Method::GET, &url, None).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let files: Vec<PrFile> = response.json().await?;
        debug!("pull request #{number} touches {} file(s)", files.len());
        Ok(files.into_iter().map(|file| file.filename).collect())
    }

    /// Bring the repository's label catalog in line with configuration:
    /// missing labels are created, drifted colours/descriptions patched.
    /// Labels on the repository but not in configuration are left alone.
    ///
    /// # Errors
    /// Propagates the first failed list, create, or update call.
    pub async fn sync_labels(
        &mut self,
        specs: &IndexMap<String, LabelSpec>,
    ) -> Result<(), GithubError> {
        let existing = self.repo_labels().await?;
        let by_name: HashMap<&str, &RepoLabel> =
            existing.iter().map(|label| (label.name.as_str(), label)).collect();

        for spec in specs.values() {
            match by_name.get(spec.name.as_str()) {
                None => self.create_label(spec).await?,
                Some(current) if label_drifted(current, spec) => self.update_label(spec).await?,
                Some(_) => debug!("label \"{}\" already up to date", spec.name),
            }
        }
        Ok(())
    }

    async fn repo_labels(&mut self) -> Result<Vec<RepoLabel>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/labels?per_page=100",
            self.base_url, self.owner, self.repo
        );

        let response = self.request(Method::GET, &url, None).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn create_label(&mut self, spec: &LabelSpec) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/labels",
            self.base_url, self.owner, self.repo
        );
        let body = serde_json::json!({
            "name": spec.name,
            "color": normalise_colour(&spec.colour),
            "description": spec.description,
        });

        let response = self.request(Method::POST, &url, Some(body)).await?;
        if response.status().is_success() {
            info!("created label \"{}\"", spec.name);
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    async fn update_label(&mut self, spec: &LabelSpec) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/labels/{}",
            self.base_url, self.owner, self.repo, spec.name
        );
        let body = serde_json::json!({
            "color": normalise_colour(&spec.colour),
            "description": spec.description,
        });

        let response = self.request(Method::PATCH, &url, Some(body)).await?;
        if response.status().is_success() {
            info!("updated label \"{}\"", spec.name);
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    /// Make an HTTP request with rate limit tracking.
    async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, GithubError> {
        self.check_rate_limit()?;

        let mut request = self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        self.update_rate_limit(&response);

        if response.status().as_u16() == 403 {
            if let Some(reset_in) = rate_limit_reset(&response) {
                return Err(GithubError::RateLimited { reset_in });
            }
        }

        Ok(response)
    }

    fn check_rate_limit(&self) -> Result<(), GithubError> {
        if let Some(reset_at) = self.rate_limit_reset {
            if self.rate_limit_remaining <= 0 && Instant::now() < reset_at {
                return Err(GithubError::RateLimited {
                    reset_in: reset_at - Instant::now(),
                });
            }
        }
        Ok(())
    }

    fn update_rate_limit(&mut self, response: &Response) {
        if let Some(remaining) = header_i64(response, "x-ratelimit-remaining") {
            self.rate_limit_remaining = remaining as i32;
        }

        if let Some(reset) = header_i64(response, "x-ratelimit-reset") {
            let now = chrono::Utc::now().timestamp();
            let seconds_until_reset = (reset - now).max(0) as u64;
            self.rate_limit_reset = Some(Instant::now() + Duration::from_secs(seconds_until_reset));
        }
    }
}

/// Extract the reset delay from a rate-limited response.
fn rate_limit_reset(response: &Response) -> Option<Duration> {
    let remaining = header_i64(response, "x-ratelimit-remaining")?;
    if remaining > 0 {
        return None;
    }
    let reset = header_i64(response, "x-ratelimit-reset")?;
    let now = chrono::Utc::now().timestamp();
    Some(Duration::from_secs((reset - now).max(0) as u64))
}

fn header_i64(response: &Response, name: &str) -> Option<i64> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
}

async fn api_error(response: Response) -> GithubError {
    let status = response.status().as_u16();
    match response.json::<ApiMessage>().await {
        Ok(body) => GithubError::Api {
            status,
            message: body.message,
        },
        Err(err) => GithubError::Http(err),
    }
}

fn normalise_colour(colour: &str) -> String {
    colour.trim_start_matches('#').to_ascii_lowercase()
}

fn label_drifted(current: &RepoLabel, spec: &LabelSpec) -> bool {
    if normalise_colour(&current.color) != normalise_colour(&spec.colour) {
        return true;
    }
    current.description.as_deref().unwrap_or_default() != spec.description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_comparison_ignores_hash_and_case() {
        assert_eq!(normalise_colour("#D73A4A"), "d73a4a");
        assert_eq!(normalise_colour("d73a4a"), "d73a4a");
    }

    #[test]
    fn drift_detection_covers_colour_and_description() {
        let spec = LabelSpec {
            name: "bug".to_string(),
            colour: "#d73a4a".to_string(),
            description: "Something broke".to_string(),
        };

        let same = RepoLabel {
            name: "bug".to_string(),
            color: "D73A4A".to_string(),
            description: Some("Something broke".to_string()),
        };
        assert!(!label_drifted(&same, &spec));

        let other_colour = RepoLabel {
            name: "bug".to_string(),
            color: "ffffff".to_string(),
            description: Some("Something broke".to_string()),
        };
        assert!(label_drifted(&other_colour, &spec));

        let missing_description = RepoLabel {
            name: "bug".to_string(),
            color: "d73a4a".to_string(),
            description: None,
        };
        assert!(label_drifted(&missing_description, &spec));
    }
}
