use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::settings::Settings;

const API_BASE: &str = "https://api.github.com/repos";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

#[derive(Debug, Deserialize)]
struct RepoInfo {
    stargazers_count: u64,
}

/// Where a star count came from; only network hits count against the rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Cached(u64),
    Fetched(u64),
}

impl Lookup {
    pub fn stars(self) -> u64 {
        match self {
            Lookup::Cached(n) | Lookup::Fetched(n) => n,
        }
    }
}

/// GitHub REST client with a per-run star cache keyed by `owner/repo`.
pub struct GithubClient {
    http: Client,
    cache: HashMap<String, u64>,
}

impl GithubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent).context("Invalid user agent")?,
        );
        if let Some(token) = &settings.github_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Invalid GitHub token")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(GithubClient {
            http,
            cache: HashMap::new(),
        })
    }

    /// Star count for `owner/repo`, served from cache when already looked up.
    pub async fn stars(&mut self, repo: &str) -> Result<Lookup, FetchError> {
        if let Some(&n) = self.cache.get(repo) {
            debug!("Using cached star count for {}: {}", repo, n);
            return Ok(Lookup::Cached(n));
        }
        let n = self.stars_with_retry(repo).await?;
        self.cache.insert(repo.to_string(), n);
        Ok(Lookup::Fetched(n))
    }

    async fn stars_with_retry(&self, repo: &str) -> Result<u64, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_stars(repo).await {
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "{} (attempt {}/{}), backing off {:.1}s",
                        e,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn fetch_stars(&self, repo: &str) -> Result<u64, FetchError> {
        let url = repo_api_url(repo);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status { url, status });
        }
        let info: RepoInfo = response
            .json()
            .await
            .map_err(|source| FetchError::Decode { url, source })?;
        Ok(info.stargazers_count)
    }
}

fn repo_api_url(repo: &str) -> String {
    format!("{}/{}", API_BASE, repo)
}
