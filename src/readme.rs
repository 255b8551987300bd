use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::FetchError;

const RAW_HOST: &str = "https://raw.githubusercontent.com";
const README: &str = "README.md";

/// Raw-content URLs that may hold the README for a GitHub link, the parent
/// directory before the linked path. Empty for non-GitHub links.
pub fn readme_candidates(url: &str) -> Vec<String> {
    let url = url.trim().replace("/blob/", "/tree/");
    let Some((_, rest)) = url.split_once("github.com/") else {
        return Vec::new();
    };
    let segments: Vec<&str> = rest
        .split(['#', '?'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let [owner, repo, tail @ ..] = segments.as_slice() else {
        return Vec::new();
    };

    let (branches, path): (Vec<&str>, &[&str]) = match tail {
        ["tree", branch, path @ ..] if *branch == "main" => (vec!["main", "master"], path),
        ["tree", branch, path @ ..] => (vec![*branch], path),
        _ => (vec!["main", "master"], &[][..]),
    };

    let mut dirs = Vec::new();
    if let [parent @ .., _] = path {
        dirs.push(parent.join("/"));
    }
    dirs.push(path.join("/"));

    let mut candidates: Vec<String> = Vec::new();
    for branch in branches {
        for dir in &dirs {
            let candidate = if dir.is_empty() {
                format!("{}/{}/{}/{}/{}", RAW_HOST, owner, repo, branch, README)
            } else {
                format!("{}/{}/{}/{}/{}/{}", RAW_HOST, owner, repo, branch, dir, README)
            };
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Download the first README that resolves. Failures are logged and yield `None`.
pub async fn fetch_readme(client: &Client, link: &str) -> Option<String> {
    for candidate in readme_candidates(link) {
        match fetch_text(client, &candidate).await {
            Ok(text) => {
                debug!("README for {} found at {}", link, candidate);
                return Some(text);
            }
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                debug!("No README at {}", candidate);
            }
            Err(e) => warn!("{}", e),
        }
    }
    debug!("No README resolved for {}", link);
    None
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status { url: url.to_string(), status });
    }
    response
        .text()
        .await
        .map_err(|source| FetchError::Decode { url: url.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_repo_tries_main_then_master() {
        assert_eq!(
            readme_candidates("https://github.com/acme/server"),
            vec![
                "https://raw.githubusercontent.com/acme/server/main/README.md",
                "https://raw.githubusercontent.com/acme/server/master/README.md",
            ]
        );
    }

    #[test]
    fn tree_parent_then_path() {
        assert_eq!(
            readme_candidates("https://github.com/acme/mono/tree/main/src/weather"),
            vec![
                "https://raw.githubusercontent.com/acme/mono/main/src/README.md",
                "https://raw.githubusercontent.com/acme/mono/main/src/weather/README.md",
                "https://raw.githubusercontent.com/acme/mono/master/src/README.md",
                "https://raw.githubusercontent.com/acme/mono/master/src/weather/README.md",
            ]
        );
    }

    #[test]
    fn blob_link_to_readme_file() {
        let candidates = readme_candidates("https://github.com/acme/server/blob/dev/README.md");
        assert_eq!(
            candidates,
            vec![
                "https://raw.githubusercontent.com/acme/server/dev/README.md",
                "https://raw.githubusercontent.com/acme/server/dev/README.md/README.md",
            ]
        );
    }

    #[test]
    fn tree_root_deduplicated() {
        assert_eq!(
            readme_candidates("https://github.com/acme/server/tree/v2/"),
            vec!["https://raw.githubusercontent.com/acme/server/v2/README.md"]
        );
    }

    #[test]
    fn non_github_links() {
        assert!(readme_candidates("https://gitlab.com/acme/server").is_empty());
        assert!(readme_candidates("https://github.com/acme").is_empty());
    }
}
