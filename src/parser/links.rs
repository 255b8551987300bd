use std::sync::LazyLock;

use regex::Regex;

static LINK_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d\.\s*|\n|,").unwrap());
static GITHUB_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https://github\.com/[^\s'"]+"#).unwrap());
static GITHUB_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:www\.)?github\.com/[^\s,)]+").unwrap());

const INTERNAL_REPOS: &[&str] = &["block/goose", "squareup/mcp"];

/// All GitHub links in a free-text link cell. Cells list several links
/// separated by newlines, commas, or "1." style numbering.
pub fn extract_links(text: &str) -> Vec<String> {
    LINK_SPLIT_RE
        .split(text)
        .flat_map(|part| GITHUB_LINK_RE.find_iter(part))
        .map(|m| m.as_str().trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// First GitHub URL in `text`, without fragment, query, or trailing slash.
pub fn clean_link(text: &str) -> Option<String> {
    let url = GITHUB_URL_RE.find(text)?.as_str().trim();
    let url = url
        .split('#')
        .next()
        .unwrap_or_default()
        .split('?')
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    Some(url.to_string())
}

/// `owner/repo` for a GitHub URL, ignoring any tree/blob suffix.
pub fn github_repo(url: &str) -> Option<String> {
    let (_, rest) = url.trim().trim_end_matches('/').split_once("github.com/")?;
    let mut parts = rest.split('/').filter(|p| !p.is_empty());
    let owner = parts.next()?;
    let repo = parts.next()?;
    Some(format!("{}/{}", owner, repo))
}

/// Repositories maintained alongside the catalog itself.
pub fn is_internal(url: &str) -> bool {
    let lower = url.to_lowercase();
    INTERNAL_REPOS.iter().any(|r| lower.contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_and_comma_separated_links() {
        let cell = "1. https://github.com/acme/one 2. https://github.com/acme/two, https://gitlab.com/x/y\nhttps://github.com/acme/three/tree/main/src";
        assert_eq!(
            extract_links(cell),
            vec![
                "https://github.com/acme/one",
                "https://github.com/acme/two",
                "https://github.com/acme/three/tree/main/src",
            ]
        );
    }

    #[test]
    fn no_links() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("see docs at https://example.com").is_empty());
        assert_eq!(clean_link("no url here"), None);
    }

    #[test]
    fn cleans_fragment_query_and_slash() {
        assert_eq!(
            clean_link("Repo: https://github.com/acme/server/#readme").as_deref(),
            Some("https://github.com/acme/server")
        );
        assert_eq!(
            clean_link("(https://www.github.com/acme/server?tab=readme)").as_deref(),
            Some("https://www.github.com/acme/server")
        );
        assert_eq!(
            clean_link("https://github.com/a/b, https://github.com/c/d").as_deref(),
            Some("https://github.com/a/b")
        );
    }

    #[test]
    fn repo_from_url() {
        assert_eq!(github_repo("https://github.com/acme/server").as_deref(), Some("acme/server"));
        assert_eq!(
            github_repo("https://github.com/acme/server/tree/main/packages/x/").as_deref(),
            Some("acme/server")
        );
        assert_eq!(github_repo("https://github.com/acme"), None);
        assert_eq!(github_repo("https://gitlab.com/acme/server"), None);
    }

    #[test]
    fn internal_repos() {
        assert!(is_internal("https://github.com/Block/Goose/tree/main/crates"));
        assert!(is_internal("https://github.com/squareup/mcp"));
        assert!(!is_internal("https://github.com/acme/goose-tools"));
    }
}
