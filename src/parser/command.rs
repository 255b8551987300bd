use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::clean_command;

pub const DOCKER_ONLY: &str = "Installation not compatible - Docker only";

static DOCKER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)docker\s+build\s+-t",
        r"(?is)docker\s+run\s+",
        r"(?is)docker-compose\s+up",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A launcher-matching pattern and the normalization applied to its capture.
struct LauncherPattern {
    label: &'static str,
    re: Regex,
    normalize: fn(&str) -> String,
}

impl LauncherPattern {
    fn new(label: &'static str, pattern: &str) -> Self {
        LauncherPattern {
            label,
            re: Regex::new(pattern).unwrap(),
            normalize: clean_command,
        }
    }
}

// Priority order. Append new idioms at the end.
static LAUNCHER_PATTERNS: LazyLock<Vec<LauncherPattern>> = LazyLock::new(|| {
    vec![
        LauncherPattern::new(
            "fenced_or_own_line",
            r"(?im)(?:```(?:\w+)?\s*)?((?:npx -y |uvx ).+?)(?:\s*```|\s*\n|$)",
        ),
        LauncherPattern::new(
            "labelled_section",
            r"(?im)(?:Installation:|Install:|To install:|Getting started:).*?\n.*?((?:npx -y |uvx ).+?)(?:\s*\n|$)",
        ),
        LauncherPattern::new(
            "inline_install_colon",
            r"(?im)install:?\s*((?:npx -y |uvx ).+?)(?:\s*\n|$)",
        ),
        LauncherPattern::new(
            "inline_install_dash",
            r"(?im)install\s*-\s*((?:npx -y |uvx ).+?)(?:\s*\n|$)",
        ),
        LauncherPattern::new(
            "quoted_install",
            r#"(?im)install:\s*[`"]?((?:npx -y |uvx ).+?)[`"]?(?:\s*[&]|$|\n)"#,
        ),
    ]
});

/// Outcome of command extraction for one catalog entry.
///
/// Serializes as a plain string: `""`, [`DOCKER_ONLY`], or the command text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstallCommand {
    #[default]
    NotFound,
    DockerOnly,
    Command(String),
}

impl InstallCommand {
    pub fn as_str(&self) -> &str {
        match self {
            InstallCommand::NotFound => "",
            InstallCommand::DockerOnly => DOCKER_ONLY,
            InstallCommand::Command(cmd) => cmd,
        }
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for InstallCommand {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" => InstallCommand::NotFound,
            DOCKER_ONLY => InstallCommand::DockerOnly,
            _ => InstallCommand::Command(s),
        }
    }
}

impl From<InstallCommand> for String {
    fn from(cmd: InstallCommand) -> Self {
        match cmd {
            InstallCommand::Command(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// Pick the install command for an entry. Notes outrank documentation, and a
/// docker-centric install anywhere outranks every launcher match.
pub fn extract_command(documentation: &str, notes: &str) -> InstallCommand {
    if is_docker_only(notes) || is_docker_only(documentation) {
        return InstallCommand::DockerOnly;
    }

    for source in [notes, documentation] {
        if source.is_empty() {
            continue;
        }
        if let Some(cmd) = find_launcher(source) {
            return if cmd.is_empty() {
                InstallCommand::NotFound
            } else {
                InstallCommand::Command(cmd)
            };
        }
    }

    InstallCommand::NotFound
}

fn is_docker_only(text: &str) -> bool {
    !text.is_empty() && DOCKER_PATTERNS.iter().any(|re| re.is_match(text))
}

fn find_launcher(text: &str) -> Option<String> {
    LAUNCHER_PATTERNS.iter().find_map(|p| {
        let caps = p.re.captures(text)?;
        let raw = caps.get(1)?.as_str();
        tracing::debug!(pattern = p.label, raw, "launcher matched");
        Some((p.normalize)(raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs() {
        assert_eq!(extract_command("", ""), InstallCommand::NotFound);
        assert_eq!(extract_command("", "").as_str(), "");
    }

    #[test]
    fn notes_install_label() {
        let cmd = extract_command("", "Install: npx -y some-pkg@latest");
        assert_eq!(cmd, InstallCommand::Command("npx -y some-pkg@latest".into()));
    }

    #[test]
    fn fenced_uvx() {
        let doc = "## Usage\n\n```bash\nuvx my-tool --flag\n```\n";
        assert_eq!(extract_command(doc, "").as_str(), "uvx my-tool --flag");
    }

    #[test]
    fn truncates_shell_chaining() {
        assert_eq!(
            extract_command("npx -y server-x && echo done", "").as_str(),
            "npx -y server-x"
        );
    }

    #[test]
    fn docker_dominates_launchers() {
        let doc = "Run `npx -y thing` locally.\n\nOr: docker run -it --rm thing\n";
        assert_eq!(extract_command(doc, ""), InstallCommand::DockerOnly);
        assert_eq!(extract_command(doc, "").as_str(), DOCKER_ONLY);
    }

    #[test]
    fn docker_in_notes_any_case() {
        let cmd = extract_command("uvx clean-tool", "DOCKER BUILD -t my/image .");
        assert_eq!(cmd, InstallCommand::DockerOnly);
        let cmd = extract_command("Start with Docker-Compose   up -d", "npx -y a");
        assert_eq!(cmd, InstallCommand::DockerOnly);
    }

    #[test]
    fn docker_pattern_spans_lines() {
        let doc = "docker\nrun\n  image";
        assert_eq!(extract_command(doc, ""), InstallCommand::DockerOnly);
    }

    #[test]
    fn bare_docker_mention_is_not_docker_only() {
        let doc = "Works great alongside Docker.\n\n```\nnpx -y @acme/server\n```";
        assert_eq!(extract_command(doc, "").as_str(), "npx -y @acme/server");
    }

    #[test]
    fn notes_outrank_documentation() {
        let cmd = extract_command("npx -y from-readme", "uvx from-notes");
        assert_eq!(cmd.as_str(), "uvx from-notes");
    }

    #[test]
    fn falls_back_to_documentation() {
        let cmd = extract_command("Install with `npx -y from-readme`", "see README");
        assert_eq!(cmd.as_str(), "npx -y from-readme");
    }

    #[test]
    fn first_match_within_text_wins() {
        let doc = "uvx first-tool\nnpx -y second-tool\n";
        assert_eq!(extract_command(doc, "").as_str(), "uvx first-tool");
    }

    #[test]
    fn bare_launcher_name_is_ignored() {
        let doc = "You will need npx and uv installed.";
        assert_eq!(extract_command(doc, ""), InstallCommand::NotFound);
    }

    #[test]
    fn readme_fixture() {
        let md = std::fs::read_to_string("tests/fixtures/weather_server.md").unwrap();
        assert_eq!(
            extract_command(&md, "").as_str(),
            "npx -y @acme/weather-mcp@latest"
        );
    }

    #[test]
    fn docker_fixture() {
        let md = std::fs::read_to_string("tests/fixtures/docker_server.md").unwrap();
        assert_eq!(extract_command(&md, ""), InstallCommand::DockerOnly);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&InstallCommand::DockerOnly).unwrap();
        assert_eq!(json, format!("\"{}\"", DOCKER_ONLY));
        let json = serde_json::to_string(&InstallCommand::NotFound).unwrap();
        assert_eq!(json, "\"\"");
        let back: InstallCommand = serde_json::from_str("\"uvx tool\"").unwrap();
        assert_eq!(back, InstallCommand::Command("uvx tool".into()));
    }
}
