use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::text::{context_window, is_env_var_name, trim_wrapping};

pub const NO_DESCRIPTION: &str = "No description available";

/// Characters scanned on each side of a match for requiredness keywords.
const REQUIRED_WINDOW: usize = 50;

static REQUIRED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)required|must be set|needs to be set|necessary|mandatory").unwrap()
});

/// Group 1 is the variable name, group 2 (optional) its description.
struct EnvPattern {
    label: &'static str,
    re: Regex,
}

// Evaluated in order; earlier families win on duplicate names.
static ENV_PATTERNS: LazyLock<Vec<EnvPattern>> = LazyLock::new(|| {
    [
        // "Set the following environment variables:" then "- NAME: description"
        (
            "cue_list",
            r"(?i:set|configure|add|export|required|environment|env).*?(?i:variables?|vars?|configuration).*?\n[-*\s]*[`'\x22]?([A-Z][A-Z0-9_]+)[`'\x22]?[ \t]*(?:[:=-][ \t]*([^\n]*))?[^\n]*",
        ),
        // export NAME=value # comment
        (
            "shell_export",
            r"(?:```(?:\w+)?\s*)?(?:(?i:export)\s+)?([A-Z][A-Z0-9_]+)=(?:[^\n#]*#[ \t]*([^\n]*))?",
        ),
        // "env": { "NAME": "value" }
        (
            "env_block",
            r#"(?i:env)["']?:\s*\{\s*["']?([A-Z][A-Z0-9_]+)["']?:\s*["']?([^"'\n]*)"#,
        ),
        // Required environment variable: `NAME` - description
        (
            "required_callout",
            r"(?i:required).*?(?i:variables?|env).*?[:`]\s*`?([A-Z][A-Z0-9_]+)`?(?:[ \t]*[-:][ \t]*([^\n]*))?",
        ),
    ]
    .into_iter()
    .map(|(label, pattern)| EnvPattern {
        label,
        re: Regex::new(pattern).unwrap(),
    })
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarDescriptor {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Insertion-ordered set of accepted variables, keyed by name.
#[derive(Default)]
struct FoundVars {
    names: HashSet<String>,
    vars: Vec<EnvVarDescriptor>,
}

impl FoundVars {
    /// Returns false when the candidate was rejected or already seen.
    fn offer(&mut self, text: &str, caps: &Captures) -> bool {
        let Some(m) = caps.get(1) else {
            return false;
        };
        let name = trim_wrapping(m.as_str());
        if !is_env_var_name(name) || self.names.contains(name) {
            return false;
        }

        let description = caps
            .get(2)
            .map(|d| trim_wrapping(d.as_str()))
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION);

        let whole = caps.get(0).unwrap_or(m);
        let context = context_window(text, whole.start(), whole.end(), REQUIRED_WINDOW);

        self.names.insert(name.to_string());
        self.vars.push(EnvVarDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            required: REQUIRED_RE.is_match(context),
        });
        true
    }
}

/// Mine environment variables from README text, first occurrence wins.
pub fn extract_env_vars(documentation: &str) -> Vec<EnvVarDescriptor> {
    let mut found = FoundVars::default();
    if documentation.is_empty() {
        return found.vars;
    }

    for pattern in ENV_PATTERNS.iter() {
        for caps in pattern.re.captures_iter(documentation) {
            if found.offer(documentation, &caps) {
                tracing::debug!(pattern = pattern.label, name = &caps[1], "env var accepted");
            }
        }
    }

    found.vars
}
