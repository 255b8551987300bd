/// Characters stripped from both ends of a captured name or description.
const WRAPPING: &[char] = &['`', '"', '\'', ' '];

/// Strip surrounding quotes, backticks and spaces.
pub fn trim_wrapping(s: &str) -> &str {
    s.trim_matches(WRAPPING)
}

/// Normalize a raw launcher capture: trim, drop surrounding backticks/double
/// quotes, then cut off anything chained after the first `&`.
pub fn clean_command(raw: &str) -> String {
    let unwrapped = raw.trim().trim_matches(|c: char| c == '`' || c == '"');
    unwrapped
        .split('&')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Upper-case, underscore-delimited, and not a `PATH*` system variable.
pub fn is_env_var_name(name: &str) -> bool {
    name.contains('_')
        && !name.starts_with("PATH")
        && name.chars().any(|c| c.is_alphabetic())
        && !name.chars().any(|c| c.is_lowercase())
}

/// Slice of `text` spanning `radius` characters before `start` and after `end`
/// (byte offsets, as returned by regex matches). Clamps at the text bounds.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}
