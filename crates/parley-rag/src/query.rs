use regex::Regex;
use std::sync::OnceLock;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s\-]").expect("valid regex"))
}

/// Normalize a user message into a full-text query
///
/// Whitespace runs collapse to one space and everything except word
/// characters, whitespace and hyphens is stripped.
pub fn sanitize_query(raw: &str) -> String {
    let collapsed = whitespace_runs().replace_all(raw, " ");
    let stripped = disallowed_chars().replace_all(collapsed.trim(), "");
    stripped.trim().to_string()
}
