//! Estimate, consumed effort and assignee encoded in a card title.
//!
//! Titles follow the scrum-plugin convention `(16) alice/do-thing [20]`:
//! a leading parenthesised estimate, an optional `member/` prefix and a
//! trailing bracketed consumed value. Each part is matched on its own and a
//! title that carries none of them is still valid.

use regex::Regex;
use std::sync::LazyLock;

static ESTIMATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(([-+]?[0-9]*\.?[0-9]+)\)").expect("valid estimate pattern")
});

static CONSUMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([-+]?[0-9]*\.?[0-9]+)\]$").expect("valid consumed pattern")
});

static MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\([-+]?[0-9]*\.?[0-9]+\)\s)?([a-zA-Z0-9_-]+)/").expect("valid member pattern")
});

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardMetadata {
    pub estimate: Option<f64>,
    pub consumed: Option<f64>,
    /// Empty when the title has no `member/` prefix.
    pub member: String,
}

pub fn parse_title(title: &str) -> CardMetadata {
    CardMetadata {
        estimate: capture_number(&ESTIMATE, title),
        consumed: capture_number(&CONSUMED, title),
        member: MEMBER
            .captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn capture_number(re: &Regex, title: &str) -> Option<f64> {
    re.captures(title)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
