//! Severity and trouble heuristics.
//!
//! The tables here are data, not control flow: [`Rules`] can be rebuilt from
//! the `[rules]` config section without touching the derivation code.

use serde::Deserialize;

use crate::types::Priority;

/// Substrings that mark an event as a connectivity problem (matched
/// case-insensitively).
pub const TROUBLE_KEYWORDS: &[&str] = &[
    "partial service",
    "loss of sync",
    "no ranging response",
    "retries exhausted",
    "t3 time-out",
    "t4 time-out",
    "sync timing",
];

/// Priority inference from message text. Order matters: first match wins.
pub const PRIORITY_RULES: &[(&str, Priority)] = &[
    ("t4 time-out", Priority::Critical),
    ("loss of sync", Priority::Critical),
    ("sync timing", Priority::Critical),
    ("no ranging response", Priority::Critical),
    ("retries exhausted", Priority::Critical),
    ("t3 time-out", Priority::Warning),
    ("partial service", Priority::Warning),
];

/// One `(substring, priority)` inference rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriorityRule {
    pub pattern: String,
    pub priority: Priority,
}

/// Ordered rule tables used to classify event rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rules {
    #[serde(default = "default_trouble_keywords")]
    pub trouble_keywords: Vec<String>,
    #[serde(default = "default_priority_rules", rename = "priority")]
    pub priority_rules: Vec<PriorityRule>,
    #[serde(default)]
    pub default_priority: Priority,
}

fn default_trouble_keywords() -> Vec<String> {
    TROUBLE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_priority_rules() -> Vec<PriorityRule> {
    PRIORITY_RULES
        .iter()
        .map(|(pattern, priority)| PriorityRule {
            pattern: pattern.to_string(),
            priority: *priority,
        })
        .collect()
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            trouble_keywords: default_trouble_keywords(),
            priority_rules: default_priority_rules(),
            default_priority: Priority::default(),
        }
    }
}

impl Rules {
    /// First matching rule's priority, or the default when none match.
    pub fn infer_priority(&self, message: &str) -> Priority {
        let message = message.to_lowercase();
        self.priority_rules
            .iter()
            .find(|rule| message.contains(&rule.pattern.to_lowercase()))
            .map(|rule| rule.priority)
            .unwrap_or(self.default_priority)
    }

    pub fn has_trouble_keyword(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.trouble_keywords
            .iter()
            .any(|keyword| message.contains(&keyword.to_lowercase()))
    }

    /// The modem-reported priority when recognisable, otherwise inferred from text.
    pub fn resolve_priority(&self, reported: Option<&str>, message: &str) -> Priority {
        reported
            .and_then(normalise_priority)
            .unwrap_or_else(|| self.infer_priority(message))
    }

    pub fn is_trouble(&self, message: &str, priority: Priority) -> bool {
        priority.is_error() || self.has_trouble_keyword(message)
    }
}

/// Map a modem-reported priority label onto [`Priority`].
///
/// Textual labels are matched by prefix (`crit*`, `warn*`, `err*`, `not*`);
/// numeric DOCSIS event levels 1–8 are mapped as well. Returns `None` for
/// anything else so the caller can fall back to inference.
pub fn normalise_priority(raw: &str) -> Option<Priority> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("crit") || value.starts_with("err") {
        return Some(Priority::Critical);
    }
    if value.starts_with("warn") {
        return Some(Priority::Warning);
    }
    if value.starts_with("not") {
        return Some(Priority::Notice);
    }
    match value.parse::<u8>().ok()? {
        1..=4 => Some(Priority::Critical),
        5 => Some(Priority::Warning),
        6..=8 => Some(Priority::Notice),
        _ => None,
    }
}
