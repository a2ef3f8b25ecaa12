use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::config::CustomPattern;

// ===================================================================
// Rule table
// ===================================================================

/// Which kind of learning signal a rule detects. Both groups have the same
/// precedence; the label only matters for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalGroup {
    /// The user is correcting something the assistant did.
    Correction,
    /// The user is stating a habit, preference or project convention.
    Preference,
}

impl fmt::Display for SignalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalGroup::Correction => write!(f, "correction"),
            SignalGroup::Preference => write!(f, "preference"),
        }
    }
}

/// Built-in rules, in evaluation order. Patterns are written for
/// lower-cased input and carry no case-insensitivity flag.
const BUILTIN_RULES: &[(SignalGroup, &str)] = &[
    (
        SignalGroup::Correction,
        r"\bno[,.]?\s+(use|do|make|try|it'?s|that'?s|i said|i meant|i want)",
    ),
    (SignalGroup::Correction, r"\bthat'?s (wrong|incorrect|not right|not what)"),
    (SignalGroup::Correction, r"\bi said\b"),
    (SignalGroup::Correction, r"\bi meant\b"),
    (SignalGroup::Correction, r"\binstead\b"),
    (SignalGroup::Correction, r"\bnot\s+\w+[,.]?\s+(use|do|make|try)"),
    (SignalGroup::Correction, r"\bactually[,.]?\s+(use|do|make|it'?s|i)"),
    (SignalGroup::Correction, r"\bplease (don'?t|stop|avoid)"),
    (SignalGroup::Correction, r"\bwrong\b"),
    (SignalGroup::Correction, r"\bincorrect\b"),
    (SignalGroup::Preference, r"\bi (always|prefer|like to|want to|usually)\b"),
    (SignalGroup::Preference, r"\bwe (always|prefer|like to|want to|usually)\b"),
    (SignalGroup::Preference, r"\b(always|never) use\b"),
    (SignalGroup::Preference, r"\bour (convention|style|standard|pattern)\b"),
    (SignalGroup::Preference, r"\bin this (project|repo|codebase)\b"),
];

static BUILTIN: LazyLock<Vec<SignalRule>> = LazyLock::new(|| {
    BUILTIN_RULES
        .iter()
        .map(|(group, pattern)| {
            SignalRule::new(*group, pattern).expect("built-in signal pattern must compile")
        })
        .collect()
});

/// One compiled pattern and the group it belongs to.
#[derive(Debug, Clone)]
pub struct SignalRule {
    pub group: SignalGroup,
    regex: Regex,
}

impl SignalRule {
    pub fn new(group: SignalGroup, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            group,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, message: &str) -> bool {
        self.regex.is_match(message)
    }
}

// ===================================================================
// Detector
// ===================================================================

/// The first (message, rule) pair that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMatch<'a> {
    pub message_index: usize,
    pub group: SignalGroup,
    pub pattern: &'a str,
}

/// Stateless batch classifier over lower-cased user messages.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    rules: Vec<SignalRule>,
}

impl SignalDetector {
    /// Detector using only the built-in rule table.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN.clone(),
        }
    }

    /// Built-in rules followed by user-supplied ones. Extra patterns that
    /// fail to compile are skipped.
    pub fn with_extra(extra: &[CustomPattern]) -> Self {
        let mut detector = Self::builtin();
        for custom in extra {
            match SignalRule::new(custom.group, &custom.pattern) {
                Ok(rule) => detector.rules.push(rule),
                Err(err) => {
                    tracing::warn!(
                        pattern = %custom.pattern,
                        "skipping invalid extra pattern: {err}"
                    );
                }
            }
        }
        detector
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    /// Scan messages in order, trying every rule against each message, and
    /// stop at the first hit.
    pub fn detect<S: AsRef<str>>(&self, messages: &[S]) -> Option<SignalMatch<'_>> {
        messages.iter().enumerate().find_map(|(message_index, message)| {
            self.rules
                .iter()
                .find(|rule| rule.is_match(message.as_ref()))
                .map(|rule| SignalMatch {
                    message_index,
                    group: rule.group,
                    pattern: rule.pattern(),
                })
        })
    }
}
