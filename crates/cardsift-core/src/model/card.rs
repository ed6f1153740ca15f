use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The two board layouts with distinct estimate rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardMode {
    /// Sprint board: every card carries a dedicated estimate badge element.
    Scrum,
    /// Flow board: cards only render a badge when an estimate exists.
    Kanban,
}

impl BoardMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Scrum => "scrum",
            Self::Kanban => "kanban",
        }
    }
}

impl fmt::Display for BoardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a board mode from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid board mode: '{got}'")]
pub struct ParseModeError {
    pub got: String,
}

impl FromStr for BoardMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scrum" => Ok(Self::Scrum),
            "kanban" => Ok(Self::Kanban),
            _ => Err(ParseModeError { got: s.to_string() }),
        }
    }
}

/// One card as currently rendered by the board.
///
/// Snapshots are re-derived from the live tree on every reconciliation pass
/// and never retained between passes, so a pass can never act on stale card
/// data. Absent fields mean the corresponding element or attribute was not
/// found (board contract mismatch, treated as "no match").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    /// Identifying key, e.g. `PROJ-142`.
    pub key: String,
    /// Display name parsed from the avatar alt text, when rendered.
    pub assignee: Option<String>,
    /// Raw text of the estimate badge element, when present.
    pub estimate_badge: Option<String>,
    /// Version label extracted from the card, when one matches.
    pub version: Option<String>,
    /// Summary line.
    pub summary: String,
}

impl CardSnapshot {
    /// Whether the card counts as unestimated under the given board mode.
    ///
    /// Scrum boards render a badge on every card, so blank or point-less
    /// badge text means "no estimate". Kanban boards omit the badge entirely
    /// for unestimated cards, so any badge at all counts as estimated. The
    /// two branches are deliberately not interchangeable.
    #[must_use]
    pub fn is_unestimated(&self, mode: BoardMode) -> bool {
        match mode {
            BoardMode::Scrum => self
                .estimate_badge
                .as_deref()
                .is_none_or(|text| !text.chars().any(|c| c.is_ascii_digit())),
            BoardMode::Kanban => self.estimate_badge.is_none(),
        }
    }

    /// Case-insensitive match of `needle` against the key or the summary.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.key.to_lowercase().contains(&needle) || self.summary.to_lowercase().contains(&needle)
    }
}

/// Parse an avatar alt text of the form `"Assignee: <name>"`.
///
/// Anything else (including a bare name without the prefix) is a contract
/// mismatch and yields `None`.
#[must_use]
pub fn parse_assignee_alt(alt: &str) -> Option<&str> {
    let name = alt.strip_prefix("Assignee:")?.trim();
    if name.is_empty() { None } else { Some(name) }
}

/// Extract a version label from short card text.
///
/// A version is a run of digits and dots containing at least one dot and
/// digits on both sides of it, e.g. `4.8.6` inside `"v4.8.6 hotfix"`.
#[must_use]
pub fn extract_version(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }

        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }

        let candidate = text[start..end].trim_matches('.');
        if candidate.contains('.')
            && candidate
                .split('.')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Some(candidate.to_string());
        }

        start = end.max(start + 1);
    }

    None
}
