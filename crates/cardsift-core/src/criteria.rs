//! Combined filter criteria and the per-card visibility predicate.
//!
//! The four dimensions compose by logical AND. A dimension in its default
//! state (no assignee, empty query, flag off, empty version set) is
//! *inactive*: it matches everything, never nothing.

use crate::model::{BoardMode, CardSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The one record of current filter criteria.
///
/// Mutated only by UI event handlers (through the controller); read fresh by
/// every reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Assignee display name to filter to, `None` = inactive.
    pub assignee: Option<String>,
    /// Free-text search over key and summary, empty = inactive.
    pub search_query: String,
    /// Show only cards without an estimate.
    pub unestimated_only: bool,
    /// Fix versions to keep, empty = inactive.
    pub selected_versions: BTreeSet<String>,
}

impl FilterCriteria {
    /// Whether any dimension is active.
    #[must_use]
    pub fn is_any_active(&self) -> bool {
        self.assignee.is_some()
            || !self.search_query.is_empty()
            || self.unestimated_only
            || !self.selected_versions.is_empty()
    }

    /// Evaluate the full predicate for one card.
    ///
    /// `reviewer` is the server-sourced reviewer for this card's key, if any.
    /// It deliberately extends the assignee dimension beyond the rendered
    /// avatar: the reviewer custom field and the avatar are different
    /// identity sources and either may match.
    #[must_use]
    pub fn matches(&self, card: &CardSnapshot, reviewer: Option<&str>, mode: BoardMode) -> bool {
        self.matches_estimate(card, mode)
            && self.matches_assignee(card, reviewer)
            && self.matches_version(card)
            && self.matches_search(card)
    }

    fn matches_estimate(&self, card: &CardSnapshot, mode: BoardMode) -> bool {
        !self.unestimated_only || card.is_unestimated(mode)
    }

    fn matches_assignee(&self, card: &CardSnapshot, reviewer: Option<&str>) -> bool {
        let Some(wanted) = self.assignee.as_deref() else {
            return true;
        };
        card.assignee.as_deref() == Some(wanted) || reviewer == Some(wanted)
    }

    fn matches_version(&self, card: &CardSnapshot) -> bool {
        if self.selected_versions.is_empty() {
            return true;
        }
        card.version
            .as_deref()
            .is_some_and(|version| self.selected_versions.contains(version))
    }

    fn matches_search(&self, card: &CardSnapshot) -> bool {
        self.search_query.is_empty() || card.matches_text(&self.search_query)
    }
}

#[cfg(test)]
mod tests {
    use super::FilterCriteria;
    use crate::model::{BoardMode, CardSnapshot};
    use std::collections::BTreeSet;

    fn card(key: &str, assignee: Option<&str>, badge: Option<&str>, version: Option<&str>) -> CardSnapshot {
        CardSnapshot {
            key: key.to_string(),
            assignee: assignee.map(str::to_string),
            estimate_badge: badge.map(str::to_string),
            version: version.map(str::to_string),
            summary: "Ödeme sayfası yenileme".to_string(),
        }
    }

    #[test]
    fn default_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_any_active());
        let c = card("PROJ-7", None, None, None);
        assert!(criteria.matches(&c, None, BoardMode::Scrum));
        assert!(criteria.matches(&c, None, BoardMode::Kanban));
    }

    #[test]
    fn assignee_matches_avatar_or_reviewer() {
        let criteria = FilterCriteria {
            assignee: Some("Ayşe".to_string()),
            ..FilterCriteria::default()
        };

        let by_avatar = card("PROJ-1", Some("Ayşe"), Some("5"), None);
        assert!(criteria.matches(&by_avatar, None, BoardMode::Scrum));

        let by_reviewer = card("PROJ-2", Some("Mehmet"), Some("3"), None);
        assert!(criteria.matches(&by_reviewer, Some("Ayşe"), BoardMode::Scrum));

        let neither = card("PROJ-3", Some("Mehmet"), Some("3"), None);
        assert!(!criteria.matches(&neither, None, BoardMode::Scrum));
        assert!(!criteria.matches(&neither, Some("Zeynep"), BoardMode::Scrum));
    }

    #[test]
    fn unestimated_only_hides_estimated() {
        let criteria = FilterCriteria {
            unestimated_only: true,
            ..FilterCriteria::default()
        };

        assert!(criteria.matches(&card("A-1", None, Some("  "), None), None, BoardMode::Scrum));
        assert!(!criteria.matches(&card("A-2", None, Some("5"), None), None, BoardMode::Scrum));
    }

    #[test]
    fn version_filter_requires_extractable_version() {
        let criteria = FilterCriteria {
            selected_versions: BTreeSet::from(["4.8.6".to_string()]),
            ..FilterCriteria::default()
        };

        assert!(criteria.matches(&card("V-1", None, None, Some("4.8.6")), None, BoardMode::Kanban));
        assert!(!criteria.matches(&card("V-2", None, None, Some("4.9.0")), None, BoardMode::Kanban));
        // No extractable version on the card: an active version filter hides it.
        assert!(!criteria.matches(&card("V-3", None, None, None), None, BoardMode::Kanban));
    }

    #[test]
    fn search_matches_key_or_summary() {
        let criteria = FilterCriteria {
            search_query: "ödeme".to_string(),
            ..FilterCriteria::default()
        };
        assert!(criteria.matches(&card("PROJ-9", None, None, None), None, BoardMode::Scrum));

        let by_key = FilterCriteria {
            search_query: "proj-9".to_string(),
            ..FilterCriteria::default()
        };
        assert!(by_key.matches(&card("PROJ-9", None, None, None), None, BoardMode::Scrum));

        let miss = FilterCriteria {
            search_query: "checkout".to_string(),
            ..FilterCriteria::default()
        };
        assert!(!miss.matches(&card("PROJ-9", None, None, None), None, BoardMode::Scrum));
    }

    #[test]
    fn dimensions_compose_by_and() {
        let criteria = FilterCriteria {
            assignee: Some("Ayşe".to_string()),
            search_query: "ödeme".to_string(),
            unestimated_only: false,
            selected_versions: BTreeSet::from(["4.8.6".to_string()]),
        };

        let passes_all = card("PROJ-1", Some("Ayşe"), Some("5"), Some("4.8.6"));
        assert!(criteria.matches(&passes_all, None, BoardMode::Scrum));

        let wrong_version = card("PROJ-1", Some("Ayşe"), Some("5"), Some("4.9.0"));
        assert!(!criteria.matches(&wrong_version, None, BoardMode::Scrum));
    }
}
