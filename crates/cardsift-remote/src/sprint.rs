//! Active-sprint discovery and reviewer assignments.
//!
//! The assignee predicate needs to know who *reviews* each card, which the
//! board never renders. That mapping lives in a custom field on the issues of
//! the currently active sprint, so resolution is two steps: page through the
//! board's sprint listing until the active sprint is found, then fetch its
//! issues and project out the reviewer field.
//!
//! Every fetch goes through [`RemoteDataCache`]; on total network failure the
//! last persisted snapshot (or an empty mapping) is used. Nothing here
//! returns an error.

use cardsift_core::LOG_TARGET;
use cardsift_core::error::FailureCode;
use cardsift_core::settings::{PersistentSettings, SettingsStore, keys};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::{CACHE_TTL_MILLIS, RemoteDataCache};
use crate::transport::{RemoteRequest, Transport};

/// Sprint listing page size.
pub const SPRINT_PAGE_SIZE: u64 = 50;

/// Hard ceiling on sprint pages walked per resolution. Guarantees
/// termination even against a listing that never sets `isLast`.
pub const MAX_SPRINT_PAGES: u64 = 20;

/// Issue fetch cap per sprint.
pub const MAX_SPRINT_ISSUES: u64 = 100;

/// Resolver knobs that vary per server installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Custom field id carrying the reviewer, e.g. `customfield_10100`.
    pub reviewer_field: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reviewer_field: "customfield_10100".to_string(),
        }
    }
}

/// One page of the board's sprint listing.
#[derive(Debug, Clone, Deserialize)]
struct SprintPage {
    #[serde(default)]
    values: Vec<SprintRef>,
    #[serde(rename = "isLast", default)]
    is_last: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct SprintRef {
    id: u64,
    #[serde(default)]
    state: String,
}

/// Issue listing for one sprint.
#[derive(Debug, Clone, Deserialize)]
struct IssuePage {
    #[serde(default)]
    issues: Vec<IssueRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct IssueRef {
    key: String,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

/// Server-sourced mapping from card key to reviewer display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewerAssignments {
    /// Card key → reviewer display name.
    pub entries: BTreeMap<String, String>,
    /// Human-readable time the mapping was last refreshed.
    pub updated_at: String,
}

impl ReviewerAssignments {
    /// Reviewer for a card key, if assigned.
    #[must_use]
    pub fn reviewer_for(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Load the last persisted snapshot, or an empty mapping.
    #[must_use]
    pub fn load_snapshot<S: SettingsStore>(settings: &PersistentSettings<S>) -> Self {
        settings.get_json(keys::REVIEWER_SNAPSHOT)
    }

    fn persist<S: SettingsStore>(&self, settings: &mut PersistentSettings<S>) {
        settings.set_json(keys::REVIEWER_SNAPSHOT, self);
    }
}

fn human_timestamp(now_millis: i64) -> String {
    Utc.timestamp_millis_opt(now_millis)
        .single()
        .map_or_else(|| now_millis.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Walk the board's sprint listing and return the id of the first sprint in
/// state `"active"`.
///
/// Pagination is an iterative loop bounded by [`MAX_SPRINT_PAGES`]; it stops
/// early on `isLast`, on a failed or absent page, or on a page that does not
/// parse. Returns `None` when no active sprint is found.
pub fn resolve_active_sprint<T: Transport, S: SettingsStore>(
    cache: &mut RemoteDataCache<T>,
    settings: &mut PersistentSettings<S>,
    board_id: u64,
    now_millis: i64,
) -> Option<u64> {
    for page_index in 0..MAX_SPRINT_PAGES {
        let start_at = page_index * SPRINT_PAGE_SIZE;
        let request = RemoteRequest::new(format!(
            "board/{board_id}/sprint?startAt={start_at}&maxResults={SPRINT_PAGE_SIZE}"
        ));

        let fetched = cache.fetch_with_cache(settings, &request, CACHE_TTL_MILLIS, now_millis);
        let Some(payload) = fetched.payload() else {
            tracing::warn!(
                target: LOG_TARGET,
                board_id,
                start_at,
                "sprint page unavailable, abandoning resolution"
            );
            return None;
        };

        let page: SprintPage = match serde_json::from_value(payload.clone()) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    code = %FailureCode::MalformedPayload,
                    board_id,
                    start_at,
                    error = %e,
                    "sprint page malformed"
                );
                return None;
            }
        };

        if let Some(active) = page.values.iter().find(|sprint| sprint.state == "active") {
            tracing::info!(target: LOG_TARGET, board_id, sprint_id = active.id, "active sprint resolved");
            return Some(active.id);
        }

        if page.is_last || page.values.is_empty() {
            break;
        }
    }

    tracing::info!(target: LOG_TARGET, board_id, "no active sprint found");
    None
}

/// Fetch the reviewer assignment for every issue of `sprint_id`.
///
/// `None` yields an empty mapping. On success the snapshot is persisted with
/// a human-readable timestamp; on fetch failure or malformed payload the last
/// persisted snapshot is returned instead.
pub fn fetch_reviewer_assignments<T: Transport, S: SettingsStore>(
    cache: &mut RemoteDataCache<T>,
    settings: &mut PersistentSettings<S>,
    config: &ResolverConfig,
    sprint_id: Option<u64>,
    now_millis: i64,
) -> ReviewerAssignments {
    let Some(sprint_id) = sprint_id else {
        return ReviewerAssignments::default();
    };

    let request = RemoteRequest::new(format!(
        "sprint/{sprint_id}/issue?maxResults={MAX_SPRINT_ISSUES}&fields={}",
        config.reviewer_field
    ));

    let fetched = cache.fetch_with_cache(settings, &request, CACHE_TTL_MILLIS, now_millis);
    let Some(payload) = fetched.payload() else {
        tracing::warn!(
            target: LOG_TARGET,
            sprint_id,
            "issue listing unavailable, using persisted snapshot"
        );
        return ReviewerAssignments::load_snapshot(settings);
    };

    let page: IssuePage = match serde_json::from_value(payload.clone()) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(
                target: LOG_TARGET,
                code = %FailureCode::MalformedPayload,
                sprint_id,
                error = %e,
                "issue listing malformed, using persisted snapshot"
            );
            return ReviewerAssignments::load_snapshot(settings);
        }
    };

    let entries: BTreeMap<String, String> = page
        .issues
        .into_iter()
        .filter_map(|issue| {
            let reviewer = issue
                .fields
                .get(&config.reviewer_field)?
                .get("displayName")?
                .as_str()?
                .to_string();
            Some((issue.key, reviewer))
        })
        .collect();

    let assignments = ReviewerAssignments {
        entries,
        updated_at: human_timestamp(now_millis),
    };
    assignments.persist(settings);

    tracing::info!(
        target: LOG_TARGET,
        sprint_id,
        reviewers = assignments.entries.len(),
        "reviewer assignments refreshed"
    );
    assignments
}
