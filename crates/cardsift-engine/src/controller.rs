//! Overlay lifecycle: boot, steady state, re-initialization, teardown.
//!
//! [`Controller`] owns every collaborator — board surface, cached remote
//! layer, persistent settings, filter criteria, timers — and is the single
//! writer to all of them. The host feeds it UI events, mutation batches, and
//! time; it never blocks, all waits are pending timer deadlines drained by
//! [`Controller::pump`].
//!
//! # Lifecycle
//!
//! `Uninitialized → Initializing → Ready`, with any boot failure landing in
//! `Error` (degraded indicator rendered, no automatic retries, all
//! subscriptions torn down). From `Ready` a tab switch schedules
//! `Reinitializing → Ready | Error` through the same teardown-then-rebuild
//! path as boot, so there is exactly one way in and out of a subscribed
//! state and duplicate notification delivery is impossible.

use anyhow::{Context, Result, bail};
use cardsift_core::LOG_TARGET;
use cardsift_core::board::{
    BoardEvent, BoardSurface, MutationBatch, ObserveOptions, ObserveTarget, SubscriptionId,
};
use cardsift_core::criteria::FilterCriteria;
use cardsift_core::error::FailureCode;
use cardsift_core::settings::{PersistentSettings, SettingsStore, keys};
use cardsift_remote::cache::RemoteDataCache;
use cardsift_remote::sprint::{
    ResolverConfig, ReviewerAssignments, fetch_reviewer_assignments, resolve_active_sprint,
};
use cardsift_remote::transport::Transport;
use std::collections::BTreeSet;
use std::fmt;

use crate::reconcile::{self, ReconcileStats};
use crate::schedule::{Debouncer, RECONCILE_DEBOUNCE_MILLIS, REINIT_DELAY_MILLIS, TimerKey};
use crate::watch::{Significance, classify, classify_event};

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Reinitializing,
    Error,
}

impl Phase {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Reinitializing => "reinitializing",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The overlay controller.
pub struct Controller<B: BoardSurface, T: Transport, S: SettingsStore> {
    board: B,
    cache: RemoteDataCache<T>,
    settings: PersistentSettings<S>,
    resolver: ResolverConfig,
    board_id: u64,
    criteria: FilterCriteria,
    reviewers: ReviewerAssignments,
    timers: Debouncer,
    subscriptions: Vec<SubscriptionId>,
    phase: Phase,
}

impl<B: BoardSurface, T: Transport, S: SettingsStore> Controller<B, T, S> {
    /// Wire up a controller; nothing runs until [`Self::initialize`].
    pub fn new(board: B, transport: T, store: S, board_id: u64, resolver: ResolverConfig) -> Self {
        Self {
            board,
            cache: RemoteDataCache::new(transport),
            settings: PersistentSettings::new(store),
            resolver,
            board_id,
            criteria: FilterCriteria::default(),
            reviewers: ReviewerAssignments::default(),
            timers: Debouncer::new(),
            subscriptions: Vec::new(),
            phase: Phase::Uninitialized,
        }
    }

    /// Boot the overlay: resolve remote data, load persisted criteria, run
    /// the first pass, arm subscriptions.
    ///
    /// Failure is caught here, never propagated: the phase moves to
    /// [`Phase::Error`], the degraded indicator is rendered, and teardown is
    /// guaranteed so no partial subscription survives.
    pub fn initialize(&mut self, now_millis: i64) {
        self.transition(Phase::Initializing);
        self.boot(now_millis);
    }

    fn boot(&mut self, now_millis: i64) {
        self.teardown();

        match self.boot_inner(now_millis) {
            Ok(stats) => {
                self.transition(Phase::Ready);
                tracing::info!(
                    target: LOG_TARGET,
                    board_id = self.board_id,
                    total = stats.total,
                    visible = stats.visible,
                    "overlay ready"
                );
            }
            Err(e) => {
                self.teardown();
                self.transition(Phase::Error);
                self.board.show_degraded_indicator();
                tracing::error!(
                    target: LOG_TARGET,
                    code = %FailureCode::InitializationFailed,
                    board_id = self.board_id,
                    error = format!("{e:#}"),
                    "overlay initialization failed"
                );
            }
        }
    }

    fn boot_inner(&mut self, now_millis: i64) -> Result<ReconcileStats> {
        if !self.board.is_attached() {
            bail!("board container not found in host tree");
        }

        let sprint = resolve_active_sprint(
            &mut self.cache,
            &mut self.settings,
            self.board_id,
            now_millis,
        );
        // No resolvable active sprint (network down or genuinely none): the
        // last persisted snapshot, possibly empty, is the best we have.
        self.reviewers = if sprint.is_some() {
            fetch_reviewer_assignments(
                &mut self.cache,
                &mut self.settings,
                &self.resolver,
                sprint,
                now_millis,
            )
        } else {
            ReviewerAssignments::load_snapshot(&self.settings)
        };

        self.criteria = load_criteria(&self.settings);
        let stats = reconcile::run(&mut self.board, &self.criteria, &self.reviewers);

        self.subscribe_all().context("arm change observation")?;
        Ok(stats)
    }

    /// Tear down every subscription and pending timer, synchronously.
    ///
    /// Always runs before new subscriptions are armed, so exactly one
    /// subscription set exists at any time and no orphaned timer can fire
    /// against a rebuilt overlay.
    pub fn teardown(&mut self) {
        for id in std::mem::take(&mut self.subscriptions) {
            self.board.cancel(id);
        }
        self.timers.cancel_all();
    }

    fn subscribe_all(&mut self) -> Result<()> {
        if !self.board.is_attached() {
            bail!("board detached before observation could start");
        }

        let mut subscriptions = vec![
            self.board.observe(ObserveTarget::Board, ObserveOptions::all()),
            self.board.observe(ObserveTarget::TabBar, ObserveOptions::all()),
        ];
        for column in 0..self.board.column_count() {
            subscriptions.push(
                self.board
                    .observe(ObserveTarget::Column(column), ObserveOptions::all()),
            );
        }

        tracing::debug!(
            target: LOG_TARGET,
            count = subscriptions.len(),
            "change observation armed"
        );
        self.subscriptions = subscriptions;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Host-driven inputs
    // -----------------------------------------------------------------------

    /// A raw mutation batch from one of the observed containers.
    pub fn handle_mutations(&mut self, batch: &MutationBatch, now_millis: i64) {
        if self.phase != Phase::Ready {
            return;
        }

        if batch.target == ObserveTarget::TabBar {
            self.handle_tab_switch(now_millis);
            return;
        }

        if classify(batch) == Significance::Significant {
            self.timers
                .schedule(TimerKey::Reconcile, now_millis, RECONCILE_DEBOUNCE_MILLIS);
        }
    }

    /// A semantic event fired by the host (issue updated, board refreshed).
    pub fn handle_board_event(&mut self, event: BoardEvent, now_millis: i64) {
        if self.phase != Phase::Ready {
            return;
        }
        if classify_event(event) == Significance::Significant {
            self.timers
                .schedule(TimerKey::Reconcile, now_millis, RECONCILE_DEBOUNCE_MILLIS);
        }
    }

    /// The tab-switch control changed: the whole card set is assumed
    /// replaced, so schedule a full rebuild on its own timer.
    pub fn handle_tab_switch(&mut self, now_millis: i64) {
        if self.phase != Phase::Ready {
            return;
        }
        self.timers
            .schedule(TimerKey::Reinitialize, now_millis, REINIT_DELAY_MILLIS);
    }

    /// Drain elapsed timers and run their actions.
    pub fn pump(&mut self, now_millis: i64) {
        for key in self.timers.due(now_millis) {
            match key {
                TimerKey::Reconcile => {
                    reconcile::run(&mut self.board, &self.criteria, &self.reviewers);
                }
                TimerKey::Reinitialize => {
                    self.transition(Phase::Reinitializing);
                    self.boot(now_millis);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Filter state mutation (UI event handlers)
    // -----------------------------------------------------------------------

    /// Select an assignee, or clear the selection with `None`.
    pub fn set_assignee(&mut self, name: Option<String>, now_millis: i64) {
        match &name {
            Some(name) => self.settings.set_string(keys::ASSIGNEE, name),
            None => self.settings.remove(keys::ASSIGNEE),
        }
        self.criteria.assignee = name;
        self.request_reconcile(now_millis);
    }

    /// Update the free-text search. Session-only, never persisted.
    pub fn set_search_query(&mut self, query: impl Into<String>, now_millis: i64) {
        self.criteria.search_query = query.into();
        self.request_reconcile(now_millis);
    }

    /// Toggle the unestimated-only flag.
    pub fn set_unestimated_only(&mut self, enabled: bool, now_millis: i64) {
        self.settings.set_bool(keys::UNESTIMATED_ONLY, enabled);
        self.criteria.unestimated_only = enabled;
        self.request_reconcile(now_millis);
    }

    /// Replace the selected fix versions.
    pub fn set_selected_versions(&mut self, versions: BTreeSet<String>, now_millis: i64) {
        self.settings.set_json(keys::SELECTED_VERSIONS, &versions);
        self.criteria.selected_versions = versions;
        self.request_reconcile(now_millis);
    }

    /// Clear all four dimensions to their defaults and persist that.
    pub fn reset_filters(&mut self, now_millis: i64) {
        self.settings.remove(keys::ASSIGNEE);
        self.settings.set_bool(keys::UNESTIMATED_ONLY, false);
        self.settings
            .set_json(keys::SELECTED_VERSIONS, &BTreeSet::<String>::new());
        self.criteria = FilterCriteria::default();
        self.request_reconcile(now_millis);
    }

    /// User input requests an immediate run: schedule at zero delay so it
    /// fires on the next pump and still coalesces with any pending
    /// mutation-driven run.
    fn request_reconcile(&mut self, now_millis: i64) {
        if self.phase != Phase::Ready {
            return;
        }
        self.timers.schedule(TimerKey::Reconcile, now_millis, 0);
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(target: LOG_TARGET, from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn reviewers(&self) -> &ReviewerAssignments {
        &self.reviewers
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.timers.pending_count()
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    #[must_use]
    pub fn settings(&self) -> &PersistentSettings<S> {
        &self.settings
    }

    #[must_use]
    pub fn remote_cache(&self) -> &RemoteDataCache<T> {
        &self.cache
    }
}

/// Load persisted criteria, defaulting every malformed or absent field.
fn load_criteria<S: SettingsStore>(settings: &PersistentSettings<S>) -> FilterCriteria {
    FilterCriteria {
        assignee: settings.get_string(keys::ASSIGNEE),
        search_query: String::new(),
        unestimated_only: settings.get_bool(keys::UNESTIMATED_ONLY, false),
        selected_versions: settings.get_json(keys::SELECTED_VERSIONS),
    }
}
