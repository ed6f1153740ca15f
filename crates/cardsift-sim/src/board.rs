//! In-memory board with queued mutation delivery.
//!
//! [`SimBoard`] renders nothing; it holds card state the way the host tree
//! would and queues a [`MutationBatch`] for every change, tagged with the
//! origin a real adapter would tag it with. Batches stay queued until the
//! session delivers them, mimicking the asynchronous delivery of a real
//! observation facility.

use cardsift_core::board::{
    BoardSurface, MutationBatch, MutationKind, MutationRecord, ObserveOptions, ObserveTarget,
    SubscriptionId,
};
use cardsift_core::model::{BoardMode, CardSnapshot, extract_version, parse_assignee_alt};
use std::collections::BTreeSet;

/// One simulated card, stored in host-tree form (raw avatar alt text, raw
/// version label) so snapshot derivation exercises the same parsing a real
/// adapter would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCard {
    pub key: String,
    pub summary: String,
    /// Raw avatar alt text, e.g. `"Assignee: Ayşe"`.
    pub avatar_alt: Option<String>,
    /// Raw estimate badge text; `None` when no badge element is rendered.
    pub badge: Option<String>,
    /// Raw label text a version may be extracted from.
    pub version_label: Option<String>,
    /// Which column the card sits in.
    pub column: usize,
    pub visible: bool,
}

impl SimCard {
    #[must_use]
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            avatar_alt: None,
            badge: None,
            version_label: None,
            column: 0,
            visible: true,
        }
    }

    #[must_use]
    pub fn assignee(mut self, name: &str) -> Self {
        self.avatar_alt = Some(format!("Assignee: {name}"));
        self
    }

    #[must_use]
    pub fn badge(mut self, text: &str) -> Self {
        self.badge = Some(text.to_string());
        self
    }

    #[must_use]
    pub fn version(mut self, label: &str) -> Self {
        self.version_label = Some(label.to_string());
        self
    }

    #[must_use]
    pub const fn column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }
}

/// The simulated board surface.
#[derive(Debug)]
pub struct SimBoard {
    mode: BoardMode,
    attached: bool,
    columns: usize,
    cards: Vec<SimCard>,
    highlight: Option<String>,
    degraded: bool,
    next_subscription: u64,
    live_subscriptions: BTreeSet<SubscriptionId>,
    pending: Vec<MutationBatch>,
    visibility_writes: usize,
}

impl SimBoard {
    #[must_use]
    pub fn new(mode: BoardMode, columns: usize) -> Self {
        Self {
            mode,
            attached: true,
            columns,
            cards: Vec::new(),
            highlight: None,
            degraded: false,
            next_subscription: 0,
            live_subscriptions: BTreeSet::new(),
            pending: Vec::new(),
            visibility_writes: 0,
        }
    }

    /// Detach the board container, as during navigation away from the board.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    // -------------------------------------------------------------------
    // Host-side mutations (drag/drop, server refresh, tab switch)
    // -------------------------------------------------------------------

    /// A card appears, as after a server refresh or drag in.
    pub fn add_card(&mut self, card: SimCard) {
        let column = card.column;
        self.cards.push(card);
        self.queue(
            ObserveTarget::Column(column),
            vec![MutationRecord::host(MutationKind::NodeAdded)],
        );
    }

    /// A card disappears.
    pub fn remove_card(&mut self, key: &str) {
        let before = self.cards.len();
        self.cards.retain(|card| card.key != key);
        if self.cards.len() != before {
            self.queue(
                ObserveTarget::Board,
                vec![MutationRecord::host(MutationKind::NodeRemoved)],
            );
        }
    }

    /// Incidental churn: a style attribute changed somewhere.
    pub fn touch_style(&mut self) {
        self.queue(
            ObserveTarget::Board,
            vec![MutationRecord::host(MutationKind::AttributeChanged(
                "style".to_string(),
            ))],
        );
    }

    /// A card's identifying attribute changed in place.
    pub fn rekey_card(&mut self, old_key: &str, new_key: &str) {
        if let Some(card) = self.cards.iter_mut().find(|card| card.key == old_key) {
            card.key = new_key.to_string();
            self.queue(
                ObserveTarget::Board,
                vec![MutationRecord::host(MutationKind::AttributeChanged(
                    "data-issue-key".to_string(),
                ))],
            );
        }
    }

    /// The tab-switch control changed: the host swaps the whole card set.
    pub fn switch_tab(&mut self, replacement: Vec<SimCard>) {
        self.cards = replacement;
        self.queue(
            ObserveTarget::TabBar,
            vec![MutationRecord::host(MutationKind::NodeAdded)],
        );
    }

    /// Drain queued batches for delivery.
    pub fn take_pending(&mut self) -> Vec<MutationBatch> {
        std::mem::take(&mut self.pending)
    }

    // -------------------------------------------------------------------
    // Assertion helpers
    // -------------------------------------------------------------------

    /// Keys of currently visible cards, sorted.
    #[must_use]
    pub fn visible_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .cards
            .iter()
            .filter(|card| card.visible)
            .map(|card| card.key.clone())
            .collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Total `set_card_visible` calls so far; each reconciliation pass makes
    /// exactly one per rendered card, so this counts passes.
    #[must_use]
    pub const fn visibility_write_count(&self) -> usize {
        self.visibility_writes
    }

    #[must_use]
    pub fn live_subscription_count(&self) -> usize {
        self.live_subscriptions.len()
    }

    #[must_use]
    pub fn live_subscription_ids(&self) -> Vec<SubscriptionId> {
        self.live_subscriptions.iter().copied().collect()
    }

    fn queue(&mut self, target: ObserveTarget, records: Vec<MutationRecord>) {
        // No subscriber, no delivery; matches real observation facilities.
        if self.live_subscriptions.is_empty() {
            return;
        }
        self.pending.push(MutationBatch { target, records });
    }
}

impl BoardSurface for SimBoard {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn mode(&self) -> BoardMode {
        self.mode
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn card_snapshots(&self) -> Vec<CardSnapshot> {
        self.cards
            .iter()
            .map(|card| CardSnapshot {
                key: card.key.clone(),
                assignee: card
                    .avatar_alt
                    .as_deref()
                    .and_then(parse_assignee_alt)
                    .map(str::to_string),
                estimate_badge: card.badge.clone(),
                version: card.version_label.as_deref().and_then(extract_version),
                summary: card.summary.clone(),
            })
            .collect()
    }

    fn set_card_visible(&mut self, key: &str, visible: bool) {
        self.visibility_writes += 1;
        let Some(card) = self.cards.iter_mut().find(|card| card.key == key) else {
            return;
        };
        card.visible = visible;

        // Even a no-op toggle is a style write in the host tree; the echo
        // comes back tagged as overlay-origin.
        self.queue(
            ObserveTarget::Board,
            vec![MutationRecord::overlay(MutationKind::AttributeChanged(
                "style".to_string(),
            ))],
        );
    }

    fn set_assignee_highlight(&mut self, name: Option<&str>) {
        self.highlight = name.map(str::to_string);
    }

    fn show_degraded_indicator(&mut self) {
        self.degraded = true;
    }

    fn observe(&mut self, _target: ObserveTarget, _options: ObserveOptions) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.live_subscriptions.insert(id);
        id
    }

    fn cancel(&mut self, id: SubscriptionId) {
        self.live_subscriptions.remove(&id);
    }
}
