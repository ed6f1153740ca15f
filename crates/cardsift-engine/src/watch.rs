//! Mutation-batch classification.
//!
//! The host delivers raw mutation batches; the watcher decides which of them
//! warrant work. Overlay-origin records are dropped first — the engine's own
//! visibility writes are mutations too, and reacting to them would close a
//! notify-reconcile loop. What remains is *significant* when a node was
//! added or removed or a card-identifying attribute changed; anything else
//! is incidental churn.

use cardsift_core::board::{BoardEvent, MutationBatch, MutationKind, MutationOrigin};

/// Attributes that identify a card; a change to one means the card set
/// itself may have changed.
const CARD_ATTRIBUTES: [&str; 2] = ["data-issue-key", "data-issue-id"];

/// Classification of one mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    /// Reconciliation is warranted.
    Significant,
    /// Ignore: style churn, overlay echo, or other incidental changes.
    Incidental,
}

/// Whether an attribute name identifies a card.
#[must_use]
pub fn is_card_attribute(name: &str) -> bool {
    CARD_ATTRIBUTES.contains(&name)
}

/// Classify a batch, ignoring overlay-origin records entirely.
#[must_use]
pub fn classify(batch: &MutationBatch) -> Significance {
    let significant = batch
        .records
        .iter()
        .filter(|record| record.origin == MutationOrigin::Host)
        .any(|record| match &record.kind {
            MutationKind::NodeAdded | MutationKind::NodeRemoved => true,
            MutationKind::AttributeChanged(name) => is_card_attribute(name),
        });

    if significant {
        Significance::Significant
    } else {
        Significance::Incidental
    }
}

/// Semantic events are always significant; they exist precisely because the
/// host knows something changed that raw observation may not show.
#[must_use]
pub const fn classify_event(_event: BoardEvent) -> Significance {
    Significance::Significant
}
