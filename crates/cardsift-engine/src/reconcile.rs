//! The reconciliation pass.
//!
//! One pass reads the live card set fresh from the board, evaluates the full
//! predicate for every card against the *current* criteria and reviewer
//! mapping, and applies the show/hide toggle plus the assignee-control
//! highlight. Nothing is carried over between passes, which is what makes a
//! pass idempotent: same criteria, same card set, same visible set.

use cardsift_core::LOG_TARGET;
use cardsift_core::board::BoardSurface;
use cardsift_core::criteria::FilterCriteria;
use cardsift_remote::sprint::ReviewerAssignments;

/// Summary of one pass, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Cards inspected.
    pub total: usize,
    /// Cards left visible.
    pub visible: usize,
}

/// Run one full reconciliation pass.
///
/// Visibility is recomputed for every card, never incrementally, and written
/// unconditionally; toggling a card to the state it is already in is
/// harmless because the adapter tags the write as overlay-origin.
pub fn run<B: BoardSurface>(
    board: &mut B,
    criteria: &FilterCriteria,
    reviewers: &ReviewerAssignments,
) -> ReconcileStats {
    let mode = board.mode();
    let cards = board.card_snapshots();
    let total = cards.len();
    let mut visible = 0;

    for card in &cards {
        let show = criteria.matches(card, reviewers.reviewer_for(&card.key), mode);
        if show {
            visible += 1;
        }
        board.set_card_visible(&card.key, show);
    }

    board.set_assignee_highlight(criteria.assignee.as_deref());

    tracing::debug!(
        target: LOG_TARGET,
        total,
        visible,
        mode = %mode,
        active = criteria.is_any_active(),
        "reconciliation pass complete"
    );

    ReconcileStats { total, visible }
}
