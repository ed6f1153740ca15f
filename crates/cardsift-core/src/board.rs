//! The seam between the engine and the host board.
//!
//! The engine never touches the rendered tree directly. Everything it needs
//! from the host — card snapshots, a visibility toggle, change observation —
//! goes through [`BoardSurface`], implemented by a platform adapter (or by
//! the deterministic simulation in tests).

use crate::model::{BoardMode, CardSnapshot};
use std::fmt;

/// Handle for one active change-observation subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// What a subscription observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveTarget {
    /// The board container itself.
    Board,
    /// One column container, by index.
    Column(usize),
    /// The tab-switch control.
    TabBar,
}

/// Which notification kinds a subscription delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Node insertion/removal anywhere in the subtree.
    pub structural: bool,
    /// Attribute changes.
    pub attributes: bool,
}

impl ObserveOptions {
    /// Observe both structural and attribute changes.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            structural: true,
            attributes: true,
        }
    }
}

/// Who caused a mutation record.
///
/// The adapter tags mutations produced by the engine's own visibility and
/// highlight writes as [`Self::Overlay`]; the watcher drops those before
/// classification so the engine cannot notify itself into a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// Caused by the overlay's own writes through [`BoardSurface`].
    Overlay,
    /// Caused by anything else: drag/drop, server refresh, navigation.
    Host,
}

/// One change notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    NodeAdded,
    NodeRemoved,
    /// An attribute changed; carries the attribute name.
    AttributeChanged(String),
}

/// A mutation record as delivered by the host's observation facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub origin: MutationOrigin,
}

impl MutationRecord {
    #[must_use]
    pub const fn host(kind: MutationKind) -> Self {
        Self {
            kind,
            origin: MutationOrigin::Host,
        }
    }

    #[must_use]
    pub const fn overlay(kind: MutationKind) -> Self {
        Self {
            kind,
            origin: MutationOrigin::Overlay,
        }
    }
}

/// A batch of mutation records delivered together, with the target the
/// subscription was observing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationBatch {
    pub target: ObserveTarget,
    pub records: Vec<MutationRecord>,
}

/// Externally-fired semantic events the host surfaces alongside raw
/// mutations. Each is treated as a significant change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    IssueUpdated,
    IssueRefreshed,
    BoardRefreshed,
}

/// Everything the engine may ask of the host board.
///
/// Reads are snapshots of the live tree; the only writes are the visibility
/// toggle, the highlight state of the assignee filter controls, and the
/// degraded-mode indicator. Implementations must tag mutation records caused
/// by these writes with [`MutationOrigin::Overlay`].
pub trait BoardSurface {
    /// Whether the board container is present in the host tree at all.
    ///
    /// False during navigation transitions and on pages that are not a
    /// board; initialization against a detached board is the one failure
    /// that aborts boot.
    fn is_attached(&self) -> bool;

    /// Which layout mode the board is currently rendering.
    fn mode(&self) -> BoardMode;

    /// Number of column containers currently rendered.
    fn column_count(&self) -> usize;

    /// Snapshot every rendered card, freshly derived from the live tree.
    fn card_snapshots(&self) -> Vec<CardSnapshot>;

    /// Show or hide the card with the given key. Unknown keys are a board
    /// contract mismatch and must be ignored, not an error.
    fn set_card_visible(&mut self, key: &str, visible: bool);

    /// Mark exactly the filter control matching `name` as selected and clear
    /// the selected state from every other control. `None` clears all.
    fn set_assignee_highlight(&mut self, name: Option<&str>);

    /// Render the degraded-mode indicator after an initialization failure.
    fn show_degraded_indicator(&mut self);

    /// Subscribe to change notifications on `target`.
    fn observe(&mut self, target: ObserveTarget, options: ObserveOptions) -> SubscriptionId;

    /// Cancel a subscription. Unknown handles are ignored.
    fn cancel(&mut self, id: SubscriptionId);
}

#[cfg(test)]
mod tests {
    use super::{MutationKind, MutationOrigin, MutationRecord, ObserveOptions, SubscriptionId};

    #[test]
    fn record_constructors_set_origin() {
        let host = MutationRecord::host(MutationKind::NodeAdded);
        assert_eq!(host.origin, MutationOrigin::Host);

        let overlay = MutationRecord::overlay(MutationKind::NodeRemoved);
        assert_eq!(overlay.origin, MutationOrigin::Overlay);
    }

    #[test]
    fn observe_all_enables_both_kinds() {
        let options = ObserveOptions::all();
        assert!(options.structural);
        assert!(options.attributes);
    }

    #[test]
    fn subscription_display_is_stable() {
        assert_eq!(SubscriptionId(3).to_string(), "sub-3");
    }
}
