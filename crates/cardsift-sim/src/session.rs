//! Simulated session: a controller plus a manual clock.
//!
//! [`Session`] is the cooperative event loop of the host, made explicit:
//! advancing time delivers queued mutation batches to the controller and
//! pumps its timers, in that order, so debounce windows behave exactly as
//! they would against a real platform.

use cardsift_core::model::BoardMode;
use cardsift_core::settings::MemoryStore;
use cardsift_engine::controller::Controller;
use cardsift_remote::sprint::ResolverConfig;

use crate::board::SimBoard;
use crate::net::ScriptedTransport;

/// Default board id used by scenarios.
pub const BOARD_ID: u64 = 7;

/// A booted overlay against the simulated host.
pub struct Session {
    controller: Controller<SimBoard, ScriptedTransport, MemoryStore>,
    now_millis: i64,
}

impl Session {
    /// Wire a session; the overlay is not yet initialized.
    #[must_use]
    pub fn new(board: SimBoard, transport: ScriptedTransport) -> Self {
        Self::with_store(board, transport, MemoryStore::new())
    }

    /// Wire a session over an existing settings store (persisted state from
    /// a previous session).
    #[must_use]
    pub fn with_store(board: SimBoard, transport: ScriptedTransport, store: MemoryStore) -> Self {
        Self {
            controller: Controller::new(board, transport, store, BOARD_ID, ResolverConfig::default()),
            now_millis: 0,
        }
    }

    /// Convenience: an empty scrum board with no network.
    #[must_use]
    pub fn offline(columns: usize) -> Self {
        Self::new(SimBoard::new(BoardMode::Scrum, columns), ScriptedTransport::new())
    }

    /// Boot the overlay at the current simulated time.
    pub fn boot(&mut self) {
        self.controller.initialize(self.now_millis);
        self.deliver_pending();
    }

    /// Advance simulated time by `millis`.
    ///
    /// Queued batches are delivered at the current time first (observation
    /// delivery is prompt on a real host), then time moves and due timers
    /// run, then anything the timers queued — including overlay-origin
    /// echoes — is delivered, so the loop-suppression path is exercised on
    /// every step.
    pub fn advance(&mut self, millis: i64) {
        self.deliver_pending();
        self.now_millis = self.now_millis.saturating_add(millis);
        self.deliver_pending();
        self.controller.pump(self.now_millis);
        self.deliver_pending();
    }

    /// Deliver every queued batch to the controller at the current time.
    pub fn deliver_pending(&mut self) {
        let batches = self.controller.board_mut().take_pending();
        for batch in batches {
            self.controller.handle_mutations(&batch, self.now_millis);
        }
    }

    /// Current simulated time.
    #[must_use]
    pub const fn now(&self) -> i64 {
        self.now_millis
    }

    /// The controller under test.
    pub fn controller(&mut self) -> &mut Controller<SimBoard, ScriptedTransport, MemoryStore> {
        &mut self.controller
    }

    /// The simulated board.
    #[must_use]
    pub fn board(&self) -> &SimBoard {
        self.controller_ref().board()
    }

    /// Mutable access to the simulated board (host-side changes).
    pub fn board_mut(&mut self) -> &mut SimBoard {
        self.controller.board_mut()
    }

    /// Total scripted-transport invocations so far.
    #[must_use]
    pub fn transport_calls(&self) -> usize {
        self.controller_ref().remote_cache().transport().calls()
    }

    fn controller_ref(&self) -> &Controller<SimBoard, ScriptedTransport, MemoryStore> {
        &self.controller
    }
}
