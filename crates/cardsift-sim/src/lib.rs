//! cardsift-sim library.
//!
//! A deterministic stand-in for the host platform: an in-memory board that
//! queues mutation notifications the way a real observation facility would,
//! a scripted transport, and a [`session::Session`] that advances simulated
//! time and pumps the controller. Integration tests for the whole overlay
//! live against this harness.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` for harness setup.
//! - **Logging**: `tracing` macros; [`init_test_logging`] for test output.

pub mod board;
pub mod net;
pub mod session;

pub use board::{SimBoard, SimCard};
pub use net::ScriptedTransport;
pub use session::Session;

/// Install a compact subscriber for test runs. Safe to call repeatedly.
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
