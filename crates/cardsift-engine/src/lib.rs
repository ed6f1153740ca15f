//! cardsift-engine library.
//!
//! The overlay's moving parts: the per-pass [`reconcile`] computation, the
//! cancellable-timer [`schedule`] abstraction, mutation-batch classification
//! in [`watch`], and the [`controller`] that owns the whole lifecycle from
//! boot through re-initialization.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` on the fallible initialization path only;
//!   steady-state operations degrade instead of failing.
//! - **Logging**: `tracing` macros with target `"cardsift"`.
//! - **Time**: the host pumps [`controller::Controller::pump`] with
//!   `now_millis`; nothing here reads a clock.

pub mod controller;
pub mod reconcile;
pub mod schedule;
pub mod watch;
