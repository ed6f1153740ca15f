//! cardsift-core library.
//!
//! Data model and host seams for the board filter overlay: card snapshots,
//! filter criteria and their predicates, the [`board::BoardSurface`] trait the
//! host adapter implements, and durable [`settings`] storage.
//!
//! # Conventions
//!
//! - **Errors**: typed enums at the seams, `anyhow::Result` at lifecycle level.
//! - **Logging**: `tracing` macros with target `"cardsift"`.
//! - **Time**: passed explicitly as `now_millis: i64`; no ambient clock.

pub mod board;
pub mod criteria;
pub mod error;
pub mod model;
pub mod settings;

/// Log target shared by every crate in the workspace.
pub const LOG_TARGET: &str = "cardsift";
