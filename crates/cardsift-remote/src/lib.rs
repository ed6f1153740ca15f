//! cardsift-remote library.
//!
//! Everything that talks to the board server: the [`transport::Transport`]
//! seam with its `ureq` production implementation, the TTL-bounded
//! [`cache::RemoteDataCache`], and the [`sprint`] resolver that discovers the
//! active sprint and its reviewer assignments.
//!
//! # Conventions
//!
//! - **Errors**: `FetchError` at the transport seam; everything above it
//!   degrades instead of failing (stale cache, empty mapping).
//! - **Logging**: `tracing` macros with target `"cardsift"`.

pub mod cache;
pub mod sprint;
pub mod transport;
