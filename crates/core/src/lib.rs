//! Domain types for Protocol Foundry.
//!
//! Pure data shared by every other crate: run state, statuses, checkpoints
//! and the request payloads of the HTTP surface. No I/O lives here.

mod domain;

pub use domain::*;
