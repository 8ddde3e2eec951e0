//! Domain model for dojos and the members that reference them.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and API.
//! - Keep JSON field naming stable for front-end callers (`camelCase`).
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned on creation.
//! - Members reference dojos weakly; a dojo never owns its members.

pub mod dojo;
pub mod member;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in epoch milliseconds.
///
/// Clocks set before the Unix epoch collapse to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
