//! Domain model for notes, tags and user accounts.
//!
//! # Responsibility
//! - Define plain data records exchanged with callers.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - Records carry no storage handles; they are safe to serialize.
//! - Timestamps are epoch milliseconds in UTC.

pub mod note;
pub mod user;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
