//! Millisecond timestamps that never repeat or go backwards.
//!
//! Queue drain order and conflict resolution both compare raw millisecond
//! values, so two mutations landing in the same wall-clock millisecond must
//! still receive distinct, ordered timestamps.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST: AtomicI64 = AtomicI64::new(0);

/// Current time in Unix milliseconds, strictly greater than any value this
/// function returned before within the same process.
pub fn now_millis() -> i64 {
    let wall = Utc::now().timestamp_millis();
    let mut prev = LAST.load(Ordering::SeqCst);
    loop {
        let next = wall.max(prev + 1);
        match LAST.compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}
