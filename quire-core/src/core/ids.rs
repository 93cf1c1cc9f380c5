//! Note identifiers and monotonic update timestamps.
//!
//! Timestamps are Unix epoch milliseconds (`i64`). The sync layer merges
//! edits last-writer-wins on `updated`, so successive updates of one note must
//! never produce an equal or smaller value, even inside a single clock tick.

use rand_core::{OsRng, RngCore};
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Returns a new note identifier, unique within the running process.
///
/// Uses a random v4 UUID drawn from the operating system's CSPRNG. If the OS
/// source is unavailable the id falls back to `<millis hex>-<suffix hex>`,
/// where the suffix mixes the nanosecond clock with a process-wide counter.
/// The fallback is collision-free in practice but not unpredictable.
pub fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string(),
        Err(e) => {
            log::warn!("OS random source unavailable ({e}); using time-based note id");
            fallback_id()
        }
    }
}

pub(crate) fn fallback_id() -> String {
    let now = chrono::Utc::now();
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = RandomState::new().build_hasher();
    now.timestamp_nanos_opt().unwrap_or_default().hash(&mut hasher);
    count.hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    format!("{:x}-{:016x}{:04x}", now.timestamp_millis(), hasher.finish(), count & 0xffff)
}

/// Returns the next `updated` value after `previous`.
///
/// The current time is used when it is strictly greater than `previous`;
/// otherwise `previous + 1`. `i64::MAX` is the one value with no successor:
/// it is returned unchanged and a warning is logged.
pub fn next_timestamp(previous: i64) -> i64 {
    advance_timestamp(now_millis(), previous)
}

fn advance_timestamp(now: i64, previous: i64) -> i64 {
    if now > previous {
        now
    } else {
        previous.checked_add(1).unwrap_or_else(|| {
            log::warn!("update timestamp is at i64::MAX and cannot advance");
            previous
        })
    }
}
