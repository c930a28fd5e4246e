//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_STAMP_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

/// Milliseconds since the Unix epoch, strictly increasing within this process.
///
/// Two calls in the same millisecond still yield distinct values, so the result
/// can be used as a collision-free prefix for storage keys.
pub fn unique_millis() -> i64 {
    let wall = Utc::now().timestamp_millis();
    let mut last = LAST_STAMP_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = if wall > last { wall } else { last + 1 };
        match LAST_STAMP_MILLIS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Format a timestamp as an RFC 1123 HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
