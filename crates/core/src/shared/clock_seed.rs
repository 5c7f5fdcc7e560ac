use std::time::{SystemTime, UNIX_EPOCH};

/// Seed derived from the wall clock, for process-level random sources.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ (u64::from(d.subsec_nanos()) << 32))
        .unwrap_or(0)
}
