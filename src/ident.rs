//! Process-wide id generation for collision-free fixtures
//!
//! One atomic counter per process, never reset during a run. Parallel test
//! threads may call into here freely; scratch directory names and fixture ids
//! both draw distinct values from the same sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next value of the monotonically increasing process-wide counter.
///
/// Starts at 1 and never repeats within a process lifetime. Safe under
/// concurrent callers from parallel test cases.
pub fn next_unique() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst) + 1
}

/// A pseudo-random id from the thread-local generator.
///
/// The generator is seeded from OS entropy per thread, so successive calls in
/// a tight loop stay distinct without any pacing delay.
pub fn next_random() -> u64 {
    rand::rng().random()
}
