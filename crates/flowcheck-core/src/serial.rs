//! Suite-wide serialisation for `cargo test`.
//!
//! The test harness runs `#[test]` functions on parallel threads. Tests that
//! drive the real tool against shared state (a global package cache, a
//! machine-wide SDK) hold this guard for their whole body so only one runs
//! at a time.

use std::sync::Mutex;
use std::sync::MutexGuard;

use flowcheck_common::mutex_lock_or_recover;

static SUITE_LOCK: Mutex<()> = Mutex::new(());

/// Blocks until no other holder of the suite guard is running.
///
/// A test that panicked while holding the guard does not poison it for the
/// rest of the suite.
pub fn serial_guard() -> MutexGuard<'static, ()> {
    mutex_lock_or_recover(&SUITE_LOCK)
}
