use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

static POISON_RECOVERIES: AtomicUsize = AtomicUsize::new(0);

/// Locks `lock`, taking the inner guard if a previous holder panicked.
///
/// A failed test that panics while holding a suite-wide lock must not fail
/// every later test that takes the same lock.
pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

/// Number of times a poisoned lock has been recovered in this process.
pub fn poison_recovery_count() -> usize {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}
