use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use sysinfo::System;

use super::error::CacheError;

/// The free to max memory ratio at or below which the guard raises its
/// early-warning soft limit.
pub const MEMORY_PRESSURE_RATIO: f64 = 0.2;

/// Source of host memory telemetry.
///
/// Behind a trait so tests can simulate pressure without actually exhausting
/// memory.
pub trait MemoryProbe: Send + Sync {
    /// Memory currently available for allocation, in bytes.
    fn free_memory(&self) -> u64;

    /// Upper bound on allocatable memory, in bytes.
    fn max_memory(&self) -> u64;
}

/// [`MemoryProbe`] backed by the host's memory counters.
pub struct SystemMemoryProbe {
    system: Mutex<System>,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn free_memory(&self) -> u64 {
        let mut system = self.system.lock();
        system.refresh_memory();
        system.available_memory()
    }

    fn max_memory(&self) -> u64 {
        self.system.lock().total_memory()
    }
}

/// Memory-pressure detector with a two-tier soft/hard policy.
///
/// While armed, [`check`](HeapGuard::check) raises [`CacheError::SoftLimit`]
/// as soon as the free/max ratio drops to [`MEMORY_PRESSURE_RATIO`], giving
/// the cache a chance to evict before a real allocation failure. When
/// pressure hits with nothing evictable, the reload path
/// [`relax`](HeapGuard::relax)es the guard so the allocation is attempted
/// for real instead of looping on the warning forever. The latch is
/// per-guard state, so managers in one process do not interfere.
pub struct HeapGuard {
    probe: Box<dyn MemoryProbe>,
    friendly: AtomicBool,
}

impl HeapGuard {
    pub fn new(probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            probe,
            friendly: AtomicBool::new(false),
        }
    }

    pub fn with_system_probe() -> Self {
        Self::new(Box::new(SystemMemoryProbe::new()))
    }

    /// Raises [`CacheError::SoftLimit`] when armed and under pressure.
    pub fn check(&self) -> Result<(), CacheError> {
        if self.friendly.load(Ordering::Acquire) {
            return Ok(());
        }
        let max = self.probe.max_memory();
        if max == 0 {
            return Ok(());
        }
        let ratio = self.probe.free_memory() as f64 / max as f64;
        if ratio <= MEMORY_PRESSURE_RATIO {
            return Err(CacheError::SoftLimit);
        }
        Ok(())
    }

    /// Engages the friendly latch, bypassing the threshold check.
    pub fn relax(&self) {
        self.friendly.store(true, Ordering::Release);
    }

    /// Re-arms the threshold check. Called when a pressure event finds
    /// evictable chunks, since eviction restores headroom.
    pub fn rearm(&self) {
        self.friendly.store(false, Ordering::Release);
    }

    pub fn is_relaxed(&self) -> bool {
        self.friendly.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    struct FakeProbe {
        free: AtomicU64,
    }

    impl FakeProbe {
        fn new(free: u64) -> Self {
            Self {
                free: AtomicU64::new(free),
            }
        }
    }

    impl MemoryProbe for FakeProbe {
        fn free_memory(&self) -> u64 {
            self.free.load(Ordering::Relaxed)
        }

        fn max_memory(&self) -> u64 {
            1000
        }
    }

    #[test]
    fn test_check_passes_with_headroom() {
        let guard = HeapGuard::new(Box::new(FakeProbe::new(500)));
        assert!(guard.check().is_ok());
    }

    #[test]
    fn test_check_raises_soft_limit_at_threshold() {
        let guard = HeapGuard::new(Box::new(FakeProbe::new(200)));
        assert!(matches!(guard.check(), Err(CacheError::SoftLimit)));
    }

    #[test]
    fn test_friendly_latch_bypasses_check() {
        let guard = HeapGuard::new(Box::new(FakeProbe::new(100)));
        guard.relax();
        assert!(guard.check().is_ok());

        guard.rearm();
        assert!(matches!(guard.check(), Err(CacheError::SoftLimit)));
    }

    #[test]
    fn test_zero_max_memory_never_trips() {
        struct ZeroProbe;
        impl MemoryProbe for ZeroProbe {
            fn free_memory(&self) -> u64 {
                0
            }
            fn max_memory(&self) -> u64 {
                0
            }
        }
        let guard = HeapGuard::new(Box::new(ZeroProbe));
        assert!(guard.check().is_ok());
    }
}
