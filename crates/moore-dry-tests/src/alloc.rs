// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Counting, fault-injecting global allocator.
//!
//! Install it in a test binary with
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: moore_dry_tests::CountingAlloc = moore_dry_tests::CountingAlloc;
//! ```
//!
//! and wrap the code under test in [`measure`]. Accounting is per thread and
//! only active inside `measure`, so the test harness and parallel tests do not
//! disturb the numbers. Without the allocator installed, `measure` reports
//! zeros.
#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static ARMED: Cell<bool> = const { Cell::new(false) };
    static FAIL_AT: Cell<Option<usize>> = const { Cell::new(None) };
    static CALLS: Cell<usize> = const { Cell::new(0) };
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static FAILED: Cell<usize> = const { Cell::new(0) };
}

/// Allocation activity observed inside one [`measure`] window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocStats {
    /// Allocation requests (`alloc`, `alloc_zeroed`, `realloc`), including
    /// the ones that were made to fail.
    pub calls: usize,
    /// Blocks allocated minus blocks freed. Zero means every block allocated
    /// in the window was also freed in it (or replaced a freed one).
    pub live: isize,
    /// Requests that were made to fail.
    pub failed: usize,
}

/// Global allocator delegating to [`System`] with per-thread accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingAlloc;

fn armed() -> bool {
    ARMED.try_with(Cell::get).unwrap_or(false)
}

/// Counts one request; returns `true` if it must fail.
fn admit() -> bool {
    let nth = CALLS.try_with(|c| {
        let n = c.get();
        c.set(n + 1);
        n
    });
    let Ok(nth) = nth else {
        return false;
    };
    let fail = FAIL_AT.try_with(Cell::get).ok().flatten() == Some(nth);
    if fail {
        let _ = FAILED.try_with(|c| c.set(c.get() + 1));
    }
    fail
}

fn adjust_live(delta: isize) {
    let _ = LIVE.try_with(|c| c.set(c.get() + delta));
}

// SAFETY: every method forwards to `System` with the caller's arguments
// unchanged, or returns null, which `GlobalAlloc` permits to signal failure.
unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !armed() {
            return System.alloc(layout);
        }
        if admit() {
            return std::ptr::null_mut();
        }
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            adjust_live(1);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if !armed() {
            return System.alloc_zeroed(layout);
        }
        if admit() {
            return std::ptr::null_mut();
        }
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            adjust_live(1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if armed() {
            adjust_live(-1);
        }
        System.dealloc(ptr, layout);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if armed() && admit() {
            return std::ptr::null_mut();
        }
        System.realloc(ptr, layout, new_size)
    }
}

/// Disarms accounting even if the measured closure panics.
struct Disarm;

impl Drop for Disarm {
    fn drop(&mut self) {
        ARMED.with(|a| a.set(false));
        FAIL_AT.with(|f| f.set(None));
    }
}

/// Runs `f` with accounting armed on this thread.
///
/// With `fail_at = Some(k)`, the `k`-th allocation request (0-based) inside
/// the window returns null.
pub fn measure<R>(fail_at: Option<usize>, f: impl FnOnce() -> R) -> (R, AllocStats) {
    CALLS.with(|c| c.set(0));
    LIVE.with(|c| c.set(0));
    FAILED.with(|c| c.set(0));
    FAIL_AT.with(|c| c.set(fail_at));
    ARMED.with(|a| a.set(true));
    let guard = Disarm;
    let out = f();
    drop(guard);
    let stats = AllocStats {
        calls: CALLS.with(Cell::get),
        live: LIVE.with(Cell::get),
        failed: FAILED.with(Cell::get),
    };
    (out, stats)
}

/// Outcome of [`sweep_faults`].
#[derive(Debug)]
pub struct FaultSweep<T> {
    /// Value returned by the first attempt that succeeded.
    pub value: T,
    /// Number of allocation sites that were made to fail before success.
    pub sites: usize,
    /// Accounting of the successful attempt.
    pub stats: AllocStats,
}

/// Fails each allocation request of `attempt` in turn until it succeeds.
///
/// For `k = 0, 1, 2, ...` the `k`-th allocation of `attempt` is made to fail
/// and `on_failure(k, err, stats)` is called with the error and the window's
/// accounting. The first attempt that returns `Ok` ends the sweep. Returns
/// `None` if no attempt succeeded within `max_sites` failures.
pub fn sweep_faults<T, E>(
    max_sites: usize,
    mut attempt: impl FnMut() -> Result<T, E>,
    mut on_failure: impl FnMut(usize, E, AllocStats),
) -> Option<FaultSweep<T>> {
    for k in 0..=max_sites {
        let (result, stats) = measure(Some(k), &mut attempt);
        match result {
            Ok(value) => {
                return Some(FaultSweep {
                    value,
                    sites: k,
                    stats,
                })
            }
            Err(err) => on_failure(k, err, stats),
        }
    }
    None
}
