//! Lock order bookkeeping.
//!
//! The registry's structural lock must always be taken before any entry
//! lock. Debug builds count the entry locks held by the current thread so a
//! structural operation attempted under an entry lock panics instead of
//! risking a deadlock.

use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

#[cfg(debug_assertions)]
mod held {
    use std::cell::Cell;

    thread_local! {
        static ENTRY_LOCKS_HELD: Cell<usize> = const { Cell::new(0) };
    }

    pub(super) fn acquired() {
        ENTRY_LOCKS_HELD.with(|held| held.set(held.get() + 1));
    }

    pub(super) fn released() {
        ENTRY_LOCKS_HELD.with(|held| held.set(held.get().saturating_sub(1)));
    }

    pub(super) fn count() -> usize {
        ENTRY_LOCKS_HELD.with(|held| held.get())
    }
}

#[cfg(not(debug_assertions))]
mod held {
    pub(super) fn acquired() {}

    pub(super) fn released() {}

    pub(super) fn count() -> usize {
        0
    }
}

/// Panics in debug builds if the current thread holds an entry lock.
pub(crate) fn assert_no_entry_lock_held(operation: &str) {
    let held = held::count();
    debug_assert!(
        held == 0,
        "ssrc: {operation} attempted while holding {held} entry lock(s)"
    );
}

/// Entry lock guard that keeps the per-thread count up to date.
pub(crate) struct EntryGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<'a, T> EntryGuard<'a, T> {
    pub(crate) fn lock(mutex: &'a Mutex<T>) -> Self {
        let guard = mutex.lock();
        held::acquired();
        Self { guard }
    }
}

impl<T> Deref for EntryGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for EntryGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for EntryGuard<'_, T> {
    fn drop(&mut self) {
        held::released();
    }
}
