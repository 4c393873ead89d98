#![forbid(unsafe_code)]

//! Single-value blocking handoff between threads.
//!
//! A [`Slot`] holds at most one value. [`Slot::put`] blocks while the slot is
//! full and [`Slot::take`] blocks while it is empty, so a producer that runs
//! ahead of its consumer waits instead of dropping data. Closing the slot
//! wakes every blocked caller: takers get `None`, putters get their value
//! back.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct State<T> {
    value: Option<T>,
    closed: bool,
}

/// Capacity-1 closeable handoff.
#[derive(Debug)]
pub struct Slot<T> {
    state: Mutex<State<T>>,
    changed: Condvar,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                value: None,
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, State<T>>) -> MutexGuard<'a, State<T>> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand `value` to a taker, waiting while the slot is full.
    ///
    /// Returns the value back if the slot is (or becomes) closed.
    pub fn put(&self, value: T) -> Result<(), T> {
        let mut state = self.lock();
        while state.value.is_some() && !state.closed {
            state = self.wait(state);
        }
        if state.closed {
            return Err(value);
        }
        state.value = Some(value);
        drop(state);
        self.changed.notify_all();
        Ok(())
    }

    /// Wait for a value. `None` once the slot is closed.
    pub fn take(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(value) = state.value.take() {
                drop(state);
                self.changed.notify_all();
                return Some(value);
            }
            state = self.wait(state);
        }
    }

    /// Close the slot, dropping any held value and waking every waiter.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.value = None;
        drop(state);
        self.changed.notify_all();
    }

    /// Make a closed slot usable again.
    pub fn reopen(&self) {
        let mut state = self.lock();
        state.closed = false;
        state.value = None;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn is_full(&self) -> bool {
        self.lock().value.is_some()
    }
}
