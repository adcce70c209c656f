// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Bounded, concurrently-writable holder of pending telemetry events.
//!
//! The buffer is the only shared mutable state in the pipeline. Producers
//! append through [`EventBuffer::try_add`]; the harvest cycle takes the whole
//! contents with [`EventBuffer::detach_and_reset`], which swaps in a fresh
//! vector so a detached snapshot never grows again. The lock is held only for
//! a size-check-and-append or for the swap itself, so a producer never waits
//! on the transport or on another aggregator.

use std::sync::Mutex;

struct Inner<E> {
    events: Vec<E>,
    max_capacity: usize,
}

pub struct EventBuffer<E> {
    inner: Mutex<Inner<E>>,
}

impl<E> EventBuffer<E> {
    pub fn new(max_capacity: usize) -> Self {
        EventBuffer {
            inner: Mutex::new(Inner {
                events: Vec::new(),
                max_capacity,
            }),
        }
    }

    /// Appends the event unless the buffer is at capacity. Returns `false`
    /// and drops the event when full; callers are never queued or blocked.
    pub fn try_add(&self, event: E) -> bool {
        #[allow(clippy::expect_used)]
        let mut inner = self.inner.lock().expect("lock poisoned");
        if inner.events.len() >= inner.max_capacity {
            return false;
        }
        inner.events.push(event);
        true
    }

    /// Atomically replaces the live contents with a fresh, empty vector
    /// sized for `new_capacity` and returns the displaced events. Concurrent
    /// `try_add` calls land in either the old or the new vector, never a
    /// torn state.
    pub fn detach_and_reset(&self, new_capacity: usize) -> Vec<E> {
        #[allow(clippy::expect_used)]
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.max_capacity = new_capacity;
        std::mem::take(&mut inner.events)
    }

    pub fn len(&self) -> usize {
        #[allow(clippy::expect_used)]
        let inner = self.inner.lock().expect("lock poisoned");
        inner.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
