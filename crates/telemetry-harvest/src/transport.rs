// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! The transport seam: batches out, outcomes back.

use async_trait::async_trait;
use derive_more::Display;

/// How a transmission attempt ended. This is the only way transport failure
/// surfaces; a transport must not panic or return an error for ordinary
/// network conditions.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionOutcome {
    /// The batch was accepted; drop it and count it as sent.
    Success,
    /// The collector asked us to try again later; merge the batch back into
    /// the live buffer ahead of newer events.
    Retain,
    /// The batch was too large for the collector. Splitting is not
    /// implemented, so this drops the batch.
    ReduceOrDiscard,
    /// The batch was rejected or the attempt failed permanently; drop it.
    Discard,
}

/// An immutable snapshot of buffered events taken atomically at harvest
/// time. Owned solely by the in-flight harvest operation.
#[derive(Debug)]
pub struct HarvestBatch<E> {
    events: Vec<E>,
}

impl<E> HarvestBatch<E> {
    pub fn new(events: Vec<E>) -> Self {
        HarvestBatch { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn into_events(self) -> Vec<E> {
        self.events
    }
}

/// Ships one harvest batch per call. Callable from the harvest task only;
/// producers never wait on it.
#[async_trait]
pub trait Transport<E>: Send + Sync {
    async fn send(&self, batch: &HarvestBatch<E>) -> TransmissionOutcome;
}
