// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Fire-and-forget counters for observability of the pipeline itself.

use hashbrown::HashMap;
use std::sync::Mutex;

/// Receives counter deltas from the pipeline. Implementations must never
/// block or fail the caller; `collect` sits on the producers' hot path.
pub trait HealthReporter: Send + Sync {
    fn report(&self, counter: &'static str, delta: u64);
}

/// Default in-process health reporter: a mutex-guarded counter map with a
/// read accessor for diagnostics and tests.
#[derive(Default)]
pub struct AgentHealth {
    counters: Mutex<HashMap<&'static str, u64>>,
}

impl AgentHealth {
    pub fn new() -> Self {
        AgentHealth::default()
    }

    /// Current value of a counter, zero when never reported.
    pub fn value(&self, counter: &str) -> u64 {
        #[allow(clippy::expect_used)]
        let counters = self.counters.lock().expect("lock poisoned");
        counters.get(counter).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<&'static str, u64> {
        #[allow(clippy::expect_used)]
        self.counters.lock().expect("lock poisoned").clone()
    }
}

impl HealthReporter for AgentHealth {
    fn report(&self, counter: &'static str, delta: u64) {
        #[allow(clippy::expect_used)]
        let mut counters = self.counters.lock().expect("lock poisoned");
        *counters.entry(counter).or_insert(0) += delta;
    }
}
