// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Aggregator configuration snapshots and the change-notification service.

use std::sync::{Mutex, RwLock, Weak};
use tracing::debug;

/// Per-pipeline settings. Aggregators pull a fresh snapshot at every harvest
/// and every buffer reset rather than caching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub enabled: bool,
    pub max_capacity: usize,
    pub harvest_interval_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            enabled: true,
            max_capacity: 833,
            harvest_interval_secs: 5,
        }
    }
}

/// Full agent configuration: one [`AggregatorConfig`] per telemetry kind.
/// Each pipeline is capped independently; error traces default to a much
/// smaller budget than log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub log_events: AggregatorConfig,
    pub log_metrics: AggregatorConfig,
    pub error_traces: AggregatorConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            log_events: AggregatorConfig::default(),
            log_metrics: AggregatorConfig::default(),
            error_traces: AggregatorConfig {
                max_capacity: 20,
                ..AggregatorConfig::default()
            },
        }
    }
}

/// Picks one pipeline's settings out of the full agent configuration.
/// Injected into the aggregator so the kind-specific cap source is a value,
/// not a subclass.
pub type ConfigSelector = fn(&AgentConfig) -> AggregatorConfig;

/// Implemented by components that must react to a configuration change.
///
/// The notification runs synchronously on the thread applying the
/// configuration, which may be a thread the host application is blocked on.
/// Implementations must therefore complete using local, non-blocking work
/// only: no transport call, no cross-component synchronous dispatch.
pub trait ConfigObserver: Send + Sync {
    fn on_configuration_updated(&self);
}

/// Holds the current [`AgentConfig`] and notifies subscribers when it is
/// replaced. Subscriptions are weak; dropped observers are pruned on the
/// next notification.
pub struct ConfigService {
    current: RwLock<AgentConfig>,
    observers: Mutex<Vec<Weak<dyn ConfigObserver>>>,
}

impl ConfigService {
    pub fn new(config: AgentConfig) -> Self {
        ConfigService {
            current: RwLock::new(config),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> AgentConfig {
        #[allow(clippy::expect_used)]
        self.current.read().expect("lock poisoned").clone()
    }

    pub fn subscribe(&self, observer: Weak<dyn ConfigObserver>) {
        #[allow(clippy::expect_used)]
        self.observers.lock().expect("lock poisoned").push(observer);
    }

    /// Replaces the current configuration and synchronously notifies every
    /// live subscriber. The config lock is released before notification so
    /// observers can take a snapshot of the new values.
    pub fn apply(&self, next: AgentConfig) {
        {
            #[allow(clippy::expect_used)]
            let mut current = self.current.write().expect("lock poisoned");
            *current = next;
        }
        debug!("configuration updated, notifying subscribers");

        #[allow(clippy::expect_used)]
        let mut observers = self.observers.lock().expect("lock poisoned");
        observers.retain(|observer| match observer.upgrade() {
            Some(observer) => {
                observer.on_configuration_updated();
                true
            }
            None => false,
        });
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        ConfigService::new(AgentConfig::default())
    }
}
