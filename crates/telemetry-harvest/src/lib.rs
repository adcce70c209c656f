// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Harvest-cycle aggregation pipeline for in-process telemetry.
//!
//! Producer threads hand telemetry events to a [`HarvestAggregator`], which
//! holds them in a bounded, concurrently-writable buffer. A scheduler task
//! periodically detaches the buffer as an immutable batch, ships it through a
//! [`Transport`], and applies a transmission-outcome policy: successful
//! batches are dropped, retained batches are merged back ahead of newly
//! collected events, everything else is discarded. Producers never block on
//! the transport and never see an error from `collect`.
//!
//! [`HarvestAggregator`]: aggregator::HarvestAggregator
//! [`Transport`]: transport::Transport

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod event;
pub mod event_buffer;
pub mod health;
pub mod intake;
pub mod scheduler;
pub mod transport;
pub mod wire;

pub use aggregator::{HarvestAggregator, HarvestCounters};
pub use config::{AgentConfig, AggregatorConfig, ConfigService};
pub use event::{ErrorTraceEvent, LogEvent, LogMetricEvent, WireRecord};
pub use health::{AgentHealth, HealthReporter};
pub use transport::{HarvestBatch, TransmissionOutcome, Transport};
