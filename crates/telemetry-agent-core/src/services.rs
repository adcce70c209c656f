// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle of the per-kind harvest pipelines.
//!
//! All pipelines share one HTTP intake client and one health reporter; each
//! gets its own aggregator, counters, and harvest loop. Aggregators are
//! explicitly constructed and owned here and handed to producers by
//! reference; there is no process-global state.

use crate::config::ServicesConfig;
use crate::error::ServicesError;
use std::sync::Arc;
use std::time::Duration;
use telemetry_harvest::config::ConfigService;
use telemetry_harvest::event::{
    ERROR_TRACE_COUNTERS, LOG_EVENT_COUNTERS, LOG_METRIC_COUNTERS,
};
use telemetry_harvest::intake::{HttpIntake, IntakeConfig};
use telemetry_harvest::scheduler::run_harvest_loop;
use telemetry_harvest::wire::CommonAttributes;
use telemetry_harvest::{
    AgentHealth, ErrorTraceEvent, HarvestAggregator, HealthReporter, LogEvent, LogMetricEvent,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Builder for the running services; consumed by [`TelemetryServices::start`].
pub struct TelemetryServices {
    config: ServicesConfig,
}

/// Handle to the running harvest pipelines. Producers collect through the
/// aggregator references; dropping buffered events at shutdown is by design.
pub struct ServicesHandle {
    pub log_events: Arc<HarvestAggregator<LogEvent>>,
    pub log_metrics: Arc<HarvestAggregator<LogMetricEvent>>,
    pub error_traces: Arc<HarvestAggregator<ErrorTraceEvent>>,
    pub health: Arc<AgentHealth>,
    pub config_service: Arc<ConfigService>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl TelemetryServices {
    pub fn new(config: ServicesConfig) -> Self {
        Self { config }
    }

    /// Start one harvest loop per telemetry kind. Must be called within a
    /// tokio runtime.
    pub fn start(self) -> Result<ServicesHandle, ServicesError> {
        let config = self.config;
        config.validate()?;
        let api_key = config.api_key.clone().ok_or(ServicesError::MissingApiKey)?;

        let common = CommonAttributes::new(
            config.service_name.clone(),
            config.entity_guid.clone(),
            config.hostname.clone(),
        );
        let intake = Arc::new(HttpIntake::new(
            IntakeConfig {
                endpoint: config.endpoint.clone(),
                api_key,
                timeout: Duration::from_secs(config.timeout_secs),
            },
            common,
        )?);

        let config_service = Arc::new(ConfigService::new(config.agent.clone()));
        let health = Arc::new(AgentHealth::new());
        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        let log_events = HarvestAggregator::new(
            Arc::clone(&config_service),
            |c| c.log_events,
            Arc::clone(&intake) as Arc<dyn telemetry_harvest::Transport<LogEvent>>,
            Arc::clone(&health) as Arc<dyn HealthReporter>,
            LOG_EVENT_COUNTERS,
        );
        log_events.subscribe();
        tasks.push(run_harvest_loop(
            Arc::clone(&log_events),
            cancel.child_token(),
        ));

        let log_metrics = HarvestAggregator::new(
            Arc::clone(&config_service),
            |c| c.log_metrics,
            Arc::clone(&intake) as Arc<dyn telemetry_harvest::Transport<LogMetricEvent>>,
            Arc::clone(&health) as Arc<dyn HealthReporter>,
            LOG_METRIC_COUNTERS,
        );
        log_metrics.subscribe();
        tasks.push(run_harvest_loop(
            Arc::clone(&log_metrics),
            cancel.child_token(),
        ));

        let error_traces = HarvestAggregator::new(
            Arc::clone(&config_service),
            |c| c.error_traces,
            Arc::clone(&intake) as Arc<dyn telemetry_harvest::Transport<ErrorTraceEvent>>,
            Arc::clone(&health) as Arc<dyn HealthReporter>,
            ERROR_TRACE_COUNTERS,
        );
        error_traces.subscribe();
        tasks.push(run_harvest_loop(
            Arc::clone(&error_traces),
            cancel.child_token(),
        ));

        info!("telemetry services started for {}", config.service_name);

        Ok(ServicesHandle {
            log_events,
            log_metrics,
            error_traces,
            health,
            config_service,
            cancel,
            tasks,
        })
    }
}

impl ServicesHandle {
    /// Stop the harvest loops. Events still buffered are dropped, not
    /// flushed; the pipeline favors non-blocking producers over durability.
    pub async fn shutdown(self) {
        debug!("stopping harvest loops");
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        debug!("harvest loops stopped");
    }
}
