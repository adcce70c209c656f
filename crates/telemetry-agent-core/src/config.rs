// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

use crate::error::ServicesError;
use std::env;
use telemetry_harvest::config::{AgentConfig, AggregatorConfig};

const DEFAULT_ENDPOINT: &str = "https://intake.telemetry-harvester.dev/v1/logs";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Bootstrap configuration for the telemetry services.
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    /// Intake API key for authentication.
    pub api_key: Option<String>,
    /// Intake endpoint receiving harvest batches.
    pub endpoint: String,
    /// Service name reported in the batch common block.
    pub service_name: String,
    /// Optional entity identifier reported in the batch common block.
    pub entity_guid: Option<String>,
    /// Hostname reported in the batch common block.
    pub hostname: String,
    /// Intake request timeout in seconds.
    pub timeout_secs: u64,
    /// Per-kind aggregator settings.
    pub agent: AgentConfig,
    /// Log level (e.g., trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_name: "unknown-service".to_string(),
            entity_guid: None,
            hostname: "localhost".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            agent: AgentConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ServicesConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ServicesError> {
        let api_key = env::var("TELEMETRY_API_KEY").ok();
        let endpoint =
            env::var("TELEMETRY_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let service_name = env::var("TELEMETRY_SERVICE_NAME")
            .unwrap_or_else(|_| "unknown-service".to_string());
        let entity_guid = env::var("TELEMETRY_ENTITY_GUID").ok();
        let hostname = env::var("TELEMETRY_HOSTNAME")
            .or_else(|_| env::var("HOSTNAME"))
            .unwrap_or_else(|_| "localhost".to_string());
        let timeout_secs = env::var("TELEMETRY_INTAKE_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let log_level = env::var("TELEMETRY_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let mut agent = AgentConfig::default();
        apply_pipeline_env(&mut agent.log_events, "TELEMETRY_LOG_EVENTS");
        apply_pipeline_env(&mut agent.log_metrics, "TELEMETRY_LOG_METRICS");
        apply_pipeline_env(&mut agent.error_traces, "TELEMETRY_ERROR_TRACES");

        let config = Self {
            api_key,
            endpoint,
            service_name,
            entity_guid,
            hostname,
            timeout_secs,
            agent,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ServicesError> {
        if self.endpoint.trim().is_empty() {
            return Err(ServicesError::InvalidConfig(
                "TELEMETRY_ENDPOINT cannot be empty".to_string(),
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(ServicesError::InvalidConfig(
                "TELEMETRY_SERVICE_NAME cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ServicesError::InvalidConfig(
                "Intake timeout must be greater than 0".to_string(),
            ));
        }

        for (name, pipeline) in [
            ("log events", &self.agent.log_events),
            ("log metrics", &self.agent.log_metrics),
            ("error traces", &self.agent.error_traces),
        ] {
            if pipeline.harvest_interval_secs == 0 {
                return Err(ServicesError::InvalidConfig(format!(
                    "Harvest interval for {name} must be greater than 0"
                )));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ServicesError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

fn apply_pipeline_env(pipeline: &mut AggregatorConfig, prefix: &str) {
    if let Ok(val) = env::var(format!("{prefix}_ENABLED")) {
        pipeline.enabled = val.to_lowercase() != "false";
    }
    if let Some(max) = env::var(format!("{prefix}_MAX"))
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
    {
        pipeline.max_capacity = max;
    }
    if let Some(secs) = env::var(format!("{prefix}_INTERVAL_SECS"))
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
    {
        pipeline.harvest_interval_secs = secs;
    }
}
