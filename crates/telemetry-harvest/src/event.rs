// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Telemetry event kinds and the wire-record contract they share.
//!
//! Events are immutable once constructed; the pipeline never mutates them,
//! it only moves them between buffers and batches.

use crate::aggregator::HarvestCounters;
use hashbrown::HashMap;
use serde::Serialize;

/// Contract every telemetry event kind implements to ride the harvest
/// pipeline: a timestamp, a validity check applied at collection time, and
/// serde serialization for the wire payload.
pub trait WireRecord: Serialize + Send + Sync + 'static {
    /// Event timestamp in unix epoch milliseconds.
    fn timestamp_ms(&self) -> i64;

    /// Invalid events are silently filtered at `collect`; they never reach
    /// the buffer.
    fn is_valid(&self) -> bool;
}

/// A captured application log line with optional trace correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(rename = "trace.id", skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(rename = "span.id", skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl LogEvent {
    pub fn new(timestamp_ms: i64, message: impl Into<String>) -> Self {
        LogEvent {
            timestamp_ms,
            message: message.into(),
            level: None,
            trace_id: None,
            span_id: None,
            attributes: HashMap::new(),
        }
    }
}

impl WireRecord for LogEvent {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    fn is_valid(&self) -> bool {
        !self.message.trim().is_empty()
    }
}

/// Counter names reported for the log-event pipeline.
pub const LOG_EVENT_COUNTERS: HarvestCounters = HarvestCounters {
    collected: "log_events_collected",
    sent: "log_events_sent",
    recollected: "log_events_recollected",
};

/// A log-derived metric event: one data point per observed log line,
/// carrying only the severity and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMetricEvent {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub message: String,
    #[serde(rename = "log.level")]
    pub level: String,
}

impl LogMetricEvent {
    pub fn new(timestamp_ms: i64, message: impl Into<String>, level: impl Into<String>) -> Self {
        LogMetricEvent {
            timestamp_ms,
            message: message.into(),
            level: level.into(),
        }
    }
}

impl WireRecord for LogMetricEvent {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    fn is_valid(&self) -> bool {
        !self.message.trim().is_empty() && !self.level.trim().is_empty()
    }
}

/// Counter names reported for the log-metric pipeline.
pub const LOG_METRIC_COUNTERS: HarvestCounters = HarvestCounters {
    collected: "log_metrics_collected",
    sent: "log_metrics_sent",
    recollected: "log_metrics_recollected",
};

/// A captured error occurrence with its class and free-form attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorTraceEvent {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub message: String,
    #[serde(rename = "error.class")]
    pub error_class: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl ErrorTraceEvent {
    pub fn new(
        timestamp_ms: i64,
        message: impl Into<String>,
        error_class: impl Into<String>,
    ) -> Self {
        ErrorTraceEvent {
            timestamp_ms,
            message: message.into(),
            error_class: error_class.into(),
            attributes: HashMap::new(),
        }
    }
}

impl WireRecord for ErrorTraceEvent {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    fn is_valid(&self) -> bool {
        !self.message.trim().is_empty()
    }
}

/// Counter names reported for the error-trace pipeline.
pub const ERROR_TRACE_COUNTERS: HarvestCounters = HarvestCounters {
    collected: "error_traces_collected",
    sent: "error_traces_sent",
    recollected: "error_traces_recollected",
};
