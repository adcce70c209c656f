// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Process bootstrap for the harvest pipelines.
//!
//! Reads configuration from the environment, wires one harvest pipeline per
//! telemetry kind (log events, log-derived metrics, error traces) against a
//! shared HTTP intake, and owns their lifecycle: explicit start, explicit
//! shutdown, no ambient singletons.

pub mod config;
pub mod error;
pub mod services;

pub use config::ServicesConfig;
pub use error::ServicesError;
pub use services::{ServicesHandle, TelemetryServices};
