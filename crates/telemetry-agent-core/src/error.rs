// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when bootstrapping the telemetry services.
#[derive(Debug, thiserror::Error)]
pub enum ServicesError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Failed to create intake client: {0}")]
    Intake(#[from] telemetry_harvest::errors::Creation),
}
