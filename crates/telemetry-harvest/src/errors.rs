// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced while constructing pipeline components. Runtime
/// transmission failure never appears here; it is reported only through
/// `TransmissionOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum Creation {
    #[error("invalid intake endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build intake HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
