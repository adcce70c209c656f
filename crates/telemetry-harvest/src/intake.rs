// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! HTTP intake transport.
//!
//! One POST per harvest batch; the collector's verdict is folded into a
//! [`TransmissionOutcome`] and nothing here panics or errors for ordinary
//! network conditions. Retrying, compression, and endpoint failover belong
//! to the collector side, not this client.

use crate::errors;
use crate::event::WireRecord;
use crate::transport::{HarvestBatch, TransmissionOutcome, Transport};
use crate::wire::{self, CommonAttributes};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error};

const API_KEY_HEADER: &str = "Api-Key";

pub struct IntakeConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

pub struct HttpIntake {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    common: CommonAttributes,
}

impl HttpIntake {
    pub fn new(config: IntakeConfig, common: CommonAttributes) -> Result<Self, errors::Creation> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(errors::Creation::InvalidEndpoint(config.endpoint));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(HttpIntake {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            common,
        })
    }
}

/// Folds the collector's HTTP status into an outcome. Backoff-ish statuses
/// ask for a retain, an oversized payload asks for a reduce, everything else
/// unexpected is a permanent rejection.
fn outcome_for_status(status: StatusCode) -> TransmissionOutcome {
    match status {
        s if s.is_success() => TransmissionOutcome::Success,
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::SERVICE_UNAVAILABLE => TransmissionOutcome::Retain,
        StatusCode::PAYLOAD_TOO_LARGE => TransmissionOutcome::ReduceOrDiscard,
        _ => TransmissionOutcome::Discard,
    }
}

#[async_trait]
impl<E: WireRecord> Transport<E> for HttpIntake {
    async fn send(&self, batch: &HarvestBatch<E>) -> TransmissionOutcome {
        let body = match wire::encode(&self.common, batch.events()) {
            Ok(body) => body,
            Err(e) => {
                error!("failed to encode harvest batch, dropping it: {e}");
                return TransmissionOutcome::Discard;
            }
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                let outcome = outcome_for_status(status);
                debug!("intake responded {status}, outcome {outcome}");
                outcome
            }
            Err(e) => {
                error!("failed to reach intake, dropping batch: {e}");
                TransmissionOutcome::Discard
            }
        }
    }
}
