// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Periodic harvest driver.
//!
//! One loop per aggregator. Each tick awaits the previous `harvest` before
//! sleeping again, which is what guarantees the non-overlapping invocation
//! the aggregator's contract requires. The interval is re-read from
//! configuration every tick so updates take effect without a restart.

use crate::aggregator::HarvestAggregator;
use crate::event::WireRecord;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub fn run_harvest_loop<E: WireRecord>(
    aggregator: Arc<HarvestAggregator<E>>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("harvest loop started");
        loop {
            let interval = aggregator.harvest_interval();
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => aggregator.harvest().await,
            }
        }
        debug!("harvest loop stopped");
    })
}
