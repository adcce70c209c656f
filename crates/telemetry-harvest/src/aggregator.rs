// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! The harvest aggregator: owns one event buffer per telemetry kind, accepts
//! events from any number of producer threads, and runs the periodic
//! detach/send/handle cycle.
//!
//! One aggregator instance exists per telemetry kind for the process
//! lifetime. Kind-specific behavior (cap source, counter names, transport)
//! is injected as values rather than via subtyping.

use crate::config::{AggregatorConfig, ConfigObserver, ConfigSelector, ConfigService};
use crate::event::WireRecord;
use crate::event_buffer::EventBuffer;
use crate::health::HealthReporter;
use crate::transport::{HarvestBatch, TransmissionOutcome, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Health counter names for one telemetry kind.
#[derive(Debug, Clone, Copy)]
pub struct HarvestCounters {
    pub collected: &'static str,
    pub sent: &'static str,
    pub recollected: &'static str,
}

pub struct HarvestAggregator<E> {
    buffer: EventBuffer<E>,
    transport: Arc<dyn Transport<E>>,
    health: Arc<dyn HealthReporter>,
    config: Arc<ConfigService>,
    select: ConfigSelector,
    counters: HarvestCounters,
    in_flight: AtomicBool,
}

impl<E: WireRecord> HarvestAggregator<E> {
    pub fn new(
        config: Arc<ConfigService>,
        select: ConfigSelector,
        transport: Arc<dyn Transport<E>>,
        health: Arc<dyn HealthReporter>,
        counters: HarvestCounters,
    ) -> Arc<Self> {
        let initial = select(&config.snapshot());
        Arc::new(HarvestAggregator {
            buffer: EventBuffer::new(initial.max_capacity),
            transport,
            health,
            config,
            select,
            counters,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Registers for configuration-change notifications. Held weakly by the
    /// config service, so dropping the aggregator ends the subscription.
    pub fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self) as Weak<dyn ConfigObserver>;
        self.config.subscribe(weak);
    }

    fn current(&self) -> AggregatorConfig {
        (self.select)(&self.config.snapshot())
    }

    /// Harvest period for this kind, re-read from configuration.
    pub fn harvest_interval(&self) -> Duration {
        Duration::from_secs(self.current().harvest_interval_secs)
    }

    /// Number of events waiting for the next harvest.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Accepts one event from a producer thread. Legal in every state and
    /// never errors: invalid events are filtered, capacity overflow drops
    /// the event, and nothing here waits on the transport.
    pub fn collect(&self, event: E) {
        self.health.report(self.counters.collected, 1);

        if !event.is_valid() {
            trace!("dropping invalid {} event", self.counters.collected);
            return;
        }
        if !self.buffer.try_add(event) {
            trace!("buffer at capacity, dropping {} event", self.counters.collected);
        }
    }

    /// Runs one detach/send/handle cycle. The scheduler contract keeps
    /// invocations non-overlapping; an overlapping call is skipped, not an
    /// error.
    pub async fn harvest(&self) {
        let config = self.current();
        if !config.enabled {
            return;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("harvest already in flight, skipping this cycle");
            return;
        }

        let events = self.buffer.detach_and_reset(config.max_capacity);
        if events.is_empty() {
            self.in_flight.store(false, Ordering::Release);
            return;
        }

        let batch = HarvestBatch::new(events);
        debug!("harvesting {} events", batch.len());
        let outcome = self.transport.send(&batch).await;
        self.handle_outcome(outcome, batch);

        self.in_flight.store(false, Ordering::Release);
    }

    fn handle_outcome(&self, outcome: TransmissionOutcome, batch: HarvestBatch<E>) {
        match outcome {
            TransmissionOutcome::Success => {
                self.health.report(self.counters.sent, batch.len() as u64);
            }
            TransmissionOutcome::Retain => self.retain(batch),
            TransmissionOutcome::ReduceOrDiscard | TransmissionOutcome::Discard => {
                debug!("dropping batch of {} events ({outcome})", batch.len());
            }
        }
    }

    /// Merges a batch the collector asked us to keep back into the live
    /// buffer. Events collected while the send was in flight are detached
    /// first and reinserted after the batch, so at the cap boundary
    /// previously-attempted data wins over brand-new data.
    fn retain(&self, batch: HarvestBatch<E>) {
        self.health
            .report(self.counters.recollected, batch.len() as u64);

        // Incoming events can interleave with this swap; the bounded chance
        // of losing a few is accepted over a lock producers would contend on.
        let fresh = self.buffer.detach_and_reset(self.current().max_capacity);

        for event in batch.into_events() {
            self.buffer.try_add(event);
        }
        for event in fresh {
            self.buffer.try_add(event);
        }
    }
}

impl<E: WireRecord> ConfigObserver for HarvestAggregator<E> {
    /// Clears buffered data and re-reads the cap. Runs synchronously on the
    /// thread applying the configuration, possibly one the host application
    /// is blocked on: anything here that reaches the transport, even
    /// indirectly, can deadlock the application.
    fn on_configuration_updated(&self) {
        let config = self.current();
        drop(self.buffer.detach_and_reset(config.max_capacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::event::{LogEvent, LOG_EVENT_COUNTERS};
    use crate::health::AgentHealth;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    type SendHook = Box<dyn Fn() + Send + Sync>;

    /// Transport stub: records shipped messages, returns a configurable
    /// outcome, and can run a hook mid-send to model concurrent collects.
    #[derive(Default)]
    struct MockTransport {
        outcome: Mutex<Vec<TransmissionOutcome>>,
        calls: AtomicUsize,
        shipped: Mutex<Vec<Vec<String>>>,
        on_send: Mutex<Option<SendHook>>,
        delay: Mutex<Option<Duration>>,
    }

    impl MockTransport {
        fn returning(outcome: TransmissionOutcome) -> Arc<Self> {
            let transport = Arc::new(MockTransport::default());
            transport.push_outcome(outcome);
            transport
        }

        fn push_outcome(&self, outcome: TransmissionOutcome) {
            self.outcome.lock().unwrap().insert(0, outcome);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn shipped(&self) -> Vec<Vec<String>> {
            self.shipped.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport<LogEvent> for MockTransport {
        async fn send(&self, batch: &HarvestBatch<LogEvent>) -> TransmissionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.shipped
                .lock()
                .unwrap()
                .push(batch.events().iter().map(|e| e.message.clone()).collect());
            if let Some(hook) = self.on_send.lock().unwrap().take() {
                hook();
            }
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(TransmissionOutcome::Success)
        }
    }

    fn config_with_cap(max_capacity: usize) -> Arc<ConfigService> {
        let mut config = AgentConfig::default();
        config.log_events.max_capacity = max_capacity;
        Arc::new(ConfigService::new(config))
    }

    fn aggregator(
        config: Arc<ConfigService>,
        transport: Arc<MockTransport>,
        health: Arc<AgentHealth>,
    ) -> Arc<HarvestAggregator<LogEvent>> {
        HarvestAggregator::new(
            config,
            |c| c.log_events,
            transport,
            health,
            LOG_EVENT_COUNTERS,
        )
    }

    fn evt(message: &str) -> LogEvent {
        LogEvent::new(1, message)
    }

    #[tokio::test]
    async fn empty_harvest_never_contacts_the_transport() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        let agg = aggregator(
            config_with_cap(10),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );

        agg.harvest().await;
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn success_counts_sent_and_empties_the_buffer() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        let health = Arc::new(AgentHealth::new());
        let agg = aggregator(config_with_cap(100), Arc::clone(&transport), Arc::clone(&health));

        for i in 0..10 {
            agg.collect(evt(&format!("event-{i}")));
        }
        agg.harvest().await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(health.value("log_events_sent"), 10);
        assert_eq!(health.value("log_events_collected"), 10);
        assert_eq!(agg.pending(), 0);
    }

    #[tokio::test]
    async fn invalid_events_are_filtered_at_collect() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        let agg = aggregator(
            config_with_cap(10),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );

        agg.collect(evt("  "));
        agg.collect(evt(""));
        assert_eq!(agg.pending(), 0);
    }

    #[tokio::test]
    async fn disabled_aggregator_skips_the_cycle() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        let mut config = AgentConfig::default();
        config.log_events.enabled = false;
        let agg = aggregator(
            Arc::new(ConfigService::new(config)),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );

        agg.collect(evt("kept until enabled"));
        agg.harvest().await;

        assert_eq!(transport.calls(), 0);
        assert_eq!(agg.pending(), 1);
    }

    #[tokio::test]
    async fn retained_batch_is_reharvested_intact() {
        let transport = MockTransport::returning(TransmissionOutcome::Retain);
        let health = Arc::new(AgentHealth::new());
        let agg = aggregator(config_with_cap(10), Arc::clone(&transport), Arc::clone(&health));

        agg.collect(evt("A"));
        agg.collect(evt("B"));
        agg.harvest().await;
        assert_eq!(health.value("log_events_recollected"), 2);
        assert_eq!(agg.pending(), 2);

        transport.push_outcome(TransmissionOutcome::Success);
        agg.harvest().await;

        let shipped = transport.shipped();
        assert_eq!(shipped.len(), 2);
        assert_eq!(shipped[1], vec!["A".to_string(), "B".to_string()]);
        assert_eq!(health.value("log_events_sent"), 2);
    }

    #[tokio::test]
    async fn retained_events_win_ties_over_fresh_ones_at_the_cap() {
        let transport = MockTransport::returning(TransmissionOutcome::Retain);
        let agg = aggregator(
            config_with_cap(2),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );

        agg.collect(evt("A"));
        agg.collect(evt("B"));

        // C lands while the send is in flight, before reinsertion.
        {
            let agg = Arc::clone(&agg);
            *transport.on_send.lock().unwrap() = Some(Box::new(move || {
                agg.collect(evt("C"));
            }));
        }
        agg.harvest().await;
        assert_eq!(agg.pending(), 2);

        transport.push_outcome(TransmissionOutcome::Success);
        agg.harvest().await;

        let shipped = transport.shipped();
        assert_eq!(shipped[1], vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn discard_outcomes_drop_the_batch() {
        for outcome in [
            TransmissionOutcome::Discard,
            TransmissionOutcome::ReduceOrDiscard,
        ] {
            let transport = MockTransport::returning(outcome);
            let health = Arc::new(AgentHealth::new());
            let agg =
                aggregator(config_with_cap(10), Arc::clone(&transport), Arc::clone(&health));

            agg.collect(evt("gone"));
            agg.harvest().await;

            assert_eq!(agg.pending(), 0);
            assert_eq!(health.value("log_events_sent"), 0);
            assert_eq!(health.value("log_events_recollected"), 0);
        }
    }

    #[tokio::test]
    async fn config_update_clears_the_buffer_without_transport_calls() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        let config = config_with_cap(10);
        let agg = aggregator(
            Arc::clone(&config),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );
        agg.subscribe();

        agg.collect(evt("lost on reset"));
        let mut next = config.snapshot();
        next.log_events.max_capacity = 3;
        config.apply(next);

        assert_eq!(transport.calls(), 0);
        assert_eq!(agg.pending(), 0);

        // The new cap is live immediately.
        for i in 0..5 {
            agg.collect(evt(&format!("event-{i}")));
        }
        assert_eq!(agg.pending(), 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn overlapping_harvest_is_skipped() {
        let transport = MockTransport::returning(TransmissionOutcome::Success);
        *transport.delay.lock().unwrap() = Some(Duration::from_millis(100));
        let agg = aggregator(
            config_with_cap(10),
            Arc::clone(&transport),
            Arc::new(AgentHealth::new()),
        );

        agg.collect(evt("slow"));
        let first = {
            let agg = Arc::clone(&agg);
            tokio::spawn(async move { agg.harvest().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        agg.collect(evt("blocked"));
        agg.harvest().await;
        first.await.expect("harvest task failed");

        assert_eq!(transport.calls(), 1);
        assert!(logs_contain("harvest already in flight"));
    }
}
