//! Telemetry polling
//!
//! Every cycle fetches the latest reading, the active alerts and the simulator
//! status concurrently and writes them to the store together, or not at all.

use super::core::EventSender;
use crate::api::RigApi;
use crate::api::error::ApiError;
use crate::error_classifier::{ErrorClassifier, LogLevel};
use crate::events::EventType;
use crate::store::{DashboardStore, Snapshot};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// One or more of the three snapshot fetches failed; the others are discarded.
#[derive(Debug)]
pub struct SnapshotError {
    pub reading: Option<ApiError>,
    pub alerts: Option<ApiError>,
    pub status: Option<ApiError>,
}

impl SnapshotError {
    /// The failed fetches, labelled.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &ApiError)> {
        [
            ("reading", self.reading.as_ref()),
            ("alerts", self.alerts.as_ref()),
            ("simulator status", self.status.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, error)| error.map(|e| (label, e)))
    }

    /// True when every fetch failed on the transport, i.e. the rig is unreachable.
    pub fn is_unreachable(&self) -> bool {
        [&self.reading, &self.alerts, &self.status]
            .iter()
            .all(|e| e.as_ref().is_some_and(ApiError::is_transport))
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unreachable() {
            return write!(f, "rig unreachable");
        }
        let parts: Vec<String> = self
            .failures()
            .map(|(label, e)| format!("{}: {}", label, e))
            .collect();
        write!(f, "partial snapshot ({})", parts.join("; "))
    }
}

impl std::error::Error for SnapshotError {}

/// Fans out the three snapshot fetches and joins them.
pub async fn fetch_snapshot(api: &dyn RigApi) -> Result<Snapshot, SnapshotError> {
    let (reading, alerts, status) = futures::future::join3(
        api.latest_reading(),
        api.latest_alerts(),
        api.simulator_status(),
    )
    .await;

    match (reading, alerts, status) {
        (Ok(reading), Ok(alerts), Ok(simulator)) => Ok(Snapshot {
            reading,
            alerts,
            simulator,
        }),
        (reading, alerts, status) => Err(SnapshotError {
            reading: reading.err(),
            alerts: alerts.err(),
            status: status.err(),
        }),
    }
}

/// State of one running poll loop.
struct PollCycle {
    api: Arc<dyn RigApi>,
    store: DashboardStore,
    events: EventSender,
    classifier: ErrorClassifier,
    epoch: u64,
    failing: bool,
}

impl PollCycle {
    async fn run(
        mut self,
        period: Duration,
        cancel: CancellationToken,
        previous: Option<CancellationToken>,
    ) {
        // A stopped cycle may still be mid-fetch; never fan out alongside it.
        if let Some(previous) = previous {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = previous.cancelled() => {}
            }
        }

        let mut ticker = tokio::time::interval(period);
        // A cycle that overruns the period swallows the ticks it missed.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            // Not raced against cancellation: a late result is dropped by the epoch check.
            self.poll_once().await;
        }
    }

    async fn poll_once(&mut self) {
        match fetch_snapshot(self.api.as_ref()).await {
            Ok(snapshot) => {
                if !self.store.apply_poll(self.epoch, snapshot) {
                    log::debug!(target: "dualfarm::poller", "discarded result of stopped poll cycle");
                    return;
                }
                if self.failing {
                    self.failing = false;
                    self.events.send_poller_event(
                        "Telemetry restored".to_string(),
                        EventType::Success,
                        LogLevel::Info,
                    );
                }
            }
            Err(e) => {
                let level = self.classifier.classify_snapshot_error(&e);
                let msg = if self.failing {
                    format!("Poll still failing, showing last snapshot: {}", e)
                } else {
                    format!("Poll failed, showing last snapshot: {}", e)
                };
                self.failing = true;
                self.events.send_poller_event(msg, EventType::Error, level);
            }
        }
    }
}

struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owned, cancellable polling handle. Dropping it stops polling.
pub struct TelemetryPoller {
    api: Arc<dyn RigApi>,
    store: DashboardStore,
    events: EventSender,
    period: Duration,
    running: Option<PollHandle>,
    /// Cancelled once the most recently spawned loop has exited.
    last_finished: Option<CancellationToken>,
}

impl TelemetryPoller {
    pub fn new(
        api: Arc<dyn RigApi>,
        store: DashboardStore,
        events: EventSender,
        period: Duration,
    ) -> Self {
        Self {
            api,
            store,
            events,
            period,
            running: None,
            last_finished: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Polls immediately, then every period until [`TelemetryPoller::stop`].
    /// After a stop, the first poll waits for the stopped loop to exit.
    /// Calling it while already running does nothing.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        let cycle = PollCycle {
            api: Arc::clone(&self.api),
            store: self.store.clone(),
            events: self.events.clone(),
            classifier: ErrorClassifier::new(),
            epoch: self.store.begin_poll_epoch(),
            failing: false,
        };
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();
        let previous = self.last_finished.replace(finished.clone());
        let period = self.period;
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let _finished = finished.drop_guard();
            cycle.run(period, loop_cancel, previous).await;
        });
        self.events.send_poller_event(
            format!("Polling every {}ms", self.period.as_millis()),
            EventType::Refresh,
            LogLevel::Info,
        );
        self.running = Some(PollHandle { cancel, task });
    }

    /// Stops polling. A cycle still in flight may finish, but it can no longer
    /// write to the store. Returns the loop's task for callers that want to await it.
    pub fn stop(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.running.take()?;
        // Invalidate first so no write can slip in after we return.
        self.store.begin_poll_epoch();
        handle.cancel.cancel();
        Some(handle.task)
    }

    /// Stops polling and waits for the loop to wind down.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.stop() {
            let _ = task.await;
        }
    }
}

impl Drop for TelemetryPoller {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Fetches a fresh snapshot right now and writes it unconditionally.
pub async fn refresh_now(api: &dyn RigApi, store: &DashboardStore) -> Result<(), SnapshotError> {
    let snapshot = fetch_snapshot(api).await?;
    store.replace_snapshot(snapshot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockRigApi, SimulatorStatus};
    use crate::store::fixtures;
    use crate::workers::testing::FakeRig;
    use std::sync::atomic::Ordering;

    fn poller(api: Arc<dyn RigApi>, store: &DashboardStore, period_ms: u64) -> TelemetryPoller {
        let (events, _receiver) = EventSender::channel();
        TelemetryPoller::new(api, store.clone(), events, Duration::from_millis(period_ms))
    }

    fn mock_all_ok(tds_ppm: f64) -> MockRigApi {
        let mut mock = MockRigApi::new();
        mock.expect_latest_reading()
            .returning(move || Ok(Some(fixtures::reading(tds_ppm, crate::api::PumpState::On))));
        mock.expect_latest_alerts().returning(|| Ok(Vec::new()));
        mock.expect_simulator_status().returning(|| {
            Ok(SimulatorStatus {
                running: true,
                message: String::new(),
            })
        });
        mock
    }

    #[tokio::test]
    async fn fetch_snapshot_joins_all_three() {
        let mock = mock_all_ok(820.0);
        let snapshot = fetch_snapshot(&mock).await.unwrap();
        assert_eq!(snapshot.reading.unwrap().tds_ppm, 820.0);
        assert!(snapshot.alerts.is_empty());
        assert!(snapshot.simulator.running);
    }

    #[tokio::test]
    async fn one_failed_fetch_discards_the_others() {
        let mut mock = MockRigApi::new();
        mock.expect_latest_reading()
            .returning(|| Ok(Some(fixtures::reading(820.0, crate::api::PumpState::On))));
        mock.expect_latest_alerts().returning(|| {
            Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        });
        mock.expect_simulator_status()
            .returning(|| Ok(SimulatorStatus::default()));

        let err = fetch_snapshot(&mock).await.unwrap_err();
        assert!(err.reading.is_none());
        assert!(err.alerts.is_some());
        assert!(err.status.is_none());
        assert!(!err.is_unreachable());
        assert!(err.to_string().starts_with("partial snapshot (alerts:"));
    }

    #[tokio::test]
    async fn failed_cycle_keeps_prior_snapshot() {
        let store = DashboardStore::new();
        store.replace_snapshot(fixtures::snapshot(700.0, false));
        let before = store.snapshot();

        let rig = Arc::new(FakeRig::new(950.0));
        rig.fail_alerts.store(true, Ordering::SeqCst);
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        while rig.alerts_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        poller.shutdown().await;

        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn successful_cycle_replaces_all_fields() {
        let store = DashboardStore::new();
        store.replace_snapshot(fixtures::snapshot(700.0, false));
        let mut rx = store.subscribe();

        let rig = Arc::new(FakeRig::new(950.0));
        let mut poller = poller(rig, &store, 3_000);
        poller.start();
        rx.changed().await.unwrap();
        poller.shutdown().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.reading.unwrap().tds_ppm, 950.0);
        assert_eq!(snapshot.alerts.len(), 2);
        assert!(snapshot.simulator.running);
    }

    #[tokio::test]
    async fn stop_discards_in_flight_result() {
        let store = DashboardStore::new();
        let rig = Arc::new(FakeRig::gated(950.0));
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        rig.entered.notified().await;

        let task = poller.stop().expect("poller was running");
        rig.release(1);
        task.await.unwrap();

        assert_eq!(rig.reading_calls(), 1);
        assert_eq!(store.snapshot(), Snapshot::default());
        assert!(!poller.is_running());
    }

    #[tokio::test]
    async fn restart_waits_for_stopped_cycle_then_writes_again() {
        let store = DashboardStore::new();
        let rig = Arc::new(FakeRig::gated(950.0));
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        rig.entered.notified().await;
        let stale = poller.stop().unwrap();

        let mut rx = store.subscribe();
        rig.set_tds(610.0);
        poller.start();
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        // The stopped cycle still holds its fetch, so the new loop has not fanned out.
        assert_eq!(rig.reading_calls(), 1);

        rig.release(1);
        stale.await.unwrap();
        rig.entered.notified().await;
        assert_eq!(rig.reading_calls(), 2);
        rig.release(1);
        rx.changed().await.unwrap();
        poller.shutdown().await;

        assert_eq!(store.snapshot().reading.unwrap().tds_ppm, 610.0);
    }

    #[tokio::test]
    async fn stop_while_waiting_on_previous_cycle_exits() {
        let store = DashboardStore::new();
        let rig = Arc::new(FakeRig::gated(950.0));
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        rig.entered.notified().await;
        let first = poller.stop().unwrap();
        poller.start();
        let second = poller.stop().unwrap();

        second.await.unwrap();
        rig.release(1);
        first.await.unwrap();
        assert_eq!(rig.reading_calls(), 1);
        assert_eq!(store.snapshot(), Snapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_every_period() {
        let store = DashboardStore::new();
        let rig = Arc::new(FakeRig::new(800.0));
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(rig.reading_calls(), 1);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(rig.reading_calls(), 2);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(rig.reading_calls(), 3);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycle_never_overlaps_the_next() {
        let store = DashboardStore::new();
        let rig = Arc::new(FakeRig::gated(800.0));
        let mut poller = poller(rig.clone(), &store, 3_000);

        poller.start();
        rig.entered.notified().await;
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(rig.reading_calls(), 1);

        rig.release(1);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.snapshot().reading.is_some());
        // Missed ticks are skipped, not replayed back to back.
        assert!(rig.reading_calls() <= 2);

        let task = poller.stop().unwrap();
        rig.release(1);
        task.await.unwrap();
    }
}
