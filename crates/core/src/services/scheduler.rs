use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::record::AggregateRecord;
use crate::models::settings::EngineSettings;
use crate::models::snapshot::PortfolioSnapshot;
use super::aggregator::Aggregator;
use super::cache::PortfolioCache;

/// Outcome of one committed refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub generation: u64,
    pub records: usize,
    /// Records with a current price.
    pub priced: usize,
    /// Records with at least one scraped metric.
    pub with_metrics: usize,
    pub duration: Duration,
}

/// Sole writer of the [`PortfolioCache`].
///
/// Runs a cycle immediately on start, then one per `refresh_interval`. Cycles
/// never overlap: a slow cycle delays the next tick instead of stacking up.
pub struct RefreshScheduler {
    aggregator: Arc<Aggregator>,
    cache: Arc<PortfolioCache>,
    holdings: Arc<[Holding]>,
    settings: EngineSettings,
}

impl RefreshScheduler {
    pub fn new(
        aggregator: Arc<Aggregator>,
        cache: Arc<PortfolioCache>,
        holdings: Arc<[Holding]>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            aggregator,
            cache,
            holdings,
            settings,
        }
    }

    /// Spawn the background loop. Dropping the returned handle without
    /// calling [`SchedulerHandle::stop`] also ends the loop.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(
                holdings = self.holdings.len(),
                interval_secs = self.settings.refresh_interval.as_secs_f64(),
                pacing_ms = self.settings.pacing_delay.as_millis() as u64,
                "refresh scheduler started"
            );

            // First tick completes immediately.
            let mut ticker = interval(self.settings.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stopped.changed() => break,
                }
                tokio::select! {
                    // Errors are logged inside; the schedule carries on regardless.
                    _ = self.refresh_once() => {}
                    _ = stopped.changed() => break,
                }
            }

            tracing::info!("refresh scheduler stopped");
        });

        SchedulerHandle { shutdown, task }
    }

    /// Run one full cycle and commit its snapshot.
    ///
    /// A cycle that panics or fails its consistency check leaves the served
    /// snapshot untouched; the error is logged and returned.
    pub async fn refresh_once(&self) -> Result<CycleReport, CoreError> {
        self.cache.mark_warming();
        let started = Instant::now();
        let generation = self.cache.generation() + 1;

        // Run the fan-out as its own task so a panic is contained. Dropping
        // the set (e.g. on shutdown) aborts the cycle.
        let mut cycle = JoinSet::new();
        cycle.spawn(collect_records(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.holdings),
            self.settings.pacing_delay,
        ));

        let result = match cycle.join_next().await {
            Some(Ok(records)) => self.commit(records, generation, started.elapsed()),
            Some(Err(e)) => Err(CoreError::CycleAborted(e.to_string())),
            None => Err(CoreError::CycleAborted("cycle task vanished".into())),
        };

        match &result {
            Ok(report) => tracing::info!(
                generation = report.generation,
                priced = report.priced,
                with_metrics = report.with_metrics,
                records = report.records,
                duration_ms = report.duration.as_millis() as u64,
                "portfolio snapshot committed"
            ),
            Err(e) => {
                tracing::error!(error = %e, "refresh cycle failed, keeping previous snapshot");
                self.cache.mark_cycle_failed();
                let view = self.cache.get();
                if view.is_stale(Utc::now(), self.settings.stale_after) {
                    tracing::warn!(
                        generation = view.snapshot.generation,
                        captured_at = ?view.snapshot.captured_at,
                        "served snapshot is stale"
                    );
                }
            }
        }

        result
    }

    fn commit(
        &self,
        records: Vec<AggregateRecord>,
        generation: u64,
        duration: Duration,
    ) -> Result<CycleReport, CoreError> {
        if records.len() != self.holdings.len() {
            return Err(CoreError::CycleAborted(format!(
                "expected {} records, got {}",
                self.holdings.len(),
                records.len()
            )));
        }

        let report = CycleReport {
            generation,
            records: records.len(),
            priced: records.iter().filter(|r| r.is_priced()).count(),
            with_metrics: records.iter().filter(|r| r.has_metrics()).count(),
            duration,
        };

        let snapshot = PortfolioSnapshot::new(records, Utc::now(), generation);
        if !self.cache.set(snapshot) {
            return Err(CoreError::CycleAborted(format!(
                "snapshot generation {generation} was superseded"
            )));
        }
        Ok(report)
    }
}

/// Build every holding's record, in configuration order.
///
/// Holding `i` starts `i × pacing` after the cycle begins and is bounded by
/// its own upstream timeouts, so the cycle ends within
/// `pacing × holdings + timeout` and only the holdings started within one
/// timeout window are in flight at once.
async fn collect_records(
    aggregator: Arc<Aggregator>,
    holdings: Arc<[Holding]>,
    pacing: Duration,
) -> Vec<AggregateRecord> {
    let fetches = holdings.iter().enumerate().map(|(i, holding)| {
        let aggregator = &aggregator;
        async move {
            if i > 0 {
                tokio::time::sleep(pacing * i as u32).await;
            }
            aggregator.build_record(holding).await
        }
    });
    futures::future::join_all(fetches).await
}

/// Control handle for a running [`RefreshScheduler`].
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal shutdown and wait for the loop to exit. An in-flight cycle is
    /// abandoned without committing.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "refresh scheduler task ended abnormally");
        }
    }
}
