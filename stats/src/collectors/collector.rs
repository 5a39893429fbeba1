use crate::{
    collectors::StatsSource,
    history::StatsHistory,
    metrics::{
        RedisInfo,
        StatsSnapshot,
    },
};
use chrono::Utc;
use eyre::{
    eyre,
    Result,
};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Upper bound for a single poll. Polls are also bounded by the collection interval when it is shorter.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Counters reported once the collection loop has stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionReport {
    pub polls: u64,
    pub failures: u64,
}

/// Polls a [`StatsSource`] on an interval and appends every snapshot to the history.
pub struct StatsCollector<S> {
    source: S,
    history: StatsHistory,
    interval: Duration,
    poll_timeout: Duration,
}

impl<S: StatsSource> StatsCollector<S> {
    pub fn new(source: S, history: StatsHistory, interval: Duration) -> Self {
        Self {
            source,
            history,
            interval,
            poll_timeout: interval.min(POLL_TIMEOUT),
        }
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    /// One poll: fetch `INFO`, parse it and record the snapshot.
    pub async fn collect_once(&mut self) -> Result<StatsSnapshot> {
        let raw = self.source.info().await?;
        let snapshot = StatsSnapshot::from_info(&RedisInfo::parse(&raw), Utc::now());
        self.history.push(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Runs until `shutdown` is cancelled, then disconnects the source.
    ///
    /// Cancellation is only observed between polls, so an in-flight poll always finishes before the
    /// connection is torn down. Each poll is bounded by the poll timeout, so shutdown waits at most
    /// that long. A failed or timed out poll is logged and the loop carries on with the next tick.
    pub async fn run(mut self, shutdown: CancellationToken) -> CollectionReport {
        let mut report = CollectionReport::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            redis = self.source.name(),
            interval = ?self.interval,
            "Stats collection started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let poll = tokio::time::timeout(self.poll_timeout, self.collect_once())
                .await
                .unwrap_or_else(|_| Err(eyre!("INFO did not answer within {:?}", self.poll_timeout)));
            match poll {
                Ok(snapshot) => {
                    report.polls += 1;
                    debug!(
                        used_memory = snapshot.used_memory,
                        ops_per_sec = snapshot.instantaneous_ops_per_sec,
                        hit_rate = snapshot.hit_rate,
                        "Collected redis stats"
                    );
                }
                Err(err) => {
                    report.failures += 1;
                    warn!("Failed to collect redis stats: {err:#}");
                }
            }
        }

        self.source.disconnect().await;
        info!(polls = report.polls, failures = report.failures, "Stats collection stopped");
        report
    }
}
