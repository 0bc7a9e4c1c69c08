use std::sync::Arc;

use tokio::time::{Duration, Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::dispatch::AlertQueue;
use crate::monitor::{MetricKind, MetricSampler, MonitorSet, SampleBatch, monotonic_now};

/// Drives sampling on a fixed cadence and hands alerts to the dispatch queue.
pub struct MonitorLoop<S> {
    sampler: S,
    monitors: MonitorSet,
    queue: Arc<AlertQueue>,
}

impl<S: MetricSampler> MonitorLoop<S> {
    pub fn new(sampler: S, monitors: MonitorSet, queue: Arc<AlertQueue>) -> Self {
        Self {
            sampler,
            monitors,
            queue,
        }
    }

    /// Runs until `cancel` fires. Cancellation is only observed between ticks,
    /// so a tick that has started always finishes queueing its alerts. The
    /// dispatch worker must keep running until this future has returned.
    pub async fn run(mut self, sample_interval: Duration, cancel: CancellationToken) -> MonitorSet {
        let mut ticker = interval(sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous_tick: Option<Instant> = None;

        log::info!(
            "monitor_loop_started interval_secs={} metrics={}",
            sample_interval.as_secs_f32(),
            self.monitors
                .iter()
                .map(|monitor| monitor.kind().name())
                .collect::<Vec<_>>()
                .join(",")
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let now = Instant::now();
            if let Some(previous) = previous_tick {
                let elapsed = now.duration_since(previous);
                if elapsed > sample_interval * 2 {
                    log::warn!(
                        "monitor_loop_delayed elapsed_ms={} threshold_ms={}",
                        elapsed.as_millis(),
                        (sample_interval * 2).as_millis()
                    );
                }
            }
            previous_tick = Some(now);

            self.tick().await;
        }

        log::info!("monitor_loop_stopped");
        self.monitors
    }

    async fn tick(&mut self) {
        let batch = self.sampler.sample_all().await;
        log_metrics(&batch);

        let alerts = self.monitors.evaluate(batch, monotonic_now());
        if alerts.is_empty() {
            return;
        }

        if let Some(report) = self.sampler.system_report() {
            log::warn!("system_report {}", report);
        }

        for alert in alerts {
            log::warn!(
                "alert_raised kind={} value={:.1} raised_at={}",
                alert.kind,
                alert.value,
                alert.raised_at.to_rfc3339()
            );
            if let Some(dropped) = self.queue.push(alert).await {
                log::warn!(
                    "alert_queue_full capacity={} dropped_kind={} dropped_raised_at={}",
                    self.queue.capacity(),
                    dropped.kind,
                    dropped.raised_at.to_rfc3339()
                );
            }
        }
    }
}

fn log_metrics(batch: &SampleBatch) {
    let value_of = |kind: MetricKind| {
        batch
            .iter()
            .find(|(sample_kind, _)| *sample_kind == kind)
            .and_then(|(_, result)| result.as_ref().ok())
            .map(|sample| sample.value)
    };

    tracing::info!(
        target: "monitor",
        module = "monitor",
        cpu = value_of(MetricKind::Cpu),
        memory = value_of(MetricKind::Memory),
        disk = value_of(MetricKind::Disk),
        "monitor_metrics"
    );
}
