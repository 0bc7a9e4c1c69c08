use std::time::Instant;

use super::{
    alert::Alert,
    sampler::{MetricKind, SampleBatch},
    threshold::{ThresholdConfig, ThresholdMonitor},
};

/// One `ThresholdMonitor` per tracked metric, owned by the monitor loop.
#[derive(Debug)]
pub struct MonitorSet {
    monitors: Vec<ThresholdMonitor>,
}

impl MonitorSet {
    pub fn new(configs: Vec<ThresholdConfig>) -> Self {
        Self {
            monitors: configs.into_iter().map(ThresholdMonitor::new).collect(),
        }
    }

    #[cfg(test)]
    pub fn get(&self, kind: MetricKind) -> Option<&ThresholdMonitor> {
        self.monitors.iter().find(|monitor| monitor.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdMonitor> {
        self.monitors.iter()
    }

    /// Feeds one tick of samples to the matching monitors.
    ///
    /// A failed reading skips its metric for this tick and keeps the
    /// monitor's state as it was.
    pub fn evaluate(&mut self, batch: SampleBatch, now: Instant) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for (kind, result) in batch {
            let sample = match result {
                Ok(sample) => sample,
                Err(error) => {
                    log::warn!("monitoring sampler error kind={} error={}", kind, error);
                    continue;
                }
            };

            let Some(monitor) = self.monitors.iter_mut().find(|monitor| monitor.kind() == kind)
            else {
                continue;
            };

            log::debug!(
                "monitor_sample kind={} value={:.1} age_ms={}",
                kind,
                sample.value,
                now.saturating_duration_since(sample.observed_at).as_millis()
            );
            if let Some(alert) = monitor.observe(sample, now) {
                alerts.push(alert);
            }
        }

        alerts
    }
}
