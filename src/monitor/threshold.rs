use std::time::{Duration, Instant};

use thiserror::Error;

use super::{
    alert::Alert,
    sampler::{MetricKind, MetricSample},
};

#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    pub kind: MetricKind,
    pub threshold_percent: f32,
    pub sustain: Duration,
    pub cooldown: Duration,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Breaching,
    Alerted,
}

/// Invariant: `breach_started_at.is_some()` iff `phase != Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub phase: Phase,
    pub breach_started_at: Option<Instant>,
    pub last_alert_at: Option<Instant>,
}

#[derive(Debug, Error)]
#[error("non-monotonic clock for {kind}: observation at {now:?} precedes previous observation at {previous:?}")]
pub struct ClockError {
    pub kind: MetricKind,
    pub previous: Instant,
    pub now: Instant,
}

/// Debounce and cooldown state machine for a single metric.
///
/// A breach has to hold for `sustain` before the first alert. While it keeps
/// holding, the monitor re-alerts once every `cooldown`. Any sample at or below
/// the threshold ends the episode.
#[derive(Debug)]
pub struct ThresholdMonitor {
    config: ThresholdConfig,
    state: MonitorState,
    last_observed_at: Option<Instant>,
}

impl ThresholdMonitor {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            state: MonitorState::default(),
            last_observed_at: None,
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.config.kind
    }

    #[cfg(test)]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn observe(&mut self, sample: MetricSample, now: Instant) -> Option<Alert> {
        if sample.kind != self.config.kind {
            log::warn!(
                "threshold_monitor_kind_mismatch monitor={} sample={}",
                self.config.kind,
                sample.kind
            );
            return None;
        }

        if sample.value.is_nan() {
            log::warn!("threshold_monitor_nan_sample kind={}", self.config.kind);
            return None;
        }

        if let Err(error) = self.advance_clock(now) {
            debug_assert!(false, "{}", error);
            log::error!("CRITICAL: {}", error);
            return None;
        }

        if sample.value <= self.config.threshold_percent {
            if self.state.phase != Phase::Idle {
                log::info!(
                    "threshold_breach_cleared kind={} value={:.1} threshold={:.1}",
                    self.config.kind,
                    sample.value,
                    self.config.threshold_percent
                );
            }
            self.state = MonitorState::default();
            return None;
        }

        match self.state.phase {
            Phase::Idle => {
                self.state.phase = Phase::Breaching;
                self.state.breach_started_at = Some(now);
                log::info!(
                    "threshold_breach_started kind={} value={:.1} threshold={:.1}",
                    self.config.kind,
                    sample.value,
                    self.config.threshold_percent
                );
                self.fire_if_due(sample.value, now)
            }
            Phase::Breaching => self.fire_if_due(sample.value, now),
            Phase::Alerted => {
                if self.cooldown_elapsed(now) {
                    Some(self.fire(sample.value, now))
                } else {
                    None
                }
            }
        }
    }

    fn advance_clock(&mut self, now: Instant) -> Result<(), ClockError> {
        if let Some(previous) = self.last_observed_at
            && now < previous
        {
            return Err(ClockError {
                kind: self.config.kind,
                previous,
                now,
            });
        }

        self.last_observed_at = Some(now);
        Ok(())
    }

    fn fire_if_due(&mut self, value: f32, now: Instant) -> Option<Alert> {
        if self.sustain_met(now) && self.cooldown_elapsed(now) {
            Some(self.fire(value, now))
        } else {
            None
        }
    }

    fn sustain_met(&self, now: Instant) -> bool {
        self.state
            .breach_started_at
            .is_some_and(|started| now.duration_since(started) >= self.config.sustain)
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.state
            .last_alert_at
            .is_none_or(|last| now.duration_since(last) >= self.config.cooldown)
    }

    fn fire(&mut self, value: f32, now: Instant) -> Alert {
        self.state.last_alert_at = Some(now);
        self.state.phase = Phase::Alerted;
        Alert::new(self.config.kind, value, &self.config.hint, now)
    }
}

#[cfg(test)]
mod tests;
