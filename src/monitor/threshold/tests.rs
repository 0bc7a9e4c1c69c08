use std::time::{Duration, Instant};

use crate::monitor::{MetricKind, MetricSample};

use super::{MonitorState, Phase, ThresholdConfig, ThresholdMonitor};

fn cpu_monitor(threshold: f32, sustain_secs: u64, cooldown_secs: u64) -> ThresholdMonitor {
    ThresholdMonitor::new(ThresholdConfig {
        kind: MetricKind::Cpu,
        threshold_percent: threshold,
        sustain: Duration::from_secs(sustain_secs),
        cooldown: Duration::from_secs(cooldown_secs),
        hint: String::new(),
    })
}

fn at(start: Instant, secs: u64) -> Instant {
    start + Duration::from_secs(secs)
}

fn observe_at(
    monitor: &mut ThresholdMonitor,
    start: Instant,
    secs: u64,
    value: f32,
) -> Option<crate::monitor::Alert> {
    let now = at(start, secs);
    monitor.observe(MetricSample::new(MetricKind::Cpu, value, now), now)
}

#[test]
fn sustained_breach_fires_at_sustain_then_every_cooldown() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    let mut fired_at = Vec::new();
    for secs in (0..=120).step_by(10) {
        if observe_at(&mut monitor, start, secs, 90.0).is_some() {
            fired_at.push(secs);
        }
    }

    assert_eq!(fired_at, vec![30, 90]);
    assert_eq!(monitor.state().phase, Phase::Alerted);
    assert_eq!(monitor.state().breach_started_at, Some(start));
}

#[test]
fn nothing_fires_before_sustain_is_met() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    assert!(observe_at(&mut monitor, start, 0, 90.0).is_none());
    assert_eq!(monitor.state().phase, Phase::Breaching);
    assert!(observe_at(&mut monitor, start, 10, 90.0).is_none());
    assert!(observe_at(&mut monitor, start, 20, 90.0).is_none());
    assert!(observe_at(&mut monitor, start, 29, 90.0).is_none());

    let alert = observe_at(&mut monitor, start, 30, 90.0).expect("sustain boundary is inclusive");
    assert_eq!(alert.kind, MetricKind::Cpu);
    assert_eq!(alert.triggered_at, at(start, 30));
    assert!(alert.message.contains("90.0%"));
}

#[test]
fn late_tick_fires_on_first_observation_past_sustain() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    assert!(observe_at(&mut monitor, start, 0, 80.0).is_none());
    assert!(observe_at(&mut monitor, start, 25, 80.0).is_none());
    assert!(observe_at(&mut monitor, start, 37, 80.0).is_some());
}

#[test]
fn dip_restarts_the_breach_timer() {
    let mut monitor = cpu_monitor(75.0, 25, 60);
    let start = Instant::now();

    let values = [80.0, 80.0, 60.0, 80.0, 80.0, 80.0];
    for (index, value) in values.into_iter().enumerate() {
        let alert = observe_at(&mut monitor, start, index as u64 * 10, value);
        assert!(alert.is_none(), "no alert expected at sample {}", index);
    }

    let state = monitor.state();
    assert_eq!(state.phase, Phase::Breaching);
    assert_eq!(state.breach_started_at, Some(at(start, 30)));
}

#[test]
fn value_equal_to_threshold_is_not_a_breach() {
    let mut monitor = cpu_monitor(75.0, 0, 60);
    let start = Instant::now();

    assert!(observe_at(&mut monitor, start, 0, 75.0).is_none());
    assert_eq!(monitor.state(), MonitorState::default());
}

#[test]
fn single_low_sample_clears_an_alerted_episode() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    for secs in (0..=30).step_by(10) {
        observe_at(&mut monitor, start, secs, 95.0);
    }
    assert_eq!(monitor.state().phase, Phase::Alerted);

    assert!(observe_at(&mut monitor, start, 40, 75.0).is_none());
    assert_eq!(monitor.state(), MonitorState::default());

    // A new episode has to sustain again before it may fire.
    assert!(observe_at(&mut monitor, start, 50, 95.0).is_none());
    assert!(observe_at(&mut monitor, start, 70, 95.0).is_none());
    assert!(observe_at(&mut monitor, start, 80, 95.0).is_some());
}

#[test]
fn repeat_alerts_are_never_closer_than_cooldown() {
    let mut monitor = cpu_monitor(50.0, 10, 45);
    let start = Instant::now();

    let mut fired_at = Vec::new();
    for secs in (0..600).step_by(7) {
        let value = 60.0 + (secs % 30) as f32;
        if observe_at(&mut monitor, start, secs, value).is_some() {
            fired_at.push(secs);
        }
    }

    assert!(fired_at.len() > 5);
    for pair in fired_at.windows(2) {
        assert!(
            pair[1] - pair[0] >= 45,
            "alerts at {}s and {}s are closer than the cooldown",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn zero_sustain_fires_on_breach_onset() {
    let mut monitor = cpu_monitor(75.0, 0, 60);
    let start = Instant::now();

    assert!(observe_at(&mut monitor, start, 0, 76.0).is_some());
    assert_eq!(monitor.state().phase, Phase::Alerted);
    assert!(observe_at(&mut monitor, start, 59, 76.0).is_none());
    assert!(observe_at(&mut monitor, start, 60, 76.0).is_some());
}

#[test]
fn samples_for_other_metrics_are_ignored() {
    let mut monitor = cpu_monitor(75.0, 0, 60);
    let now = Instant::now();

    let alert = monitor.observe(MetricSample::new(MetricKind::Disk, 99.0, now), now);
    assert!(alert.is_none());
    assert_eq!(monitor.state(), MonitorState::default());
}

#[test]
fn nan_sample_leaves_state_untouched() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    observe_at(&mut monitor, start, 0, 90.0);
    let before = monitor.state();
    assert!(observe_at(&mut monitor, start, 10, f32::NAN).is_none());
    assert_eq!(monitor.state(), before);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "non-monotonic clock")]
fn backward_clock_is_a_defect() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    observe_at(&mut monitor, start, 10, 90.0);
    observe_at(&mut monitor, start, 5, 90.0);
}

#[cfg(not(debug_assertions))]
#[test]
fn backward_clock_observation_is_rejected() {
    let mut monitor = cpu_monitor(75.0, 30, 60);
    let start = Instant::now();

    observe_at(&mut monitor, start, 10, 90.0);
    let before = monitor.state();
    assert!(observe_at(&mut monitor, start, 5, 10.0).is_none());
    assert_eq!(monitor.state(), before);
}
