use std::time::Instant;

use chrono::{DateTime, Utc};

use super::sampler::MetricKind;

/// One firing of a threshold monitor. Created once, consumed by dispatch.
#[derive(Debug, Clone)]
pub struct Alert {
    pub kind: MetricKind,
    pub message: String,
    pub value: f32,
    pub triggered_at: Instant,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub(crate) fn new(kind: MetricKind, value: f32, hint: &str, triggered_at: Instant) -> Self {
        Self {
            kind,
            message: alert_message(kind, value, hint),
            value,
            triggered_at,
            raised_at: Utc::now(),
        }
    }
}

fn alert_message(kind: MetricKind, value: f32, hint: &str) -> String {
    let headline = format!("⚠️ ALERT: {} usage is high ({:.1}%)", kind.label(), value);
    if hint.trim().is_empty() {
        headline
    } else {
        format!("{}\n{}", headline, hint.trim())
    }
}
