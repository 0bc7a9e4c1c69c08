use super::schema::{SamplerConfig, ThresholdSettings, Thresholds};

pub(super) fn default_sample_interval_secs() -> u64 {
    10
}

pub(super) fn default_dispatch_queue_capacity() -> usize {
    32
}

pub(super) fn default_channel_timeout_secs() -> u64 {
    15
}

pub(super) fn default_sustain_secs() -> u64 {
    30
}

pub(super) fn default_cooldown_secs() -> u64 {
    60
}

pub(super) fn default_cpu_window_ms() -> u64 {
    1000
}

pub(super) fn default_disk_mount() -> String {
    "/".to_string()
}

pub(super) fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

pub(super) fn default_cpu_threshold() -> ThresholdSettings {
    ThresholdSettings::with_threshold(75.0)
}

pub(super) fn default_memory_threshold() -> ThresholdSettings {
    ThresholdSettings::with_threshold(85.0)
}

pub(super) fn default_disk_threshold() -> ThresholdSettings {
    ThresholdSettings::with_threshold(85.0)
}

pub(super) const CPU_HINT: &str =
    "Look at which processes are using the CPU in the process list.";
pub(super) const MEMORY_HINT: &str =
    "Check the process list to see which process is using the most memory.";
pub(super) const DISK_HINT: &str = "Free up some disk space to clear this alert.";

impl ThresholdSettings {
    fn with_threshold(threshold_percent: f32) -> Self {
        Self {
            threshold_percent,
            sustain_secs: default_sustain_secs(),
            cooldown_secs: default_cooldown_secs(),
            hint: None,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: default_cpu_threshold(),
            memory: default_memory_threshold(),
            disk: default_disk_threshold(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            cpu_window_ms: default_cpu_window_ms(),
            disk_mount: default_disk_mount(),
        }
    }
}
