use std::time::Duration;

use serde::Deserialize;

use crate::monitor::{MetricKind, ThresholdConfig};

use super::defaults::*;
use super::validate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: u64,
    #[serde(default = "default_dispatch_queue_capacity")]
    pub dispatch_queue_capacity: usize,
    #[serde(default = "default_channel_timeout_secs")]
    pub channel_timeout_secs: u64,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Config {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn channel_timeout(&self) -> Duration {
        Duration::from_secs(self.channel_timeout_secs)
    }

    pub fn threshold_configs(&self) -> Vec<ThresholdConfig> {
        MetricKind::ALL
            .into_iter()
            .map(|kind| self.thresholds.for_kind(kind).to_threshold_config(kind))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_cpu_window_ms")]
    pub cpu_window_ms: u64,
    #[serde(default = "default_disk_mount")]
    pub disk_mount: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Simulation {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_cpu_threshold")]
    pub cpu: ThresholdSettings,
    #[serde(default = "default_memory_threshold")]
    pub memory: ThresholdSettings,
    #[serde(default = "default_disk_threshold")]
    pub disk: ThresholdSettings,
}

impl Thresholds {
    pub fn for_kind(&self, kind: MetricKind) -> &ThresholdSettings {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Memory => &self.memory,
            MetricKind::Disk => &self.disk,
        }
    }
}

/// A present `[thresholds.<metric>]` table must name its threshold.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSettings {
    pub threshold_percent: f32,
    #[serde(default = "default_sustain_secs")]
    pub sustain_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ThresholdSettings {
    fn to_threshold_config(&self, kind: MetricKind) -> ThresholdConfig {
        let hint = self.hint.clone().unwrap_or_else(|| {
            match kind {
                MetricKind::Cpu => CPU_HINT,
                MetricKind::Memory => MEMORY_HINT,
                MetricKind::Disk => DISK_HINT,
            }
            .to_string()
        });

        ThresholdConfig {
            kind,
            threshold_percent: self.threshold_percent,
            sustain: Duration::from_secs(self.sustain_secs),
            cooldown: Duration::from_secs(self.cooldown_secs),
            hint,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelConfig {
    Telegram(TelegramChannelConfig),
    Twilio(TwilioChannelConfig),
    Webhook(WebhookChannelConfig),
}

impl ChannelConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelConfig::Telegram(_) => "telegram",
            ChannelConfig::Twilio(_) => "twilio",
            ChannelConfig::Webhook(_) => "webhook",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChannelConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramChannelConfig {
    pub fn parsed_chat_id(&self) -> Result<i64, ConfigError> {
        self.chat_id.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "telegram chat_id must be a numeric chat id, got {:?}",
                self.chat_id
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioChannelConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChannelConfig {
    pub url: String,
}
