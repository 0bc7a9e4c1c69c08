use thiserror::Error;

use super::schema::{ChannelConfig, Config, ThresholdSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("{field} references environment variable {variable}, which is not set")]
    Secret { field: String, variable: String },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "sample_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.dispatch_queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "dispatch_queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.channel_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "channel_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.sampler.cpu_window_ms == 0 {
            return Err(ConfigError::Validation(
                "sampler.cpu_window_ms must be greater than 0".to_string(),
            ));
        }
        if self.sampler.disk_mount.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sampler.disk_mount must not be empty".to_string(),
            ));
        }

        validate_threshold("thresholds.cpu", &self.thresholds.cpu)?;
        validate_threshold("thresholds.memory", &self.thresholds.memory)?;
        validate_threshold("thresholds.disk", &self.thresholds.disk)?;

        if self.channels.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[channels]] entry is required".to_string(),
            ));
        }
        for (index, channel) in self.channels.iter().enumerate() {
            validate_channel(index, channel)?;
        }

        Ok(())
    }
}

fn validate_threshold(section: &str, settings: &ThresholdSettings) -> Result<(), ConfigError> {
    let value = settings.threshold_percent;
    if value.is_nan() || !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{}.threshold_percent must be between 0 and 100",
            section
        )));
    }
    if settings.cooldown_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "{}.cooldown_secs must be greater than 0",
            section
        )));
    }
    Ok(())
}

fn validate_channel(index: usize, channel: &ChannelConfig) -> Result<(), ConfigError> {
    let fields: Vec<(&str, &str)> = match channel {
        ChannelConfig::Telegram(telegram) => {
            vec![
                ("bot_token", telegram.bot_token.as_str()),
                ("chat_id", telegram.chat_id.as_str()),
            ]
        }
        ChannelConfig::Twilio(twilio) => vec![
            ("account_sid", twilio.account_sid.as_str()),
            ("auth_token", twilio.auth_token.as_str()),
            ("from", twilio.from.as_str()),
            ("to", twilio.to.as_str()),
            ("api_base", twilio.api_base.as_str()),
        ],
        ChannelConfig::Webhook(webhook) => vec![("url", webhook.url.as_str())],
    };

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "channels[{}] ({}) {} must not be empty",
                index,
                channel.name(),
                field
            )));
        }
    }

    if let ChannelConfig::Telegram(telegram) = channel {
        telegram.parsed_chat_id()?;
    }

    Ok(())
}
