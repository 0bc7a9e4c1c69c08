mod queue;

use std::time::Duration;

use tokio::time::timeout;

use crate::channels::{ChannelError, NotificationChannel};
use crate::config::ConfigError;
use crate::monitor::Alert;

pub use queue::AlertQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered { channel_index: usize },
    AllChannelsFailed,
}

/// Ordered fallback delivery: primary channel first, then each fallback only
/// after every earlier channel has failed. No retries at this layer.
pub struct AlertDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
    channel_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(
        channels: Vec<Box<dyn NotificationChannel>>,
        channel_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if channels.is_empty() {
            return Err(ConfigError::Validation(
                "at least one notification channel is required".to_string(),
            ));
        }

        Ok(Self {
            channels,
            channel_timeout,
        })
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|channel| channel.name()).collect()
    }

    pub async fn dispatch(&self, alert: &Alert) -> DispatchOutcome {
        let mut failed: Vec<&str> = Vec::new();

        for (index, channel) in self.channels.iter().enumerate() {
            let text = if failed.is_empty() {
                alert.message.clone()
            } else {
                fallback_notice(&failed, alert)
            };

            match self.send_bounded(channel.as_ref(), &text).await {
                Ok(()) => {
                    if index == 0 {
                        log::info!(
                            "alert_delivered kind={} channel={}",
                            alert.kind,
                            channel.name()
                        );
                    } else {
                        log::warn!(
                            "alert_delivered_via_fallback kind={} channel={} index={} failed_channels={}",
                            alert.kind,
                            channel.name(),
                            index,
                            failed.join(",")
                        );
                    }
                    return DispatchOutcome::Delivered {
                        channel_index: index,
                    };
                }
                Err(error) => {
                    log::warn!(
                        "alert_channel_failed kind={} channel={} index={} error={}",
                        alert.kind,
                        channel.name(),
                        index,
                        error
                    );
                    failed.push(channel.name());
                }
            }
        }

        DispatchOutcome::AllChannelsFailed
    }

    async fn send_bounded(
        &self,
        channel: &dyn NotificationChannel,
        text: &str,
    ) -> Result<(), ChannelError> {
        match timeout(self.channel_timeout, channel.send(text)).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout {
                timeout_ms: self.channel_timeout.as_millis() as u64,
            }),
        }
    }
}

fn fallback_notice(failed: &[&str], alert: &Alert) -> String {
    format!(
        "⚠️ Alert delivery via {} failed, check that channel's console.\n\n{}\n\nRaised at (UTC): {}",
        failed.join(" and "),
        alert.message,
        alert.raised_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests;
