mod telegram;
mod twilio;
mod webhook;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ChannelConfig, ConfigError};

pub use telegram::TelegramChannel;
pub use twilio::TwilioChannel;
pub use webhook::WebhookChannel;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// A transport able to deliver a short text alert.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), ChannelError>;
}

/// Builds channels in configured priority order. Expects secrets already
/// resolved.
pub fn build_channels(
    configs: &[ChannelConfig],
) -> Result<Vec<Box<dyn NotificationChannel>>, ConfigError> {
    let client = reqwest::Client::new();

    configs
        .iter()
        .map(|config| -> Result<Box<dyn NotificationChannel>, ConfigError> {
            let channel: Box<dyn NotificationChannel> = match config {
                ChannelConfig::Telegram(telegram) => Box::new(TelegramChannel::new(
                    &telegram.bot_token,
                    telegram.parsed_chat_id()?,
                )),
                ChannelConfig::Twilio(twilio) => {
                    Box::new(TwilioChannel::new(twilio.clone(), client.clone()))
                }
                ChannelConfig::Webhook(webhook) => {
                    Box::new(WebhookChannel::new(webhook.url.clone(), client.clone()))
                }
            };
            Ok(channel)
        })
        .collect()
}

/// Trims a response body for inclusion in an error.
pub(crate) fn truncate_body(body: String) -> String {
    const MAX_BODY_CHARS: usize = 200;
    if body.chars().count() <= MAX_BODY_CHARS {
        return body;
    }
    let mut truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    truncated.push('…');
    truncated
}
