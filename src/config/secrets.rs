use super::schema::{ChannelConfig, Config};
use super::validate::ConfigError;

const ENV_REFERENCE_PREFIX: &str = "env:";

impl Config {
    /// Replaces every `env:NAME` channel value with the variable's contents.
    pub(super) fn resolve_secrets<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let prefix = format!("channels[{}]", index);
            match channel {
                ChannelConfig::Telegram(telegram) => {
                    resolve_value(&prefix, "bot_token", &mut telegram.bot_token, lookup)?;
                    resolve_value(&prefix, "chat_id", &mut telegram.chat_id, lookup)?;
                }
                ChannelConfig::Twilio(twilio) => {
                    resolve_value(&prefix, "account_sid", &mut twilio.account_sid, lookup)?;
                    resolve_value(&prefix, "auth_token", &mut twilio.auth_token, lookup)?;
                    resolve_value(&prefix, "from", &mut twilio.from, lookup)?;
                    resolve_value(&prefix, "to", &mut twilio.to, lookup)?;
                }
                ChannelConfig::Webhook(webhook) => {
                    resolve_value(&prefix, "url", &mut webhook.url, lookup)?;
                }
            }
        }
        Ok(())
    }
}

fn resolve_value<F>(
    prefix: &str,
    field: &str,
    value: &mut String,
    lookup: &F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(variable) = value.strip_prefix(ENV_REFERENCE_PREFIX) else {
        return Ok(());
    };

    let variable = variable.trim().to_string();
    match lookup(&variable) {
        Some(resolved) => {
            *value = resolved;
            Ok(())
        }
        None => Err(ConfigError::Secret {
            field: format!("{}.{}", prefix, field),
            variable,
        }),
    }
}
