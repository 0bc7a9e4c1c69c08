use async_trait::async_trait;

use crate::config::TwilioChannelConfig;

use super::{ChannelError, NotificationChannel, truncate_body};

/// SMS delivery through the Twilio Messages API.
pub struct TwilioChannel {
    config: TwilioChannelConfig,
    client: reqwest::Client,
}

impl TwilioChannel {
    pub fn new(config: TwilioChannelConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl NotificationChannel for TwilioChannel {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let form = [
            ("To", self.config.to.as_str()),
            ("From", self.config.from.as_str()),
            ("Body", text),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ChannelError::Rejected {
            status: status.as_u16(),
            body: truncate_body(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TwilioChannelConfig;

    use super::TwilioChannel;

    #[test]
    fn messages_url_targets_account_resource() {
        let channel = TwilioChannel::new(
            TwilioChannelConfig {
                account_sid: "AC123".to_string(),
                auth_token: "secret".to_string(),
                from: "+15550001".to_string(),
                to: "+15550002".to_string(),
                api_base: "https://api.twilio.com/".to_string(),
            },
            reqwest::Client::new(),
        );

        assert_eq!(
            channel.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
