use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId};

use super::{ChannelError, NotificationChannel};

pub struct TelegramChannel {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramChannel {
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        self.bot.send_message(self.chat_id, text.to_string()).await?;
        Ok(())
    }
}
