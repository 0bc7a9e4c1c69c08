mod defaults;
mod io;
mod schema;
mod secrets;
mod validate;

#[allow(unused_imports)]
pub use io::{load_config, load_config_with};
#[allow(unused_imports)]
pub use schema::{
    ChannelConfig, Config, SamplerConfig, Simulation, TelegramChannelConfig, ThresholdSettings,
    Thresholds, TwilioChannelConfig, WebhookChannelConfig,
};
pub use validate::ConfigError;
