use std::path::Path;

use super::{schema::Config, validate::ConfigError};

/// Reads, resolves `env:` references against the process environment, and
/// validates the config at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

pub fn load_config_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_str.clone(),
        source,
    })?;
    let mut config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path_str,
        source,
    })?;
    config.resolve_secrets(&lookup)?;
    config.validate()?;
    Ok(config)
}
