mod channels;
mod config;
mod dispatch;
mod jobs;
mod monitor;

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::channels::build_channels;
use crate::config::{Config, load_config};
use crate::dispatch::{AlertDispatcher, AlertQueue};
use crate::jobs::start_background_jobs;
use crate::monitor::{ActiveSampler, MonitorSet};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "SERVER_WATCH_CONFIG";

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::info!("dotenv_loaded path={}", path.display()),
        Err(error) if error.not_found() => {}
        Err(error) => log::warn!("dotenv_ignored reason=parse_failed error={}", error),
    }
}

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn log_startup(config: &Config, channel_names: &[&str]) {
    for threshold in config.threshold_configs() {
        log::info!(
            "threshold_configured kind={} threshold_percent={:.1} sustain_secs={} cooldown_secs={}",
            threshold.kind,
            threshold.threshold_percent,
            threshold.sustain.as_secs(),
            threshold.cooldown.as_secs()
        );
    }
    log::info!(
        "channels_configured order={} timeout_secs={}",
        channel_names.join(","),
        config.channel_timeout_secs
    );
    if config.simulation.enabled {
        log::warn!("simulation_mode_enabled source=sampler");
    }
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            log::warn!("sigterm handler unavailable: {}", error);
            if let Err(error) = tokio::signal::ctrl_c().await {
                log::error!("ctrl-c handler failed: {}", error);
            }
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                log::error!("ctrl-c handler failed: {}", error);
            }
        }
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("ctrl-c handler failed: {}", error);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_json_logging();
    load_dotenv();

    let path = config_path();
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = match build_channels(&config.channels)
        .and_then(|channels| AlertDispatcher::new(channels, config.channel_timeout()))
    {
        Ok(dispatcher) => dispatcher,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    log::info!("server-watch is starting... config={}", path);
    log_startup(&config, &dispatcher.channel_names());

    let queue = Arc::new(AlertQueue::new(config.dispatch_queue_capacity));
    let monitors = MonitorSet::new(config.threshold_configs());
    let sampler = ActiveSampler::from_config(&config);
    let cancel = CancellationToken::new();

    let jobs = start_background_jobs(
        sampler,
        monitors,
        dispatcher,
        queue,
        config.sample_interval(),
        cancel.clone(),
    );

    wait_for_shutdown().await;
    log::info!("shutdown_requested");
    cancel.cancel();
    jobs.join().await;
    log::info!("server-watch stopped");

    ExitCode::SUCCESS
}
