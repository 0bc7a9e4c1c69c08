use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::dispatch::{AlertDispatcher, AlertQueue};
use crate::monitor::{MetricSampler, MonitorSet};

mod dispatch;
mod monitor;

pub use dispatch::run_dispatch_worker;
pub use monitor::MonitorLoop;

/// Handles for the two long-running tasks.
///
/// The dispatch worker has its own token. It is only cancelled once the
/// monitor loop has returned, so an alert queued by the last tick is still
/// picked up.
pub struct BackgroundJobs {
    monitor: JoinHandle<MonitorSet>,
    dispatch: JoinHandle<()>,
    dispatch_cancel: CancellationToken,
}

impl BackgroundJobs {
    /// Waits for the monitor loop first, then stops the worker and lets it drain.
    pub async fn join(self) {
        if let Err(error) = self.monitor.await {
            log::error!("monitor loop task failed: {}", error);
        }
        self.dispatch_cancel.cancel();
        if let Err(error) = self.dispatch.await {
            log::error!("dispatch worker task failed: {}", error);
        }
    }
}

pub fn start_background_jobs<S>(
    sampler: S,
    monitors: MonitorSet,
    dispatcher: AlertDispatcher,
    queue: Arc<AlertQueue>,
    sample_interval: Duration,
    cancel: CancellationToken,
) -> BackgroundJobs
where
    S: MetricSampler + 'static,
{
    let dispatch_cancel = CancellationToken::new();
    let dispatch = tokio::spawn(run_dispatch_worker(
        dispatcher,
        queue.clone(),
        dispatch_cancel.clone(),
    ));
    let monitor_loop = MonitorLoop::new(sampler, monitors, queue);
    let monitor = tokio::spawn(monitor_loop.run(sample_interval, cancel));

    BackgroundJobs {
        monitor,
        dispatch,
        dispatch_cancel,
    }
}
