use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::dispatch::{AlertDispatcher, AlertQueue, DispatchOutcome};
use crate::monitor::{Alert, monotonic_now};

/// Consumes the alert queue until cancelled, then drains what is left so no
/// alert handed over before shutdown is lost.
///
/// `cancel` must only fire once nothing else will be pushed onto `queue`.
/// The drain is not time-boxed: with every channel hanging it can take up to
/// queue capacity × channel count × channel timeout (32 × 3 × 15 s, about
/// 24 minutes, with the defaults).
pub async fn run_dispatch_worker(
    dispatcher: AlertDispatcher,
    queue: Arc<AlertQueue>,
    cancel: CancellationToken,
) {
    log::info!(
        "dispatch_worker_started channels={} queue_capacity={}",
        dispatcher.channel_names().join(","),
        queue.capacity()
    );

    loop {
        while let Some(alert) = queue.pop().await {
            deliver(&dispatcher, &alert).await;
        }

        tokio::select! {
            _ = queue.notified() => {}
            _ = cancel.cancelled() => break,
        }
    }

    let pending = queue.len().await;
    if pending > 0 {
        log::info!("dispatch_worker_draining pending={}", pending);
    }
    while let Some(alert) = queue.pop().await {
        deliver(&dispatcher, &alert).await;
    }

    log::info!("dispatch_worker_stopped");
}

async fn deliver(dispatcher: &AlertDispatcher, alert: &Alert) {
    log::debug!(
        "dispatch_alert kind={} queued_ms={}",
        alert.kind,
        monotonic_now()
            .saturating_duration_since(alert.triggered_at)
            .as_millis()
    );
    if dispatcher.dispatch(alert).await == DispatchOutcome::AllChannelsFailed {
        log::error!(
            "CRITICAL: alert delivery failed on every channel kind={} raised_at={} alert={:?}",
            alert.kind,
            alert.raised_at.to_rfc3339(),
            alert.message
        );
    }
}
