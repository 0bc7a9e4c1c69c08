use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

use crate::monitor::Alert;

/// Bounded hand-off between the monitor loop and the dispatch worker.
///
/// When full, `push` evicts the oldest queued alert so the newest state of an
/// incident always gets through.
#[derive(Debug)]
pub struct AlertQueue {
    alerts: Mutex<VecDeque<Alert>>,
    capacity: usize,
    ready: Notify,
}

impl AlertQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            ready: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueues `alert`, returning the alert evicted to make room, if any.
    pub async fn push(&self, alert: Alert) -> Option<Alert> {
        let dropped = {
            let mut alerts = self.alerts.lock().await;
            let dropped = if alerts.len() >= self.capacity {
                alerts.pop_front()
            } else {
                None
            };
            alerts.push_back(alert);
            dropped
        };

        self.ready.notify_one();
        dropped
    }

    pub async fn pop(&self) -> Option<Alert> {
        self.alerts.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.alerts.lock().await.len()
    }

    /// Resolves after the next `push`, or immediately if one happened since
    /// the last wait.
    pub async fn notified(&self) {
        self.ready.notified().await;
    }
}
