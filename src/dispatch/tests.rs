use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::channels::{ChannelError, NotificationChannel};
use crate::monitor::{Alert, MetricKind};

use super::{AlertDispatcher, DispatchOutcome};

type SentLog = Arc<Mutex<Vec<String>>>;

struct StubChannel {
    name: &'static str,
    fails: bool,
    sent: SentLog,
}

impl StubChannel {
    fn boxed(name: &'static str, fails: bool) -> (Box<dyn NotificationChannel>, SentLog) {
        let sent = SentLog::default();
        let channel: Box<dyn NotificationChannel> = Box::new(Self {
            name,
            fails,
            sent: sent.clone(),
        });
        (channel, sent)
    }
}

#[async_trait]
impl NotificationChannel for StubChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .expect("sent log lock")
            .push(text.to_string());
        if self.fails {
            return Err(ChannelError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

struct HangingChannel;

#[async_trait]
impl NotificationChannel for HangingChannel {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn send(&self, _text: &str) -> Result<(), ChannelError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn cpu_alert() -> Alert {
    Alert::new(MetricKind::Cpu, 91.0, "Check the process list.", Instant::now())
}

fn sent(log: &SentLog) -> Vec<String> {
    log.lock().expect("sent log lock").clone()
}

#[tokio::test]
async fn primary_success_uses_only_primary() {
    let (primary, primary_log) = StubChannel::boxed("twilio", false);
    let (secondary, secondary_log) = StubChannel::boxed("telegram", false);
    let dispatcher = AlertDispatcher::new(vec![primary, secondary], Duration::from_secs(5))
        .expect("dispatcher should build");

    let alert = cpu_alert();
    let outcome = dispatcher.dispatch(&alert).await;

    assert_eq!(outcome, DispatchOutcome::Delivered { channel_index: 0 });
    assert_eq!(sent(&primary_log), vec![alert.message.clone()]);
    assert!(sent(&secondary_log).is_empty());
}

#[tokio::test]
async fn failing_primary_falls_back_with_notice() {
    let (primary, primary_log) = StubChannel::boxed("twilio", true);
    let (secondary, secondary_log) = StubChannel::boxed("telegram", false);
    let dispatcher = AlertDispatcher::new(vec![primary, secondary], Duration::from_secs(5))
        .expect("dispatcher should build");

    let alert = cpu_alert();
    let outcome = dispatcher.dispatch(&alert).await;

    assert_eq!(outcome, DispatchOutcome::Delivered { channel_index: 1 });
    assert_eq!(sent(&primary_log).len(), 1);
    let fallback = sent(&secondary_log);
    assert_eq!(fallback.len(), 1);
    assert!(fallback[0].contains("twilio failed"));
    assert!(fallback[0].contains(&alert.message));
}

#[tokio::test]
async fn all_channels_failing_is_reported() {
    let (primary, primary_log) = StubChannel::boxed("twilio", true);
    let (secondary, secondary_log) = StubChannel::boxed("telegram", true);
    let dispatcher = AlertDispatcher::new(vec![primary, secondary], Duration::from_secs(5))
        .expect("dispatcher should build");

    let outcome = dispatcher.dispatch(&cpu_alert()).await;

    assert_eq!(outcome, DispatchOutcome::AllChannelsFailed);
    assert_eq!(sent(&primary_log).len() + sent(&secondary_log).len(), 2);
}

#[tokio::test]
async fn third_channel_notice_names_every_failed_channel() {
    let (first, _) = StubChannel::boxed("twilio", true);
    let (second, _) = StubChannel::boxed("webhook", true);
    let (third, third_log) = StubChannel::boxed("telegram", false);
    let dispatcher = AlertDispatcher::new(vec![first, second, third], Duration::from_secs(5))
        .expect("dispatcher should build");

    let outcome = dispatcher.dispatch(&cpu_alert()).await;

    assert_eq!(outcome, DispatchOutcome::Delivered { channel_index: 2 });
    let notice = sent(&third_log);
    assert!(notice[0].contains("twilio and webhook failed"));
}

#[tokio::test(start_paused = true)]
async fn hung_channel_times_out_into_fallback() {
    let (secondary, secondary_log) = StubChannel::boxed("telegram", false);
    let dispatcher = AlertDispatcher::new(
        vec![Box::new(HangingChannel) as Box<dyn NotificationChannel>, secondary],
        Duration::from_secs(10),
    )
    .expect("dispatcher should build");

    let outcome = dispatcher.dispatch(&cpu_alert()).await;

    assert_eq!(outcome, DispatchOutcome::Delivered { channel_index: 1 });
    assert!(sent(&secondary_log)[0].contains("hanging failed"));
}

#[test]
fn empty_channel_list_is_rejected() {
    let result = AlertDispatcher::new(Vec::new(), Duration::from_secs(5));
    assert!(result.is_err());
}
