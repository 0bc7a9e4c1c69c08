mod alert;
mod evaluator;
mod report;
mod sampler;
mod threshold;

use std::time::Instant;

pub use alert::Alert;
pub use evaluator::MonitorSet;
#[allow(unused_imports)]
pub use sampler::{
    ActiveSampler, MetricKind, MetricSample, MetricSampler, SampleBatch, SamplingError,
};
#[allow(unused_imports)]
pub use threshold::{Phase, ThresholdConfig};

#[cfg(test)]
pub(crate) use sampler::ScriptedSampler;

/// Monotonic clock shared by samplers and the monitor loop.
///
/// Reads through tokio so a paused test runtime drives it too.
pub fn monotonic_now() -> Instant {
    tokio::time::Instant::now().into_std()
}
