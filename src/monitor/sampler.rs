use std::{fmt, future::Future, path::PathBuf, time::Instant};

use serde::Deserialize;
use sysinfo::{CpuExt, DiskExt, System, SystemExt};
use thiserror::Error;
use tokio::time::{Duration, sleep};

use crate::config::Config;

use super::{monotonic_now, report::SystemReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Cpu, MetricKind::Memory, MetricKind::Disk];

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Cpu => "CPU",
            MetricKind::Memory => "Memory",
            MetricKind::Disk => "Disk",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One percentage reading for one metric, taken at `observed_at`.
#[derive(Debug, Clone, Copy)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub value: f32,
    pub observed_at: Instant,
}

impl MetricSample {
    pub fn new(kind: MetricKind, value: f32, observed_at: Instant) -> Self {
        Self {
            kind,
            value,
            observed_at,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum SamplingError {
    #[error("{kind} reading unavailable: {reason}")]
    Unavailable { kind: MetricKind, reason: String },
    #[error("{kind} reading is not a number")]
    NotANumber { kind: MetricKind },
}

impl SamplingError {
    fn unavailable(kind: MetricKind, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            reason: reason.into(),
        }
    }
}

pub type SampleBatch = Vec<(MetricKind, Result<MetricSample, SamplingError>)>;

/// Source of metric readings for the monitor loop.
///
/// `sample` may hold the caller for a bounded window (the CPU measurement
/// window for the system sampler). The loop counts that time as part of the
/// tick.
pub trait MetricSampler: Send {
    fn sample(
        &mut self,
        kind: MetricKind,
    ) -> impl Future<Output = Result<MetricSample, SamplingError>> + Send;

    /// One reading per kind, in `MetricKind::ALL` order.
    fn sample_all(&mut self) -> impl Future<Output = SampleBatch> + Send {
        async move {
            let mut batch = Vec::with_capacity(MetricKind::ALL.len());
            for kind in MetricKind::ALL {
                let result = self.sample(kind).await;
                batch.push((kind, result));
            }
            batch
        }
    }

    fn system_report(&mut self) -> Option<SystemReport> {
        None
    }
}

pub enum ActiveSampler {
    System(Box<SystemSampler>),
    Simulated(SimulatedSampler),
}

impl ActiveSampler {
    pub fn from_config(config: &Config) -> Self {
        if config.simulation.enabled {
            Self::Simulated(SimulatedSampler::new())
        } else {
            Self::System(Box::new(SystemSampler::new(
                Duration::from_millis(config.sampler.cpu_window_ms),
                PathBuf::from(&config.sampler.disk_mount),
            )))
        }
    }
}

impl MetricSampler for ActiveSampler {
    async fn sample(&mut self, kind: MetricKind) -> Result<MetricSample, SamplingError> {
        match self {
            ActiveSampler::System(sampler) => sampler.sample(kind).await,
            ActiveSampler::Simulated(sampler) => sampler.sample(kind).await,
        }
    }

    async fn sample_all(&mut self) -> SampleBatch {
        match self {
            ActiveSampler::System(sampler) => sampler.sample_all().await,
            ActiveSampler::Simulated(sampler) => sampler.sample_all().await,
        }
    }

    fn system_report(&mut self) -> Option<SystemReport> {
        match self {
            ActiveSampler::System(sampler) => sampler.system_report(),
            ActiveSampler::Simulated(sampler) => sampler.system_report(),
        }
    }
}

pub struct SystemSampler {
    system: System,
    cpu_window: Duration,
    disk_mount: PathBuf,
}

impl SystemSampler {
    pub fn new(cpu_window: Duration, disk_mount: PathBuf) -> Self {
        Self {
            system: System::new_all(),
            cpu_window: cpu_window.max(System::MINIMUM_CPU_UPDATE_INTERVAL),
            disk_mount,
        }
    }

    async fn cpu_percent(&mut self) -> Result<f32, SamplingError> {
        self.system.refresh_cpu();
        sleep(self.cpu_window).await;
        self.system.refresh_cpu();

        if self.system.cpus().is_empty() {
            return Err(SamplingError::unavailable(MetricKind::Cpu, "no cpus reported"));
        }
        Ok(self.system.global_cpu_info().cpu_usage())
    }

    fn memory_percent(&mut self) -> Result<f32, SamplingError> {
        self.system.refresh_memory();

        let total_memory = self.system.total_memory() as f64;
        if total_memory <= 0.0 {
            return Err(SamplingError::unavailable(
                MetricKind::Memory,
                "total memory reported as zero",
            ));
        }
        let used_memory = self.system.used_memory() as f64;
        Ok(((used_memory / total_memory) * 100.0) as f32)
    }

    fn disk_percent(&mut self) -> Result<f32, SamplingError> {
        self.system.refresh_disks_list();
        self.system.refresh_disks();

        let disk = self
            .root_disk()
            .ok_or_else(|| SamplingError::unavailable(MetricKind::Disk, "no disks reported"))?;

        let total_space = disk.total_space();
        if total_space == 0 {
            return Err(SamplingError::unavailable(
                MetricKind::Disk,
                format!("disk {} reports zero size", disk.mount_point().display()),
            ));
        }
        let used_space = total_space.saturating_sub(disk.available_space());
        Ok(((used_space as f64 / total_space as f64) * 100.0) as f32)
    }

    fn root_disk(&self) -> Option<&sysinfo::Disk> {
        self.system
            .disks()
            .iter()
            .find(|disk| disk.mount_point() == self.disk_mount.as_path())
            .or_else(|| self.system.disks().first())
    }
}

impl MetricSampler for SystemSampler {
    async fn sample(&mut self, kind: MetricKind) -> Result<MetricSample, SamplingError> {
        let value = match kind {
            MetricKind::Cpu => self.cpu_percent().await?,
            MetricKind::Memory => self.memory_percent()?,
            MetricKind::Disk => self.disk_percent()?,
        };
        finish_sample(kind, value)
    }

    fn system_report(&mut self) -> Option<SystemReport> {
        let disk = self.root_disk()?;
        let disk_total = disk.total_space();
        let disk_free = disk.available_space();

        Some(SystemReport {
            cpu_percent: self.system.global_cpu_info().cpu_usage(),
            memory_total_bytes: self.system.total_memory(),
            memory_available_bytes: self.system.available_memory(),
            memory_used_bytes: self.system.used_memory(),
            disk_total_bytes: disk_total,
            disk_used_bytes: disk_total.saturating_sub(disk_free),
            disk_free_bytes: disk_free,
        })
    }
}

/// Deterministic waveform with periodic spikes, for dry runs.
pub struct SimulatedSampler {
    tick: u64,
}

impl SimulatedSampler {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    fn reading(&self, kind: MetricKind) -> f32 {
        let phase = self.tick as f32 / 8.0;
        match kind {
            MetricKind::Cpu if self.tick > 0 && self.tick.is_multiple_of(30) => 95.0,
            MetricKind::Cpu => 45.0 + (phase.sin() * 20.0),
            MetricKind::Memory if self.tick > 0 && self.tick.is_multiple_of(47) => 93.0,
            MetricKind::Memory => 55.0 + ((phase * 0.7).sin() * 12.0),
            MetricKind::Disk if self.tick > 0 && self.tick.is_multiple_of(83) => 91.0,
            MetricKind::Disk => 60.0 + ((phase * 0.2).sin() * 5.0),
        }
    }
}

impl Default for SimulatedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSampler for SimulatedSampler {
    async fn sample(&mut self, kind: MetricKind) -> Result<MetricSample, SamplingError> {
        finish_sample(kind, self.reading(kind))
    }

    async fn sample_all(&mut self) -> SampleBatch {
        self.tick = self.tick.saturating_add(1);
        MetricKind::ALL
            .into_iter()
            .map(|kind| (kind, finish_sample(kind, self.reading(kind))))
            .collect()
    }
}

fn finish_sample(kind: MetricKind, value: f32) -> Result<MetricSample, SamplingError> {
    if value.is_nan() {
        return Err(SamplingError::NotANumber { kind });
    }
    Ok(MetricSample::new(
        kind,
        value.clamp(0.0, 100.0),
        monotonic_now(),
    ))
}

/// Replays a fixed script of readings; each `sample_all` consumes one row.
#[cfg(test)]
pub(crate) struct ScriptedSampler {
    rows: std::collections::VecDeque<Vec<(MetricKind, Option<f32>)>>,
}

#[cfg(test)]
impl ScriptedSampler {
    pub(crate) fn new(rows: Vec<Vec<(MetricKind, Option<f32>)>>) -> Self {
        Self { rows: rows.into() }
    }

    /// Same CPU value every tick for `ticks` ticks; memory and disk stay low.
    pub(crate) fn constant_cpu(value: f32, ticks: usize) -> Self {
        let row = vec![
            (MetricKind::Cpu, Some(value)),
            (MetricKind::Memory, Some(10.0)),
            (MetricKind::Disk, Some(10.0)),
        ];
        Self::new(vec![row; ticks])
    }
}

#[cfg(test)]
impl MetricSampler for ScriptedSampler {
    async fn sample(&mut self, kind: MetricKind) -> Result<MetricSample, SamplingError> {
        Err(SamplingError::unavailable(
            kind,
            "scripted sampler only supports batches",
        ))
    }

    async fn sample_all(&mut self) -> SampleBatch {
        let Some(row) = self.rows.pop_front() else {
            return MetricKind::ALL
                .into_iter()
                .map(|kind| {
                    (
                        kind,
                        Err(SamplingError::unavailable(kind, "scripted samples exhausted")),
                    )
                })
                .collect();
        };

        row.into_iter()
            .map(|(kind, value)| {
                let result = match value {
                    Some(value) => finish_sample(kind, value),
                    None => Err(SamplingError::unavailable(kind, "scripted failure")),
                };
                (kind, result)
            })
            .collect()
    }
}
