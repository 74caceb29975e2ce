use super::executor::{DeviceError, DeviceReport, Executor};
use crate::backend::{BackendError, CommandBackend};
use crate::config::BackendFaultPolicy;
use crate::inventory::Device;
use crate::report::ReportWriter;
use chrono::NaiveDateTime;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Backend fault on {device}: {source}")]
    Backend {
        device: String,
        #[source]
        source: BackendError,
    },
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunError>;

/// A device that was left out of the report, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDevice {
    pub device: Device,
    pub reason: String,
}

/// Outcome of a fleet run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub devices: usize,
    pub reported: usize,
    pub skipped: Vec<SkippedDevice>,
}

/// Walks the fleet one device at a time and writes each complete report.
pub struct Scheduler<B, W: Write> {
    executor: Executor<B>,
    writer: ReportWriter<W>,
    device_timeout: Option<Duration>,
    fault_policy: BackendFaultPolicy,
}

impl<B: CommandBackend, W: Write> Scheduler<B, W> {
    pub fn new(
        executor: Executor<B>,
        writer: ReportWriter<W>,
        device_timeout: Option<Duration>,
        fault_policy: BackendFaultPolicy,
    ) -> Self {
        Self {
            executor,
            writer,
            device_timeout,
            fault_policy,
        }
    }

    /// Reset the sinks, poll every device in order, then restore the scope.
    ///
    /// The scope is restored even when the run stops on a fatal error.
    pub async fn run(&mut self, devices: &[Device], started: NaiveDateTime) -> Result<RunSummary> {
        let result = self.poll_fleet(devices, started).await;
        self.executor.restore_scope();
        debug!("Run scope restored to full fleet");
        result
    }

    async fn poll_fleet(&mut self, devices: &[Device], started: NaiveDateTime) -> Result<RunSummary> {
        self.writer.begin(started)?;

        info!("Polling {} devices", devices.len());

        let mut summary = RunSummary {
            devices: devices.len(),
            ..Default::default()
        };

        for device in devices {
            debug!("Polling device {}", device);

            match self.poll_one(device).await {
                Ok(report) => {
                    self.emit(device, &report)?;
                    summary.reported += 1;
                }
                Err(err) => {
                    let skipped = self.skip_or_abort(device, err)?;
                    summary.skipped.push(skipped);
                }
            }
        }

        info!(
            "Run complete: {} devices, {} reported, {} skipped",
            summary.devices,
            summary.reported,
            summary.skipped.len()
        );

        Ok(summary)
    }

    async fn poll_one(&mut self, device: &Device) -> std::result::Result<DeviceReport, DeviceError> {
        match self.device_timeout {
            Some(limit) => timeout(limit, self.executor.poll_device(device))
                .await
                .unwrap_or(Err(DeviceError::Timeout(limit))),
            None => self.executor.poll_device(device).await,
        }
    }

    /// Backend faults end the run unless the policy says to skip them;
    /// every other failure skips the device.
    fn skip_or_abort(&self, device: &Device, err: DeviceError) -> Result<SkippedDevice> {
        let reason = match err {
            DeviceError::Parse(_) | DeviceError::Correlation(_) | DeviceError::Timeout(_) => {
                err.to_string()
            }
            DeviceError::Backend(source) => match self.fault_policy {
                BackendFaultPolicy::Abort => {
                    error!("Backend fault on {}, aborting run: {}", device, source);
                    return Err(RunError::Backend {
                        device: device.to_string(),
                        source,
                    });
                }
                BackendFaultPolicy::Skip => format!("Backend error: {}", source),
            },
        };

        warn!("Skipping {}: {}", device, reason);

        Ok(SkippedDevice {
            device: device.clone(),
            reason,
        })
    }

    fn emit(&mut self, device: &Device, report: &DeviceReport) -> Result<()> {
        self.writer.write_classification(&report.classification)?;
        self.writer.write_counters(&report.counters)?;

        info!(
            "{}: {} healthy, {} degraded, counters {}",
            device,
            report.classification.healthy.len(),
            report.classification.degraded.len(),
            if report.counters.is_changed() {
                "detected"
            } else {
                "clean"
            }
        );
        Ok(())
    }

    #[cfg(test)]
    pub fn into_writer(self) -> ReportWriter<W> {
        self.writer
    }

    #[cfg(test)]
    pub fn executor(&self) -> &Executor<B> {
        &self.executor
    }
}
