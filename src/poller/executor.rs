use crate::aggregate::{aggregate, AggregatedCounters};
use crate::backend::{BackendError, CommandBackend, CorrelationError, DeviceQuery, QueryError};
use crate::classify::{classify, ClassificationResult};
use crate::inventory::Device;
use crate::parse::{
    parse_counter_output, parse_interface_brief, InterfaceCounterRecord, ParseError,
};
use std::time::Duration;
use thiserror::Error;

/// Why a device produced no report
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Unusable response: {0}")]
    Correlation(#[from] CorrelationError),
    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl From<QueryError> for DeviceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Backend(e) => Self::Backend(e),
            QueryError::Correlation(e) => Self::Correlation(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;

/// Everything learned about one device in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub classification: ClassificationResult,
    pub counters: AggregatedCounters,
}

/// Executor runs the two-query pipeline for one device at a time
pub struct Executor<B> {
    query: DeviceQuery<B>,
}

impl<B: CommandBackend> Executor<B> {
    pub fn new(query: DeviceQuery<B>) -> Self {
        Self { query }
    }

    /// Query, classify and aggregate one device.
    ///
    /// Nothing is written here; the caller decides what to do with a
    /// complete report or an error.
    pub async fn poll_device(&mut self, device: &Device) -> Result<DeviceReport> {
        let brief = self.query.interface_brief(device).await?;
        let records = parse_interface_brief(device.as_str(), &brief)?;

        let classification = classify(device.as_str(), &records);

        // Every discovered interface is checked for errors, addressed or not
        let interfaces: Vec<String> = records.iter().map(|r| r.name.clone()).collect();

        tracing::debug!(
            "{}: {} interfaces discovered, {} healthy, {} degraded",
            device,
            interfaces.len(),
            classification.healthy.len(),
            classification.degraded.len()
        );

        let outputs = self.query.error_counters(device, interfaces).await?;
        let counter_records = outputs
            .into_iter()
            .map(|item| -> Result<InterfaceCounterRecord> {
                Ok(InterfaceCounterRecord {
                    device: device.as_str().to_string(),
                    counters: parse_counter_output(&item.output)?,
                    interface: item.interface,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let counters = aggregate(device.as_str(), &counter_records);

        Ok(DeviceReport {
            classification,
            counters,
        })
    }

    pub fn restore_scope(&mut self) {
        self.query.restore_scope();
    }

    #[cfg(test)]
    pub fn query(&self) -> &DeviceQuery<B> {
        &self.query
    }
}
