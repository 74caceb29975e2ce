use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while turning command output into typed records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("command produced no output")]
    NoOutput,
    #[error("expected 6 fields, found {found}: {line:?}")]
    FieldCount { line: String, found: usize },
    #[error("counter value is not a non-negative integer: {clause:?}")]
    InvalidCounterValue { clause: String },
    #[error("counter clause has no label: {clause:?}")]
    MissingCounterLabel { clause: String },
    #[error("empty counter clause in {line:?}")]
    EmptyCounterClause { line: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// One row of interface-brief output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub device: String,
    pub name: String,
    pub ip_address: String,
    pub ok_flag: String,
    pub method: String,
    pub line_status: String,
    pub protocol_status: String,
}

/// Error counters reported by one interface, keyed by the label printed on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounterRecord {
    pub device: String,
    pub interface: String,
    pub counters: BTreeMap<String, u64>,
}
