use crate::inventory::Device;
use std::future::Future;
use thiserror::Error;

/// Placeholder substituted with each item of a per-item command.
pub const ITEM_PLACEHOLDER: &str = "{item}";

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("connection to {device} failed: {reason}")]
    ConnectionFailed { device: String, reason: String },
    #[error("authentication to {0} failed")]
    AuthenticationFailed(String),
    #[error("command execution failed: {0}")]
    CommandFailed(String),
    #[error("operation timed out")]
    Timeout,
    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Which devices a command is directed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Fleet(Vec<Device>),
    Single(Device),
}

impl Scope {
    pub fn devices(&self) -> &[Device] {
        match self {
            Scope::Fleet(devices) => devices,
            Scope::Single(device) => std::slice::from_ref(device),
        }
    }
}

/// A command to run on every device in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// Run once, producing one result event per device
    Single { command: String },
    /// Run once per item with `{item}` substituted, producing one item event each
    PerItem { template: String, items: Vec<String> },
}

impl CommandSpec {
    /// Concrete command lines this spec expands to, paired with their item
    pub fn expand(&self) -> Vec<(Option<&str>, String)> {
        match self {
            CommandSpec::Single { command } => vec![(None, command.clone())],
            CommandSpec::PerItem { template, items } => items
                .iter()
                .map(|item| (Some(item.as_str()), template.replace(ITEM_PLACEHOLDER, item)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Emitted when work on a device begins; never carries output
    TaskStarted,
    /// Output of a single command
    Result,
    /// Output of one iteration of a per-item command
    ItemResult,
    /// The device rejected the command
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPayload {
    pub item: Option<String>,
    pub stdout_lines: Vec<String>,
}

/// One low-level event reported by a backend while executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEvent {
    pub kind: EventKind,
    /// Address the event was produced for
    pub device: String,
    pub payload: Option<EventPayload>,
}

impl ResponseEvent {
    pub fn started(device: &Device) -> Self {
        Self {
            kind: EventKind::TaskStarted,
            device: device.as_str().to_string(),
            payload: None,
        }
    }

    pub fn failed(device: &Device, item: Option<&str>) -> Self {
        Self {
            kind: EventKind::Failed,
            device: device.as_str().to_string(),
            payload: item.map(|item| EventPayload {
                item: Some(item.to_string()),
                stdout_lines: Vec::new(),
            }),
        }
    }

    pub fn output(device: &Device, item: Option<&str>, stdout: &str) -> Self {
        Self {
            kind: if item.is_some() {
                EventKind::ItemResult
            } else {
                EventKind::Result
            },
            device: device.as_str().to_string(),
            payload: Some(EventPayload {
                item: item.map(str::to_string),
                stdout_lines: stdout.lines().map(str::to_string).collect(),
            }),
        }
    }
}

/// Something that can run a command specification against a set of devices.
///
/// A fault returned here means the backend itself could not do its job
/// (transport, authentication). Commands the device rejects are reported as
/// `EventKind::Failed` events instead.
pub trait CommandBackend {
    fn execute(
        &mut self,
        scope: &Scope,
        spec: &CommandSpec,
    ) -> impl Future<Output = BackendResult<Vec<ResponseEvent>>> + Send;
}
