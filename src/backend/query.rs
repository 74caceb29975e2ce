use super::types::{
    BackendError, CommandBackend, CommandSpec, EventKind, EventPayload, ResponseEvent, Scope,
};
use crate::inventory::Device;
use thiserror::Error;

/// The response events did not contain a coherent result for the device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("no result event carried output for {device}")]
    NoResult { device: String },
    #[error("per-interface result for {device} did not name its interface")]
    MissingItem { device: String },
    #[error("result for {device} names interface {interface} that was not requested")]
    UnexpectedInterface { device: String, interface: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Raw counter output returned for one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutput {
    pub interface: String,
    pub output: String,
}

/// Targeting state handed to the backend on every call.
///
/// Narrowed to one device before that device's queries and restored to the
/// whole fleet with no interface list once the run is over.
#[derive(Debug, Clone)]
pub struct RunScope {
    fleet: Vec<Device>,
    target: Scope,
    interfaces: Vec<String>,
}

impl RunScope {
    pub fn new(fleet: Vec<Device>) -> Self {
        Self {
            target: Scope::Fleet(fleet.clone()),
            fleet,
            interfaces: Vec::new(),
        }
    }

    /// Point at a single device and drop any interface list left from the previous one
    pub fn narrow_to(&mut self, device: &Device) {
        self.target = Scope::Single(device.clone());
        self.interfaces.clear();
    }

    pub fn set_interfaces(&mut self, interfaces: Vec<String>) {
        self.interfaces = interfaces;
    }

    pub fn restore(&mut self) {
        self.target = Scope::Fleet(self.fleet.clone());
        self.interfaces.clear();
    }

    pub fn target(&self) -> &Scope {
        &self.target
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    #[cfg(test)]
    pub fn is_restored(&self) -> bool {
        self.interfaces.is_empty() && self.target == Scope::Fleet(self.fleet.clone())
    }
}

/// Pick the payload of the single-command result produced for `device`.
///
/// Events for other devices, progress events and events without output are
/// skipped. The first matching payload wins.
pub fn select_result<'a>(
    device: &Device,
    events: &'a [ResponseEvent],
) -> Result<&'a EventPayload, CorrelationError> {
    events
        .iter()
        .filter(|event| event.kind == EventKind::Result && event.device == device.as_str())
        .find_map(|event| event.payload.as_ref())
        .ok_or_else(|| CorrelationError::NoResult {
            device: device.to_string(),
        })
}

/// Collect the per-interface results produced for `device`.
///
/// Interfaces whose command failed on the device are absent from the result.
pub fn collect_items(
    device: &Device,
    requested: &[String],
    events: &[ResponseEvent],
) -> Result<Vec<ItemOutput>, CorrelationError> {
    events
        .iter()
        .filter(|event| event.kind == EventKind::ItemResult && event.device == device.as_str())
        .map(|event| {
            let payload = event
                .payload
                .as_ref()
                .ok_or_else(|| CorrelationError::NoResult {
                    device: device.to_string(),
                })?;
            let interface = payload
                .item
                .as_ref()
                .ok_or_else(|| CorrelationError::MissingItem {
                    device: device.to_string(),
                })?;
            if !requested.contains(interface) {
                return Err(CorrelationError::UnexpectedInterface {
                    device: device.to_string(),
                    interface: interface.clone(),
                });
            }
            Ok(ItemOutput {
                interface: interface.clone(),
                output: payload.stdout_lines.join("\n"),
            })
        })
        .collect()
}

/// Device-scoped queries over a command backend.
///
/// Callers get one coherent answer per device; narrowing the scope and
/// picking the right events out of the backend's stream happens here.
pub struct DeviceQuery<B> {
    backend: B,
    scope: RunScope,
    brief_command: String,
    counter_template: String,
}

impl<B: CommandBackend> DeviceQuery<B> {
    pub fn new(
        backend: B,
        fleet: Vec<Device>,
        brief_command: impl Into<String>,
        counter_template: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            scope: RunScope::new(fleet),
            brief_command: brief_command.into(),
            counter_template: counter_template.into(),
        }
    }

    /// Run the interface-brief command on `device` and return its output
    pub async fn interface_brief(&mut self, device: &Device) -> QueryResult<String> {
        self.scope.narrow_to(device);

        let spec = CommandSpec::Single {
            command: self.brief_command.clone(),
        };
        let events = self.backend.execute(self.scope.target(), &spec).await?;
        let payload = select_result(device, &events)?;

        Ok(payload.stdout_lines.join("\n"))
    }

    /// Run the error-counter command on `device` once per interface.
    pub async fn error_counters(
        &mut self,
        device: &Device,
        interfaces: Vec<String>,
    ) -> QueryResult<Vec<ItemOutput>> {
        self.scope.narrow_to(device);
        if interfaces.is_empty() {
            return Ok(Vec::new());
        }
        self.scope.set_interfaces(interfaces);

        let spec = CommandSpec::PerItem {
            template: self.counter_template.clone(),
            items: self.scope.interfaces().to_vec(),
        };
        let events = self.backend.execute(self.scope.target(), &spec).await?;

        Ok(collect_items(device, self.scope.interfaces(), &events)?)
    }

    pub fn restore_scope(&mut self) {
        self.scope.restore();
    }

    #[cfg(test)]
    pub fn scope(&self) -> &RunScope {
        &self.scope
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
