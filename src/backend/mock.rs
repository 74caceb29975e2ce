//! Scripted backend for exercising the query and polling layers.
//!
//! Mimics the event stream of a real run: every device gets a progress
//! event, a payload-less result event and a decoy event addressed to some
//! other host before its actual output.

use super::types::{
    BackendError, BackendResult, CommandBackend, CommandSpec, EventKind, ResponseEvent, Scope,
};
use crate::inventory::Device;
use std::collections::HashMap;
use std::time::Duration;

const DECOY_DEVICE: &str = "198.51.100.250";

/// Canned responses for one device
#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    brief: Option<String>,
    counters: HashMap<String, String>,
    unreachable: bool,
    unreachable_on_counters: bool,
    delay: Option<Duration>,
}

impl DeviceScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brief(mut self, output: &str) -> Self {
        self.brief = Some(output.to_string());
        self
    }

    pub fn counters(mut self, interface: &str, output: &str) -> Self {
        self.counters
            .insert(interface.to_string(), output.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn unreachable_on_counters(mut self) -> Self {
        self.unreachable_on_counters = true;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    devices: HashMap<String, DeviceScript>,
    calls: Vec<(Scope, CommandSpec)>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: &str, script: DeviceScript) -> Self {
        self.devices.insert(device.to_string(), script);
        self
    }

    /// Every (scope, command) pair the backend was asked to run
    pub fn calls(&self) -> &[(Scope, CommandSpec)] {
        &self.calls
    }

    fn connection_refused(device: &Device) -> BackendError {
        BackendError::ConnectionFailed {
            device: device.to_string(),
            reason: "connection refused".into(),
        }
    }
}

impl CommandBackend for MockBackend {
    async fn execute(
        &mut self,
        scope: &Scope,
        spec: &CommandSpec,
    ) -> BackendResult<Vec<ResponseEvent>> {
        self.calls.push((scope.clone(), spec.clone()));

        let mut events = Vec::new();
        for device in scope.devices() {
            events.push(ResponseEvent::started(device));

            let Some(script) = self.devices.get(device.as_str()) else {
                continue;
            };

            if let Some(delay) = script.delay {
                tokio::time::sleep(delay).await;
            }

            let decoy = Device::new(DECOY_DEVICE);
            match spec {
                CommandSpec::Single { .. } => {
                    if script.unreachable {
                        return Err(Self::connection_refused(device));
                    }
                    events.push(ResponseEvent::output(&decoy, None, "decoy"));
                    events.push(ResponseEvent {
                        kind: EventKind::Result,
                        device: device.to_string(),
                        payload: None,
                    });
                    match &script.brief {
                        Some(output) => events.push(ResponseEvent::output(device, None, output)),
                        None => events.push(ResponseEvent::failed(device, None)),
                    }
                }
                CommandSpec::PerItem { items, .. } => {
                    if script.unreachable || script.unreachable_on_counters {
                        return Err(Self::connection_refused(device));
                    }
                    for item in items {
                        events.push(ResponseEvent::output(&decoy, Some(item.as_str()), "99 CRC"));
                        match script.counters.get(item) {
                            Some(output) => {
                                events.push(ResponseEvent::output(device, Some(item.as_str()), output))
                            }
                            None => events.push(ResponseEvent::failed(device, Some(item.as_str()))),
                        }
                    }
                }
            }
        }

        Ok(events)
    }
}
