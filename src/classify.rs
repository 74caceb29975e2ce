use crate::parse::InterfaceRecord;

/// IP address column value for interfaces with no address configured.
pub const UNASSIGNED: &str = "unassigned";

const UP: &str = "up";

/// Healthy and degraded interface names for one device, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub device: String,
    pub healthy: Vec<String>,
    pub degraded: Vec<String>,
}

/// Split a device's addressed interfaces into healthy (line and protocol up)
/// and degraded. Interfaces without an IP address are left out of both.
pub fn classify(device: &str, records: &[InterfaceRecord]) -> ClassificationResult {
    let mut result = ClassificationResult {
        device: device.to_string(),
        ..Default::default()
    };

    for record in records.iter().filter(|r| r.ip_address != UNASSIGNED) {
        if record.line_status == UP && record.protocol_status == UP {
            result.healthy.push(record.name.clone());
        } else {
            result.degraded.push(record.name.clone());
        }
    }

    result
}
