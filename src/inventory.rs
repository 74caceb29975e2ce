use std::path::Path;

/// One managed endpoint, identified by the address or hostname used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device(String);

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a newline-delimited device list.
///
/// Blank lines are dropped. Order and duplicates are kept as written.
pub fn parse_inventory(contents: &str) -> Vec<Device> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Device::new)
        .collect()
}

/// Comma-separated device identifiers for the startup log line
pub fn fleet_list(devices: &[Device]) -> String {
    devices
        .iter()
        .map(Device::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the fleet device list from disk
pub fn load_inventory<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Device>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_inventory(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fleet_list_names_every_device_in_order() {
        let devices = parse_inventory("10.0.0.2\nedge-sw-3\n10.0.0.2\n");
        assert_eq!(fleet_list(&devices), "10.0.0.2, edge-sw-3, 10.0.0.2");
        assert_eq!(fleet_list(&[]), "");
    }

    #[test]
    fn test_parse_inventory_keeps_order() {
        let devices = parse_inventory("10.0.0.2\n10.0.0.1\nedge-sw-3\n");
        let ids: Vec<&str> = devices.iter().map(Device::as_str).collect();
        assert_eq!(ids, vec!["10.0.0.2", "10.0.0.1", "edge-sw-3"]);
    }

    #[test]
    fn test_parse_inventory_drops_blank_lines() {
        let devices = parse_inventory("\n10.0.0.1\n\n   \n10.0.0.2\n\n");
        assert_eq!(devices, vec![Device::new("10.0.0.1"), Device::new("10.0.0.2")]);
    }

    #[test]
    fn test_parse_inventory_keeps_duplicates() {
        let devices = parse_inventory("r1\nr1\n");
        assert_eq!(devices.len(), 2);
    }

    #[test]
    fn test_parse_inventory_handles_crlf() {
        let devices = parse_inventory("r1\r\nr2\r\n");
        assert_eq!(devices, vec![Device::new("r1"), Device::new("r2")]);
    }

    #[test]
    fn test_parse_inventory_empty() {
        assert!(parse_inventory("").is_empty());
    }

    #[test]
    fn test_load_inventory_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "192.168.1.1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "192.168.1.2").unwrap();

        let devices = load_inventory(file.path()).unwrap();
        assert_eq!(
            devices,
            vec![Device::new("192.168.1.1"), Device::new("192.168.1.2")]
        );
    }

    #[test]
    fn test_load_inventory_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_inventory(dir.path().join("hosts")).is_err());
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::new("core-1").to_string(), "core-1");
    }
}
