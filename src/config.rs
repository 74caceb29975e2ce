use crate::backend::ITEM_PLACEHOLDER;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BRIEF_COMMAND: &str = "show ip interface brief";
pub const DEFAULT_COUNTER_COMMAND: &str = "show interfaces {item} | include errors";

/// Commands and output file names for a run. Every field is optional in the
/// JSON file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub interface_brief_command: String,
    /// Run once per interface; `{item}` is replaced with the interface name
    pub error_counter_command: String,
    pub sinks: SinkNames,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interface_brief_command: DEFAULT_BRIEF_COMMAND.to_string(),
            error_counter_command: DEFAULT_COUNTER_COMMAND.to_string(),
            sinks: SinkNames::default(),
        }
    }
}

/// File names of the three report sinks, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkNames {
    pub healthy: String,
    pub degraded: String,
    pub counters: String,
}

impl Default for SinkNames {
    fn default() -> Self {
        Self {
            healthy: "interfaces_ok.txt".to_string(),
            degraded: "interfaces_down.txt".to_string(),
            counters: "interfaces_counters.txt".to_string(),
        }
    }
}

/// What to do when the backend itself fails for a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendFaultPolicy {
    /// Stop the run and exit with an error
    #[default]
    Abort,
    /// Treat the device like any other failed device and move on
    Skip,
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json).context("Invalid run configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_json(&json)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.interface_brief_command.trim().is_empty() {
            bail!("interface_brief_command must not be empty");
        }
        if !self.error_counter_command.contains(ITEM_PLACEHOLDER) {
            bail!(
                "error_counter_command must contain {} to select the interface",
                ITEM_PLACEHOLDER
            );
        }
        Ok(())
    }
}
