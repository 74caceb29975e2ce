mod aggregate;
mod backend;
mod classify;
mod config;
mod inventory;
mod parse;
mod poller;
mod report;
mod secret;

use anyhow::Context;
use backend::{DeviceQuery, SshBackend, SshSettings};
use clap::Parser;
use config::{BackendFaultPolicy, RunConfig};
use poller::{Executor, RunSummary, Scheduler};
use report::ReportWriter;
use secret::SecretString;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_logger() {
    // LOG_LEVEL wins over RUST_LOG
    let filter = env::var("LOG_LEVEL")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&filter))
        .with_target(false)
        .init();
}

#[derive(Parser)]
#[command(name = "ifaudit")]
#[command(about = "Fleet interface status and error counter audit", long_about = None)]
struct Args {
    /// Newline-delimited list of device addresses
    #[arg(long, env = "IFAUDIT_INVENTORY", default_value = "inventory/hosts")]
    inventory: PathBuf,

    /// Directory the three report files are written to
    #[arg(long, env = "IFAUDIT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// JSON file overriding commands and report file names
    #[arg(long, env = "IFAUDIT_CONFIG")]
    config: Option<PathBuf>,

    /// SSH username
    #[arg(long, env = "IFAUDIT_USERNAME", default_value = "admin")]
    username: String,

    /// SSH password
    #[arg(long, env = "IFAUDIT_PASSWORD", default_value = "", hide_env_values = true)]
    password: SecretString,

    /// SSH port
    #[arg(long, env = "IFAUDIT_PORT", default_value_t = 22)]
    port: u16,

    /// Seconds to wait for the SSH handshake
    #[arg(long, env = "IFAUDIT_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Upper bound on both queries for one device (0 disables)
    #[arg(long, env = "IFAUDIT_DEVICE_TIMEOUT_SECS", default_value_t = 120)]
    device_timeout_secs: u64,

    /// What to do when a device cannot be reached at all
    #[arg(long, env = "IFAUDIT_BACKEND_FAULTS", value_enum, default_value_t = BackendFaultPolicy::Abort)]
    backend_faults: BackendFaultPolicy,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();

    let args = Args::parse();

    tracing::info!("ifaudit {} starting", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(summary) => {
            for skipped in &summary.skipped {
                tracing::info!("Not reported: {} ({})", skipped.device, skipped.reason);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<RunSummary> {
    let config = RunConfig::load(args.config.as_deref())?;

    let devices = inventory::load_inventory(&args.inventory)
        .with_context(|| format!("Failed to read inventory {}", args.inventory.display()))?;
    tracing::info!(
        "Loaded {} devices from {}: [{}]",
        devices.len(),
        args.inventory.display(),
        inventory::fleet_list(&devices)
    );

    if args.password.is_empty() {
        tracing::warn!("No SSH password configured, authentication will likely fail");
    }

    let backend = SshBackend::new(SshSettings {
        port: args.port,
        username: args.username,
        password: args.password,
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
    });
    let query = DeviceQuery::new(
        backend,
        devices.clone(),
        config.interface_brief_command,
        config.error_counter_command,
    );

    let writer = ReportWriter::create_files(&args.output_dir, &config.sinks).with_context(|| {
        format!(
            "Failed to create report files in {}",
            args.output_dir.display()
        )
    })?;

    let device_timeout = match args.device_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let mut scheduler = Scheduler::new(
        Executor::new(query),
        writer,
        device_timeout,
        args.backend_faults,
    );

    let started = chrono::Local::now().naive_local();
    Ok(scheduler.run(&devices, started).await?)
}
