//! flamebridge: bridges a BLE flame sensor to a cloud telemetry endpoint.

mod bridge;
mod domain;
mod infrastructure;

use anyhow::Result;
use clap::Parser;
use domain::settings::SettingsService;
use infrastructure::logging;
use std::path::PathBuf;
use tracing::info;

/// BLE flame sensor to telemetry bridge.
#[derive(Parser, Debug)]
#[command(name = "flamebridge", about = "BLE flame sensor to telemetry bridge")]
struct Cli {
    /// Path to the settings file (default: <config dir>/flamebridge/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the advertised name of the sensor peripheral.
    #[arg(long)]
    device_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_service = SettingsService::new(cli.config)?;
    let mut settings = settings_service.get().clone();
    if let Some(name) = cli.device_name {
        settings.device_name = name;
    }

    let _logging_guard = logging::init_logger(&settings.log_settings)?;
    info!("Starting sensor bridge for '{}'", settings.device_name);

    bridge::run(settings).await
}
