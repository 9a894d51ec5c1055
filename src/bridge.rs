//! Sensor Bridge
//!
//! Coordinates the one conceptual flow of the process: discover the sensor
//! peripheral, connect, subscribe to its data characteristic, and forward
//! each notification to the telemetry endpoint until the peripheral
//! disconnects or the operator interrupts.
//!
//! The BLE transport pushes raw payloads into a single-consumer channel;
//! the loop below drains it one notification at a time, so uploads never
//! interleave. There is no reconnect: a disconnect ends the process.

use crate::domain::models::BridgeEvent;
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::{
    connection::{BleConnection, BleSession, ConnectionConfig},
    protocol,
    scanner::BleScanner,
};
use crate::infrastructure::telemetry::TelemetryClient;
use anyhow::Result;
use btleplug::api::Manager as _;
use btleplug::platform::Manager;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Run the bridge to completion.
///
/// Device-not-found and disconnect are normal terminations; only setup
/// failures (no adapter, GATT errors) surface as errors.
pub async fn run(settings: Settings) -> Result<()> {
    let manager = Manager::new().await?;
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No Bluetooth adapter found"))?;

    let scanner = BleScanner::new(adapter);
    let scan_timeout = Duration::from_secs(settings.scan_timeout_secs);
    let device = match scanner
        .discover_by_name(&settings.device_name, scan_timeout)
        .await?
    {
        Some(device) => device,
        None => {
            warn!(
                "Device '{}' not found within {:?}. Power cycle the sensor if needed.",
                settings.device_name, scan_timeout
            );
            return Ok(());
        }
    };

    let connection = BleConnection::new(ConnectionConfig {
        data_char_uuid: settings.ble_data_char_uuid.clone(),
    });
    let session = connection.connect(&device).await?;

    // The connection is released on every exit path of the session run.
    let result = run_session(&session, &settings).await;
    session.disconnect().await;
    result
}

async fn run_session(session: &BleSession, settings: &Settings) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    session.start_notifications(events_tx).await?;

    let telemetry = TelemetryClient::new(settings.telemetry.clone())?;

    info!("Listening for sensor notifications. Press Ctrl+C to stop.");

    // tokio::time::interval panics on a zero period
    let poll_interval = Duration::from_secs(settings.poll_interval_secs.max(1));
    let mut poll = tokio::time::interval(poll_interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(BridgeEvent::Notification(raw)) => {
                    handle_notification(&telemetry, &raw).await;
                }
                Some(BridgeEvent::Disconnected) | None => {
                    warn!("BLE disconnected");
                    break;
                }
            },
            _ = poll.tick() => {
                if !session.is_connected().await {
                    warn!("BLE disconnected");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Stopping...");
                break;
            }
        }
    }

    Ok(())
}

/// Handle one inbound notification: parse, log, forward.
///
/// Runs inside the drain loop with no caller to report to, so every failure
/// is soft: malformed payloads and failed uploads are logged and dropped.
async fn handle_notification(telemetry: &TelemetryClient, raw: &[u8]) {
    let reading = match protocol::parse_reading(raw) {
        Ok(reading) => reading,
        Err(e) => {
            warn!("Dropping malformed notification: {}", e);
            return;
        }
    };

    info!("{}", reading);

    if let Err(e) = telemetry.upload(&reading).await {
        warn!("Upload failed, reading dropped: {}", e);
    }
}
