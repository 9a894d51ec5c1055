//! BLE Connection Module
//!
//! Handles peripheral connection, GATT discovery, and the notification
//! subscription that feeds the bridge's event channel.

use crate::domain::models::BridgeEvent;
use anyhow::{Context, Result};
use btleplug::api::{Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration for connection behavior
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Data characteristic UUID to subscribe to
    pub data_char_uuid: String,
}

/// BLE connection handler
pub struct BleConnection {
    config: ConnectionConfig,
}

impl BleConnection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Connect to the peripheral and locate the data characteristic.
    ///
    /// If GATT setup fails after the physical connection is established,
    /// the link is released before the error propagates; the caller only
    /// owns the connection once a session is returned.
    pub async fn connect(&self, peripheral: &Peripheral) -> Result<BleSession> {
        if !peripheral.is_connected().await? {
            peripheral.connect().await.context("Connection failed")?;
        }

        if let Ok(Some(props)) = peripheral.properties().await {
            info!("Connected to {}", props.address);
        }

        match self.setup_gatt(peripheral).await {
            Ok(data_characteristic) => Ok(BleSession {
                peripheral: peripheral.clone(),
                data_characteristic,
            }),
            Err(e) => {
                if let Err(e) = peripheral.disconnect().await {
                    warn!("Disconnect failed: {}", e);
                }
                Err(e)
            }
        }
    }

    async fn setup_gatt(&self, peripheral: &Peripheral) -> Result<Characteristic> {
        peripheral
            .discover_services()
            .await
            .context("GATT service discovery failed")?;

        let data_characteristic = self.find_data_characteristic(peripheral)?;
        debug!("Found data characteristic {}", data_characteristic.uuid);
        Ok(data_characteristic)
    }

    fn find_data_characteristic(&self, peripheral: &Peripheral) -> Result<Characteristic> {
        let data_uuid = Uuid::parse_str(&self.config.data_char_uuid)
            .with_context(|| format!("Invalid characteristic UUID: {}", self.config.data_char_uuid))?;

        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == data_uuid)
            .ok_or_else(|| anyhow::anyhow!("Data characteristic {} not found", data_uuid))
    }
}

/// A connected session with the sensor peripheral.
///
/// Owns the peripheral handle for the discovery-to-disconnect lifetime;
/// [`disconnect`](Self::disconnect) must run on every exit path of the
/// surrounding operation.
pub struct BleSession {
    peripheral: Peripheral,
    data_characteristic: Characteristic,
}

impl BleSession {
    /// Subscribe to the data characteristic and spawn the forwarder task.
    ///
    /// The task pushes each notification value into `events_tx` and emits
    /// [`BridgeEvent::Disconnected`] when the notification stream ends.
    pub async fn start_notifications(
        &self,
        events_tx: mpsc::UnboundedSender<BridgeEvent>,
    ) -> Result<()> {
        self.peripheral
            .subscribe(&self.data_characteristic)
            .await
            .context("Notification subscription failed")?;

        let mut notifications = self.peripheral.notifications().await?;
        let data_uuid = self.data_characteristic.uuid;

        tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != data_uuid {
                    continue;
                }
                if events_tx
                    .send(BridgeEvent::Notification(notification.value))
                    .is_err()
                {
                    // Receiver dropped; the bridge loop is gone.
                    return;
                }
            }
            let _ = events_tx.send(BridgeEvent::Disconnected);
        });

        info!("Subscribed to sensor notifications");
        Ok(())
    }

    /// Poll the transport for connection liveness.
    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    /// Release the underlying connection.
    pub async fn disconnect(&self) {
        if let Err(e) = self.peripheral.disconnect().await {
            warn!("Disconnect failed: {}", e);
        }
    }
}
