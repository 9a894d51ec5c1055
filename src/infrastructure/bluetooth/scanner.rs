//! BLE Scanner Module
//!
//! Handles Bluetooth LE device discovery for the flame sensor peripheral.

use anyhow::Result;
use btleplug::api::{Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Peripheral, PeripheralId};
use futures::stream::StreamExt;
use std::time::Duration;
use tracing::{debug, info};

/// BLE scanner for locating a peripheral by its advertised name
pub struct BleScanner {
    adapter: Adapter,
}

impl BleScanner {
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter }
    }

    /// Scan for a peripheral whose local name equals `name`.
    ///
    /// Returns `Ok(None)` when no matching peripheral advertises within
    /// `timeout`. Scanning is stopped before returning on every path.
    pub async fn discover_by_name(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<Peripheral>> {
        info!("Scanning for '{}' (timeout {:?})", name, timeout);

        // Subscribe to adapter events before starting the scan so no
        // discovery is missed.
        let mut events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;

        let result = tokio::time::timeout(timeout, async {
            // The adapter may have the device cached from an earlier scan.
            if let Some(peripheral) = self.find_by_name(name).await? {
                return Ok(peripheral);
            }

            while let Some(event) = events.next().await {
                match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
                        if let Some(peripheral) = self.check_peripheral(&id, name).await {
                            return Ok(peripheral);
                        }
                    }
                    _ => {}
                }
            }

            anyhow::bail!("Adapter event stream ended during scan")
        })
        .await;

        if let Err(e) = self.adapter.stop_scan().await {
            debug!("Failed to stop scan: {}", e);
        }

        match result {
            Ok(Ok(peripheral)) => Ok(Some(peripheral)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    /// Look through the adapter's known peripherals for a name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Peripheral>> {
        for peripheral in self.adapter.peripherals().await? {
            if Self::name_matches(&peripheral, name).await {
                return Ok(Some(peripheral));
            }
        }
        Ok(None)
    }

    /// A peripheral can disappear between the event and the lookup; treat
    /// lookup failure as no match rather than aborting the scan.
    async fn check_peripheral(&self, id: &PeripheralId, name: &str) -> Option<Peripheral> {
        let peripheral = self.adapter.peripheral(id).await.ok()?;
        if Self::name_matches(&peripheral, name).await {
            return Some(peripheral);
        }
        None
    }

    async fn name_matches(peripheral: &Peripheral, name: &str) -> bool {
        match peripheral.properties().await {
            Ok(Some(props)) => match props.local_name {
                Some(local_name) => {
                    debug!("Saw '{}' ({})", local_name, props.address);
                    local_name == name
                }
                None => false,
            },
            _ => false,
        }
    }
}
