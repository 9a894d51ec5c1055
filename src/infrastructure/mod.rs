//! Infrastructure adapters: BLE transport, telemetry upload, logging.

pub mod bluetooth;
pub mod logging;
pub mod telemetry;
