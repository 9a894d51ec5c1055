use std::fmt;

/// One parsed notification from the sensor.
///
/// All fields are kept as the opaque strings the peripheral sent; the
/// telemetry endpoint receives them verbatim as `field1..field5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReading {
    pub status: String,
    pub temperature: String,
    pub gas: String,
    pub humidity: String,
    pub flame: String,
}

impl SensorReading {
    /// Display-only label derived from the flame field.
    pub fn flame_state(&self) -> FlameState {
        FlameState::from_field(&self.flame)
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] T:{}C | H:{}% | Gas:{} | Flame:{}",
            self.status,
            self.temperature,
            self.humidity,
            self.gas,
            self.flame_state().label()
        )
    }
}

/// Flame detector state. Not part of the outbound payload: the raw
/// `"0"`/`"1"` string is forwarded, this label is only shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlameState {
    Alert,
    Safe,
}

impl FlameState {
    /// The literal `"1"` means flame detected; anything else is safe.
    pub fn from_field(flame: &str) -> Self {
        if flame == "1" {
            Self::Alert
        } else {
            Self::Safe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Alert => "FLAME!",
            Self::Safe => "Safe",
        }
    }
}

/// Message pushed by the BLE transport task and drained by the bridge loop.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Raw value of one inbound notification.
    Notification(Vec<u8>),
    /// The notification stream ended; the peripheral is gone.
    Disconnected,
}
