//! Sensor Wire Protocol
//!
//! Parses the notification payloads pushed by the flame sensor peripheral.
//! The data characteristic UUID lives in the settings defaults.
//!
//! The peripheral pushes UTF-8 text records over the data characteristic,
//! five pipe-delimited fields in fixed order:
//!
//! ```text
//! status | temperature | gas | humidity | flame
//! ```
//!
//! Fields are opaque strings; the flame field is `"1"` when the detector
//! tripped. Trailing fields beyond the fifth are ignored.

use crate::domain::models::SensorReading;
use thiserror::Error;

/// Minimum number of pipe-delimited fields in a valid notification
pub const MIN_FIELDS: usize = 5;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("notification is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("expected at least {MIN_FIELDS} fields, got {0}")]
    TooFewFields(usize),
}

/// Parse one raw notification value into a [`SensorReading`].
///
/// The payload is decoded as UTF-8, trimmed, and split on `|`; each field
/// is trimmed individually. Fields are extracted positionally, so records
/// carrying more than five fields still parse.
pub fn parse_reading(raw: &[u8]) -> Result<SensorReading, ProtocolError> {
    let text = std::str::from_utf8(raw)?;
    let fields: Vec<&str> = text.trim().split('|').map(str::trim).collect();

    if fields.len() < MIN_FIELDS {
        return Err(ProtocolError::TooFewFields(fields.len()));
    }

    Ok(SensorReading {
        status: fields[0].to_string(),
        temperature: fields[1].to_string(),
        gas: fields[2].to_string(),
        humidity: fields[3].to_string(),
        flame: fields[4].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FlameState;

    #[test]
    fn parses_safe_reading() {
        let reading = parse_reading(b"OK|23.5|120|45|0").unwrap();
        assert_eq!(reading.status, "OK");
        assert_eq!(reading.temperature, "23.5");
        assert_eq!(reading.gas, "120");
        assert_eq!(reading.humidity, "45");
        assert_eq!(reading.flame, "0");
        assert_eq!(reading.flame_state(), FlameState::Safe);
    }

    #[test]
    fn parses_alert_reading() {
        let reading = parse_reading(b"ALERT|30.1|500|40|1").unwrap();
        assert_eq!(reading.status, "ALERT");
        assert_eq!(reading.flame, "1");
        assert_eq!(reading.flame_state(), FlameState::Alert);
        assert_eq!(reading.flame_state().label(), "FLAME!");
    }

    #[test]
    fn trims_payload_and_fields() {
        let reading = parse_reading(b"  OK | 23.5 |120| 45 | 0 \r\n").unwrap();
        assert_eq!(reading.status, "OK");
        assert_eq!(reading.temperature, "23.5");
        assert_eq!(reading.humidity, "45");
        assert_eq!(reading.flame, "0");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let reading = parse_reading(b"OK|23.5|120|45|0|batt=88").unwrap();
        assert_eq!(reading.flame, "0");
    }

    #[test]
    fn rejects_too_few_fields() {
        let err = parse_reading(b"OK|23.5|120|45").unwrap_err();
        assert!(matches!(err, ProtocolError::TooFewFields(4)));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = parse_reading(b"").unwrap_err();
        assert!(matches!(err, ProtocolError::TooFewFields(1)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_reading(&[0xff, 0xfe, b'|', b'1']).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUtf8(_)));
    }

    #[test]
    fn flame_label_only_trips_on_literal_one() {
        assert_eq!(FlameState::from_field("1"), FlameState::Alert);
        assert_eq!(FlameState::from_field("0"), FlameState::Safe);
        assert_eq!(FlameState::from_field(""), FlameState::Safe);
        assert_eq!(FlameState::from_field("garbage"), FlameState::Safe);
        assert_eq!(FlameState::from_field("01"), FlameState::Safe);
    }

    #[test]
    fn reading_display_line() {
        let reading = parse_reading(b"OK|23.5|120|45|0").unwrap();
        assert_eq!(
            reading.to_string(),
            "[OK] T:23.5C | H:45% | Gas:120 | Flame:Safe"
        );
    }
}
