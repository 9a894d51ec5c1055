use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "flamebridge".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Outbound telemetry endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "default_telemetry_url")]
    pub url: String,
    #[serde(default = "default_write_key")]
    pub write_key: String,
    /// Channel the write key belongs to. Kept for operator reference; the
    /// update API authenticates by write key alone.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            url: default_telemetry_url(),
            write_key: default_write_key(),
            channel_id: default_channel_id(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_telemetry_url() -> String {
    "https://api.thingspeak.com/update".to_string()
}
fn default_write_key() -> String {
    "HITKR226V904U31A".to_string()
}
fn default_channel_id() -> String {
    "3231008".to_string()
}
fn default_request_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Advertised local name of the sensor peripheral (exact match).
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,
    /// Interval of the connection liveness poll.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_data_uuid")]
    pub ble_data_char_uuid: String,

    #[serde(default)]
    pub telemetry: TelemetrySettings,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            scan_timeout_secs: default_scan_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            ble_data_char_uuid: default_data_uuid(),
            telemetry: TelemetrySettings::default(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_device_name() -> String {
    "UNO_R4_FIRE".to_string()
}
fn default_scan_timeout_secs() -> u64 {
    15
}
fn default_poll_interval_secs() -> u64 {
    1
}
fn default_data_uuid() -> String {
    "19b10001-e8f2-537e-4f6c-d104768a1216".to_string()
}

pub struct SettingsService {
    settings: Settings,
}

impl SettingsService {
    /// Load settings from `path` when given, otherwise from the default
    /// location. A missing or unreadable file falls back to full defaults.
    pub fn new(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let settings_path = match path {
            Some(p) => p,
            None => Self::default_settings_path()?,
        };
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self { settings })
    }

    fn default_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("flamebridge");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.device_name, "UNO_R4_FIRE");
        assert_eq!(s.scan_timeout_secs, 15);
        assert_eq!(s.poll_interval_secs, 1);
        assert_eq!(s.ble_data_char_uuid, "19b10001-e8f2-537e-4f6c-d104768a1216");
        assert_eq!(s.telemetry.url, "https://api.thingspeak.com/update");
        assert_eq!(s.telemetry.request_timeout_secs, 5);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"device_name": "TEST_SENSOR", "telemetry": {{"write_key": "ABC"}}}}"#
        )
        .unwrap();

        let service = SettingsService::new(Some(file.path().to_path_buf())).unwrap();
        let s = service.get();
        assert_eq!(s.device_name, "TEST_SENSOR");
        assert_eq!(s.telemetry.write_key, "ABC");
        // Everything unspecified keeps its default
        assert_eq!(s.scan_timeout_secs, 15);
        assert_eq!(s.telemetry.url, "https://api.thingspeak.com/update");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let service = SettingsService::new(Some(dir.path().join("nope.json"))).unwrap();
        assert_eq!(service.get().device_name, "UNO_R4_FIRE");
    }
}
