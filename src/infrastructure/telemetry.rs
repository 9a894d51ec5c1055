//! Telemetry Upload Module
//!
//! Forwards parsed sensor readings to the cloud telemetry endpoint as an
//! HTTP GET carrying the write key and the five reading fields. Uploads are
//! fire-and-forget: a failed request is reported to the caller, which logs
//! and drops it.

use crate::domain::models::SensorReading;
use crate::domain::settings::TelemetrySettings;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry endpoint returned status {0}")]
    Status(StatusCode),
    #[error("telemetry transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the telemetry update endpoint.
pub struct TelemetryClient {
    client: reqwest::Client,
    settings: TelemetrySettings,
}

impl TelemetryClient {
    pub fn new(settings: TelemetrySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    /// Upload one reading.
    ///
    /// The reading's fields map positionally to `field1..field5`; the raw
    /// flame string goes out as `field5`. Success is exactly HTTP 200.
    pub async fn upload(&self, reading: &SensorReading) -> Result<(), TelemetryError> {
        let response = self
            .client
            .get(&self.settings.url)
            .query(&[
                ("api_key", self.settings.write_key.as_str()),
                ("field1", reading.status.as_str()),
                ("field2", reading.temperature.as_str()),
                ("field3", reading.gas.as_str()),
                ("field4", reading.humidity.as_str()),
                ("field5", reading.flame.as_str()),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(TelemetryError::Status(response.status()));
        }

        debug!("Reading uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reading() -> SensorReading {
        SensorReading {
            status: "OK".to_string(),
            temperature: "23.5".to_string(),
            gas: "120".to_string(),
            humidity: "45".to_string(),
            flame: "0".to_string(),
        }
    }

    fn settings_for(server: &MockServer) -> TelemetrySettings {
        TelemetrySettings {
            url: format!("{}/update", server.uri()),
            write_key: "TESTKEY".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upload_maps_fields_positionally() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/update"))
            .and(query_param("api_key", "TESTKEY"))
            .and(query_param("field1", "OK"))
            .and(query_param("field2", "23.5"))
            .and(query_param("field3", "120"))
            .and(query_param("field4", "45"))
            .and(query_param("field5", "0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelemetryClient::new(settings_for(&server)).unwrap();
        client.upload(&reading()).await.unwrap();
    }

    #[tokio::test]
    async fn non_200_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = TelemetryClient::new(settings_for(&server)).unwrap();
        let err = client.upload(&reading()).await.unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn non_ok_success_status_is_an_error() {
        // Success is exactly 200; even other 2xx statuses are rejected.
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = TelemetryClient::new(settings_for(&server)).unwrap();
        let err = client.upload(&reading()).await.unwrap_err();
        assert!(matches!(err, TelemetryError::Status(StatusCode::NO_CONTENT)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let settings = TelemetrySettings {
            // Nothing listens here; the connection is refused.
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };

        let client = TelemetryClient::new(settings).unwrap();
        let err = client.upload(&reading()).await.unwrap_err();
        assert!(matches!(err, TelemetryError::Transport(_)));
    }
}
