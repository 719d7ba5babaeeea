//! DualFarm Rig API Client
//!
//! A JSON-over-HTTP client for the rig's telemetry, control, simulator and report endpoints.

use crate::api::RigApi;
use crate::api::error::ApiError;
use crate::api::types::{
    Alert, ControlAction, DoseCommand, Health, HistoryRange, PumpCommand, PumpState, Report,
    SensorReading, SimulatorStatus,
};
use crate::consts::cli_consts::{DEFAULT_EXPORT_FILE_NAME, network};
use crate::environment::Environment;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

// Build timestamp in milliseconds since epoch
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP", "Build timestamp not available");

// User-Agent string with monitor version
const USER_AGENT: &str = concat!("dualfarm-monitor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    environment: Environment,
}

impl ApiClient {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(network::connect_timeout())
            .timeout(network::request_timeout())
            .build()?;
        Ok(Self {
            client,
            environment,
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(ApiError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn post_request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        log::debug!("POST {}", url);
        let mut request = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    /// Picks the file name out of `Content-Disposition: attachment; filename=...`.
    fn attachment_file_name(response: &Response) -> Option<String> {
        let header = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)?
            .to_str()
            .ok()?;
        parse_attachment_file_name(header)
    }
}

pub(crate) fn parse_attachment_file_name(header: &str) -> Option<String> {
    let name = header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"');
    // Never let the server pick a path outside the export directory.
    let name = Path::new(name).file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[async_trait::async_trait]
impl RigApi for ApiClient {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn health(&self) -> Result<Health, ApiError> {
        self.get_request("health").await
    }

    async fn latest_reading(&self) -> Result<Option<SensorReading>, ApiError> {
        match self.get_request("api/sensors/latest").await {
            Ok(reading) => Ok(Some(reading)),
            // The rig answers 404 until the first reading has been recorded.
            Err(ApiError::Http { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn reading_history(
        &self,
        range: HistoryRange,
    ) -> Result<Vec<SensorReading>, ApiError> {
        let endpoint = format!(
            "api/sensors/history?range={}",
            urlencoding::encode(range.as_str())
        );
        self.get_request(&endpoint).await
    }

    async fn latest_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.get_request("api/alerts/latest").await
    }

    async fn alert_history(&self) -> Result<Vec<Alert>, ApiError> {
        self.get_request("api/alerts/history").await
    }

    async fn simulator_status(&self) -> Result<SimulatorStatus, ApiError> {
        self.get_request("api/simulate/status").await
    }

    async fn start_simulator(&self) -> Result<SimulatorStatus, ApiError> {
        self.post_request::<(), _>("api/simulate/start", None).await
    }

    async fn stop_simulator(&self) -> Result<SimulatorStatus, ApiError> {
        self.post_request::<(), _>("api/simulate/stop", None).await
    }

    async fn set_pump(&self, state: PumpState, user: &str) -> Result<ControlAction, ApiError> {
        let command = PumpCommand { state, user };
        self.post_request("api/control/pump", Some(&command)).await
    }

    async fn dose(&self, amount_ml: u32, user: &str) -> Result<ControlAction, ApiError> {
        let command = DoseCommand { amount_ml, user };
        self.post_request("api/control/dose", Some(&command)).await
    }

    async fn control_history(&self) -> Result<Vec<ControlAction>, ApiError> {
        self.get_request("api/control/history").await
    }

    async fn report(&self) -> Result<Report, ApiError> {
        self.get_request("api/report/robocraft").await
    }

    async fn export_csv(&self, dir: &Path) -> Result<PathBuf, ApiError> {
        let url = self.build_url("api/report/export/csv");
        log::debug!("GET {} (download)", url);
        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP)
            .timeout(network::export_timeout())
            .send()
            .await?;
        let mut response = Self::handle_response_status(response).await?;

        let file_name = Self::attachment_file_name(&response)
            .unwrap_or_else(|| DEFAULT_EXPORT_FILE_NAME.to_string());
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls_without_duplicate_slashes() {
        let client = ApiClient::new(Environment::Custom {
            api_url: "http://rig.lan:8000/".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.build_url("/api/sensors/latest"),
            "http://rig.lan:8000/api/sensors/latest"
        );
    }

    #[test]
    fn attachment_name_is_taken_from_header() {
        assert_eq!(
            parse_attachment_file_name("attachment; filename=dualfarm_sensor_data.csv"),
            Some("dualfarm_sensor_data.csv".to_string())
        );
        assert_eq!(
            parse_attachment_file_name("attachment; filename=\"week.csv\""),
            Some("week.csv".to_string())
        );
        assert_eq!(parse_attachment_file_name("inline"), None);
    }

    #[test]
    fn attachment_name_cannot_escape_export_dir() {
        assert_eq!(
            parse_attachment_file_name("attachment; filename=../../etc/passwd"),
            Some("passwd".to_string())
        );
    }

    #[tokio::test]
    /// An unreachable rig is a transport error, not a panic.
    async fn unreachable_rig_reports_transport_error() {
        let client = ApiClient::new(Environment::Custom {
            api_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap();
        let err = client.simulator_status().await.unwrap_err();
        assert!(err.is_transport());
    }
}
