use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Transport for span export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    Http,
}

impl fmt::Display for OtlpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

/// `[telemetry]`: optional OTLP export of request and dashboard command
/// spans. Console logging is always on and is not configured here.
///
/// ```toml
/// [telemetry]
/// enabled = true
/// endpoint = "http://collector:4318"
/// protocol = "http"
/// sample_ratio = 0.25
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Reported as `service.name`.
    pub service_name: String,
    /// Fraction of traces kept. Values outside `0.0..=1.0` clamp to
    /// never / always.
    pub sample_ratio: f64,
    pub protocol: OtlpProtocol,
    pub timeout_seconds: u64,
    /// Extra resource attributes, e.g. `deployment.environment`.
    pub resource_attributes: BTreeMap<String, String>,
}

impl TelemetryConfig {
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_owned(),
            service_name: "ndadesk".to_owned(),
            sample_ratio: 1.0,
            protocol: OtlpProtocol::Grpc,
            timeout_seconds: 10,
            resource_attributes: BTreeMap::new(),
        }
    }
}
