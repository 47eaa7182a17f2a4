mod backend;
mod server;
mod telemetry;


pub use backend::*;
pub use server::*;
pub use telemetry::*;

use serde::Deserialize;

/// Top-level configuration for the NdaDesk server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct NdaDeskConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage and auth backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
