use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use ndadesk_backend::NdaBackend;
use ndadesk_backend_memory::MemoryBackend;
use ndadesk_backend_supabase::SupabaseBackendBuilder;

use crate::config::{ANON_KEY_ENV, BackendConfig};
use crate::error::ServerError;

/// Create the NDA backend described by `[backend]`.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn NdaBackend>, ServerError> {
    let backend: Arc<dyn NdaBackend> = match config.kind.as_str() {
        "memory" => {
            let backend = MemoryBackend::new();
            for user in &config.users {
                backend.add_user(&user.email, user.password.expose_secret());
            }
            if config.users.is_empty() {
                tracing::warn!("memory backend has no [[backend.users]], nobody can sign in");
            }
            Arc::new(backend)
        }
        "supabase" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("supabase backend requires [backend] url".into())
            })?;
            let anon_key = std::env::var(ANON_KEY_ENV)
                .ok()
                .map(SecretString::new)
                .or_else(|| config.anon_key.clone())
                .ok_or_else(|| {
                    ServerError::Config(format!(
                        "supabase backend requires [backend] anon_key or {ANON_KEY_ENV}"
                    ))
                })?;

            let backend = SupabaseBackendBuilder::new(url, anon_key.expose_secret().as_str())
                .table(&config.table)
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .map_err(|e| ServerError::Config(format!("supabase backend: {e}")))?;
            Arc::new(backend)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown backend kind: {other} (expected \"memory\" or \"supabase\")"
            )));
        }
    };

    info!(backend = backend.name(), "backend initialized");
    Ok(backend)
}
