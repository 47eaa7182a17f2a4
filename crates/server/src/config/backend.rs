use secrecy::SecretString;
use serde::Deserialize;

/// Environment variable consulted for the Supabase anon key before the
/// config file value.
pub const ANON_KEY_ENV: &str = "NDADESK_SUPABASE_ANON_KEY";

/// Storage and auth backend configuration.
///
/// # Example
///
/// ```toml
/// [backend]
/// kind = "supabase"
/// url = "https://abcd.supabase.co"
/// anon_key = "eyJ..."
/// table = "ndas"
/// timeout_seconds = 10
/// ```
///
/// The memory backend seeds its accounts from `[[backend.users]]`:
///
/// ```toml
/// [backend]
/// kind = "memory"
///
/// [[backend.users]]
/// email = "admin@example.com"
/// password = "change-me"
/// ```
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Backend kind: `"memory"` or `"supabase"`.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Supabase project URL.
    pub url: Option<String>,
    /// Supabase anon (publishable) key.
    pub anon_key: Option<SecretString>,
    /// Table holding the NDA rows.
    #[serde(default = "default_table")]
    pub table: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Accounts for the memory backend.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            url: None,
            anon_key: None,
            table: default_table(),
            timeout_seconds: default_timeout(),
            users: Vec::new(),
        }
    }
}

/// A memory-backend account.
#[derive(Debug, Deserialize)]
pub struct UserConfig {
    pub email: String,
    pub password: SecretString,
}

fn default_kind() -> String {
    "memory".to_owned()
}

fn default_table() -> String {
    "ndas".to_owned()
}

fn default_timeout() -> u64 {
    10
}
