//! Environment surface of the token layer.
//!
//! Every variable name lives here, next to its typed reader, so operators
//! and code agree on one canonical spelling.

use crate::config::settings::{AuthMode, AzureIdentityMode};
use tracing::warn;

/// ================================
/// Variable names
/// ================================

pub const ENV_AUTH_MODE: &str = "PG_TOKEN_AUTH_MODE";
pub const ENV_TOKEN_VALUE: &str = "PG_TOKEN_VALUE";
pub const ENV_TOKEN_EXPIRES_AT: &str = "PG_TOKEN_EXPIRES_AT";
pub const ENV_TOKEN_TTL_SECONDS: &str = "PG_TOKEN_TTL_SECONDS";
pub const ENV_TOKEN_SKEW_SECONDS: &str = "PG_TOKEN_SKEW_SECONDS";
pub const ENV_TOKEN_CMD: &str = "PG_TOKEN_CMD";
pub const ENV_TOKEN_CMD_TIMEOUT_SECONDS: &str = "PG_TOKEN_CMD_TIMEOUT_SECONDS";
pub const ENV_AZURE_MODE: &str = "PG_TOKEN_AZURE_MODE";
pub const ENV_AZURE_CLIENT_ID: &str = "PG_TOKEN_AZURE_CLIENT_ID";
pub const ENV_AZURE_SCOPE: &str = "PG_TOKEN_AZURE_SCOPE";

/// ================================
/// Defaults
/// ================================

pub const DEFAULT_SKEW_SECONDS: u64 = 60;
pub const DEFAULT_CMD_TIMEOUT_SECONDS: u64 = 10;
/// Scope for Azure Database for PostgreSQL flexible servers.
pub const DEFAULT_AZURE_SCOPE: &str = "https://ossrdbms-aad.database.windows.net/.default";

/// Read a variable, mapping unset and whitespace-only values to `None`.
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The configured auth mode, if any. Unrecognized values are reported once
/// per read and treated as unset, so selection falls back to the env source.
pub fn auth_mode() -> Option<AuthMode> {
    let raw = get_env(ENV_AUTH_MODE)?;
    let mode = AuthMode::parse(&raw);
    if mode.is_none() {
        warn!(
            "unrecognized {} value '{}', falling back to the env token source",
            ENV_AUTH_MODE, raw
        );
    }
    mode
}

pub fn skew_seconds() -> u64 {
    parse_u64(ENV_TOKEN_SKEW_SECONDS).unwrap_or(DEFAULT_SKEW_SECONDS)
}

pub fn ttl_seconds() -> Option<u64> {
    parse_u64(ENV_TOKEN_TTL_SECONDS)
}

pub fn command_timeout_seconds() -> u64 {
    parse_u64(ENV_TOKEN_CMD_TIMEOUT_SECONDS).unwrap_or(DEFAULT_CMD_TIMEOUT_SECONDS)
}

pub fn azure_mode() -> AzureIdentityMode {
    AzureIdentityMode::parse(&get_env(ENV_AZURE_MODE).unwrap_or_default())
}

pub fn azure_scope() -> String {
    get_env(ENV_AZURE_SCOPE).unwrap_or_else(|| DEFAULT_AZURE_SCOPE.to_string())
}

// Non-numeric values count as unset; callers fall back to their defaults.
fn parse_u64(name: &str) -> Option<u64> {
    get_env(name).and_then(|value| value.parse::<u64>().ok())
}
