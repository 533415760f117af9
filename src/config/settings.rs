use serde::Deserialize;

/// ================================
/// Auth mode selection
/// ================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Azure,
    Static,
    Command,
}

impl AuthMode {
    /// Accepted spellings: `azure`; `token-env` / `env` / `static`;
    /// `token-cmd` / `cmd` / `command`. Anything else yields `None`.
    pub fn parse(raw: &str) -> Option<AuthMode> {
        match raw.trim().to_lowercase().as_str() {
            "azure" => Some(AuthMode::Azure),
            "token-env" | "env" | "static" => Some(AuthMode::Static),
            "token-cmd" | "cmd" | "command" => Some(AuthMode::Command),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            AuthMode::Azure => "azure",
            AuthMode::Static => "static",
            AuthMode::Command => "command",
        }
    }
}

/// ================================
/// Azure identity mode
/// ================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzureIdentityMode {
    /// Managed identity, optionally pinned to a user-assigned client id.
    Managed,
    /// The SDK default credential chain.
    Default,
}

impl AzureIdentityMode {
    /// Anything other than `managed` selects the default chain.
    pub fn parse(raw: &str) -> AzureIdentityMode {
        match raw.trim().to_lowercase().as_str() {
            "managed" => AzureIdentityMode::Managed,
            _ => AzureIdentityMode::Default,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "compact" | "text" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}
