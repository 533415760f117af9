//! Token sources
//!
//! Defines the capability trait all token sources implement and the
//! environment-driven factory that selects one.

use crate::cache::token::Token;
use crate::config::env::{auth_mode, get_env, ENV_AUTH_MODE, ENV_TOKEN_VALUE};
use crate::config::settings::AuthMode;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

pub mod azure;
pub mod command;
pub mod env;

use azure::AzureTokenSource;
use command::CommandTokenSource;
use env::EnvTokenSource;

/// A strategy that produces a fresh token on demand.
///
/// Sources never cache and never validate the expiry of their own output;
/// the cached provider layered on top owns both concerns. A source either
/// returns a token with a non-empty value or an error, never a half-valid
/// token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<Token>;

    /// Stable label for logs and metrics.
    fn kind(&self) -> SourceKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Env,
    Command,
    Azure,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            SourceKind::Env => "env",
            SourceKind::Command => "command",
            SourceKind::Azure => "azure",
        }
    }
}

/// Build the source selected by the environment.
///
/// Precedence: the `azure` mode, then the env/command mode aliases, then the
/// env source as default. The default still builds when no token value is
/// configured; the warning announces that it will error on first fetch.
/// Construction errors (missing command, SDK feature disabled) surface here.
pub fn build_source_from_env() -> Result<Box<dyn TokenSource>> {
    match auth_mode() {
        Some(AuthMode::Azure) => {
            let source = AzureTokenSource::from_env()?;
            info!("token source selected: azure");
            Ok(Box::new(source))
        }
        Some(AuthMode::Command) => {
            let source = CommandTokenSource::from_env()?;
            info!("token source selected: command");
            Ok(Box::new(source))
        }
        Some(AuthMode::Static) => {
            info!("token source selected: env");
            Ok(Box::new(EnvTokenSource::new()))
        }
        None => {
            if get_env(ENV_TOKEN_VALUE).is_none() {
                warn!(
                    "{} is unset and {} is not configured; falling back to the env token source, which will error until a token is provided",
                    ENV_AUTH_MODE, ENV_TOKEN_VALUE
                );
            }
            info!("token source selected: env (default)");
            Ok(Box::new(EnvTokenSource::new()))
        }
    }
}

/// Kind the environment-driven selection currently resolves to, without
/// building a source. Unrecognized and unset modes resolve to the env
/// source, matching [`build_source_from_env`].
pub fn selected_kind_from_env() -> SourceKind {
    match auth_mode() {
        Some(AuthMode::Azure) => SourceKind::Azure,
        Some(AuthMode::Command) => SourceKind::Command,
        Some(AuthMode::Static) | None => SourceKind::Env,
    }
}
