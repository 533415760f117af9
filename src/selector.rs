//! Process-wide provider selection.
//!
//! One cached provider serves the whole process. It is built lazily from the
//! environment on first use and can be replaced or dropped through the
//! override hooks, which exist for embedding applications and tests.

use crate::cache::provider::CachedTokenProvider;
use crate::cache::token::Token;
use crate::config::env::skew_seconds;
use crate::sources::{build_source_from_env, TokenSource};
use anyhow::Result;
use std::sync::{Arc, RwLock};
use tracing::info;

lazy_static::lazy_static! {
    static ref TOKEN_PROVIDER: RwLock<Option<Arc<CachedTokenProvider>>> = RwLock::new(None);
}

/// Fetch the current database token through the process-wide provider,
/// building the provider from the environment on first use. Selection
/// errors (a missing command string, the SDK feature being disabled)
/// surface here rather than at startup.
pub async fn get_token() -> Result<Token> {
    let provider = current_or_build()?;
    provider.get_token().await
}

/// Convenience unwrap of [`get_token`] for connection builders.
pub async fn get_token_value() -> Result<String> {
    Ok(get_token().await?.value)
}

/// Replace the process-wide provider with one wrapping the given source,
/// bypassing environment-driven selection until [`clear_token_provider`].
/// A `None` skew resolves from `PG_TOKEN_SKEW_SECONDS`, the same way
/// environment-driven selection does.
///
/// Not synchronized against in-flight [`get_token`] calls: override and
/// clear belong to bootstrap and test setup, before concurrent traffic
/// starts.
pub fn set_token_provider(source: Box<dyn TokenSource>, skew_seconds: Option<u64>) {
    let skew = skew_seconds.unwrap_or_else(crate::config::env::skew_seconds);
    let provider = Arc::new(CachedTokenProvider::new(source, skew));
    let mut holder = TOKEN_PROVIDER.write().unwrap_or_else(|e| e.into_inner());
    *holder = Some(provider);
    info!("token provider overridden");
}

/// Drop the process-wide provider; the next [`get_token`] call rebuilds it
/// from the environment.
pub fn clear_token_provider() {
    let mut holder = TOKEN_PROVIDER.write().unwrap_or_else(|e| e.into_inner());
    if holder.take().is_some() {
        info!("token provider cleared");
    }
}

fn current_or_build() -> Result<Arc<CachedTokenProvider>> {
    if let Some(provider) = TOKEN_PROVIDER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
    {
        return Ok(provider.clone());
    }

    let mut holder = TOKEN_PROVIDER.write().unwrap_or_else(|e| e.into_inner());
    // a concurrent first caller may have built it while this one waited
    if let Some(provider) = holder.as_ref() {
        return Ok(provider.clone());
    }

    let source = build_source_from_env()?;
    let provider = Arc::new(CachedTokenProvider::new(source, skew_seconds()));
    *holder = Some(provider.clone());
    Ok(provider)
}
