use crate::cache::token::Token;
use crate::config::env::{get_env, ttl_seconds, ENV_TOKEN_EXPIRES_AT, ENV_TOKEN_VALUE};
use crate::sources::{SourceKind, TokenSource};
use crate::utils::time::{expiry_from_ttl, parse_expiry};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Reads the token and its optional expiry from environment variables.
///
/// Values are re-read on every fetch, so a token rotated into the
/// environment at runtime is picked up by the next refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenSource;

impl EnvTokenSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenSource for EnvTokenSource {
    async fn fetch_token(&self) -> Result<Token> {
        let value = get_env(ENV_TOKEN_VALUE).ok_or_else(|| {
            anyhow!("{} is not set; cannot produce a database token", ENV_TOKEN_VALUE)
        })?;

        // An absolute expiry, when configured, owns the decision: a malformed
        // value downgrades to "no expiry" (warned in parse_expiry) instead of
        // falling through to the TTL.
        let expires_at = match get_env(ENV_TOKEN_EXPIRES_AT) {
            Some(raw) => parse_expiry(&raw),
            None => ttl_seconds().and_then(expiry_from_ttl),
        };

        Ok(Token::new(value, expires_at))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }
}
