// tests/common/mod.rs
use crate::cache::token::Token;
use crate::config::env::{
    ENV_AUTH_MODE, ENV_AZURE_CLIENT_ID, ENV_AZURE_MODE, ENV_AZURE_SCOPE, ENV_TOKEN_CMD,
    ENV_TOKEN_CMD_TIMEOUT_SECONDS, ENV_TOKEN_EXPIRES_AT, ENV_TOKEN_SKEW_SECONDS,
    ENV_TOKEN_TTL_SECONDS, ENV_TOKEN_VALUE,
};
use crate::sources::{SourceKind, TokenSource};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Clear every PG_TOKEN_* variable and the process-wide provider so a test
/// starts from a known state. Tests touching this must run `#[serial]`.
pub fn reset_token_env() {
    for name in [
        ENV_AUTH_MODE,
        ENV_TOKEN_VALUE,
        ENV_TOKEN_EXPIRES_AT,
        ENV_TOKEN_TTL_SECONDS,
        ENV_TOKEN_SKEW_SECONDS,
        ENV_TOKEN_CMD,
        ENV_TOKEN_CMD_TIMEOUT_SECONDS,
        ENV_AZURE_MODE,
        ENV_AZURE_CLIENT_ID,
        ENV_AZURE_SCOPE,
    ] {
        std::env::remove_var(name);
    }
    crate::selector::clear_token_provider();
}

/// Source that hands out sequentially numbered tokens (`tok-1`, `tok-2`, …)
/// and counts its fetches. Each token's lifetime comes from `ttls`: token n
/// uses the n-th entry, the last entry repeating from then on.
pub struct CountingSource {
    pub calls: Arc<AtomicUsize>,
    ttls: Vec<i64>,
    delay_ms: u64,
}

impl CountingSource {
    pub fn new(ttl_seconds: i64) -> Self {
        Self::scripted(vec![ttl_seconds])
    }

    pub fn with_delay(ttl_seconds: i64, delay_ms: u64) -> Self {
        let mut source = Self::scripted(vec![ttl_seconds]);
        source.delay_ms = delay_ms;
        source
    }

    pub fn scripted(ttls: Vec<i64>) -> Self {
        assert!(!ttls.is_empty());
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            ttls,
            delay_ms: 0,
        }
    }
}

#[async_trait]
impl TokenSource for CountingSource {
    async fn fetch_token(&self) -> Result<Token> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let ttl = self.ttls[(n - 1).min(self.ttls.len() - 1)];
        Ok(Token::new(
            format!("tok-{}", n),
            Some(Utc::now() + Duration::seconds(ttl)),
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }
}

/// Source that fails its first `fail_first` fetches, then produces numbered
/// long-lived tokens like [`CountingSource`].
pub struct FlakySource {
    pub calls: Arc<AtomicUsize>,
    fail_first: usize,
    ttl_seconds: i64,
}

impl FlakySource {
    pub fn new(fail_first: usize, ttl_seconds: i64) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_first,
            ttl_seconds,
        }
    }
}

#[async_trait]
impl TokenSource for FlakySource {
    async fn fetch_token(&self) -> Result<Token> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            return Err(anyhow!("transient token failure {}", n));
        }
        Ok(Token::new(
            format!("tok-{}", n),
            Some(Utc::now() + Duration::seconds(self.ttl_seconds)),
        ))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }
}

/// Source that always returns the same non-expiring value.
pub struct StaticSource {
    value: String,
}

impl StaticSource {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticSource {
    async fn fetch_token(&self) -> Result<Token> {
        Ok(Token::new(self.value.clone(), None))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }
}
