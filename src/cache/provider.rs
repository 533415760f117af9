use crate::cache::token::Token;
use crate::observability::metrics::get_metrics;
use crate::sources::TokenSource;
use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Serves tokens from a cache slot, calling through to the wrapped source
/// only when the slot is empty or the token has entered its skew window.
///
/// Refreshes are serialized by a dedicated mutex: any number of callers
/// racing into the same expiry produce exactly one source call, and every
/// waiter observes that single refreshed token. A failed refresh leaves the
/// slot untouched, so the next caller retries the source.
pub struct CachedTokenProvider {
    source: Box<dyn TokenSource>,
    skew_seconds: u64,
    cached: RwLock<Option<Token>>,
    refresh_lock: Mutex<()>,
}

impl CachedTokenProvider {
    pub fn new(source: Box<dyn TokenSource>, skew_seconds: u64) -> Self {
        Self {
            source,
            skew_seconds,
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn skew_seconds(&self) -> u64 {
        self.skew_seconds
    }

    /// Return the cached token, refreshing it first when missing or inside
    /// the skew window.
    pub async fn get_token(&self) -> Result<Token> {
        let kind = self.source.kind();
        let metrics = get_metrics().await;

        // Fast path: a valid cached token is served under the read lock only,
        // never touching the refresh mutex.
        if let Some(token) = self.read_valid().await {
            metrics.cache_hits.with_label_values(&[kind.as_str()]).inc();
            debug!(source = kind.as_str(), "using cached database token");
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Re-check: another caller may have refreshed while this one waited
        // on the mutex.
        if let Some(token) = self.read_valid().await {
            metrics.cache_hits.with_label_values(&[kind.as_str()]).inc();
            debug!(source = kind.as_str(), "token already refreshed by a concurrent caller");
            return Ok(token);
        }

        metrics.refresh_attempts.with_label_values(&[kind.as_str()]).inc();
        let started = tokio::time::Instant::now();
        match self.source.fetch_token().await {
            Ok(token) => {
                metrics.refresh_duration.with_label_values(&[kind.as_str()]).observe(started.elapsed().as_secs_f64());
                match token.expires_at {
                    Some(expires_at) => metrics.token_expiry_unix.with_label_values(&[kind.as_str()]).set(expires_at.timestamp()),
                    // 0 marks a never-expiring token
                    None => metrics.token_expiry_unix.with_label_values(&[kind.as_str()]).set(0),
                }
                info!(source = kind.as_str(), expires_at = ?token.expires_at, "database token refreshed");

                let mut slot = self.cached.write().await;
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(err) => {
                metrics.refresh_duration.with_label_values(&[kind.as_str()]).observe(started.elapsed().as_secs_f64());
                metrics.refresh_failures.with_label_values(&[kind.as_str()]).inc();
                // the slot keeps its previous value; the next caller retries
                Err(err)
            }
        }
    }

    /// Convenience projection for connection builders.
    pub async fn get_token_value(&self) -> Result<String> {
        Ok(self.get_token().await?.value)
    }

    async fn read_valid(&self) -> Option<Token> {
        let slot = self.cached.read().await;
        slot.as_ref()
            .filter(|token| !token.is_expired(self.skew_seconds))
            .cloned()
    }
}
