//! # Postgres Token Agent
//!
//! Supplies short-lived auth tokens for database connections: fetches them
//! from one of several sources, caches them behind a refresh-once provider
//! with an expiry safety margin, and injects them as the connection
//! password per physical connection attempt.
//!
//! Modules:
//! - `config` — environment surface and selection enums
//! - `cache` — the token value object and the cached provider
//! - `sources` — env, external-command and Azure AD token sources
//! - `selector` — process-wide provider accessor with override hooks
//! - `db` — per-attempt Postgres connect options carrying the current token

pub mod cache;
pub mod config;
pub mod db;
pub mod observability;
pub mod selector;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::cache::provider::CachedTokenProvider;
pub use crate::cache::token::Token;
pub use crate::selector::{clear_token_provider, get_token, get_token_value, set_token_provider};
pub use crate::sources::{SourceKind, TokenSource};
