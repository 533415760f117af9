use crate::selector;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::ConnectOptions;
use tracing::debug;

/// Resolve the password for one Postgres connection attempt.
///
/// The value is only as fresh as this call. Pool layers must resolve it per
/// physical (re)connect and never store it across attempts: caching is the
/// cached provider's job, and a stored password outlives token expiry.
pub async fn connection_password() -> Result<String> {
    selector::get_token_value()
        .await
        .context("could not obtain a database token for this connection attempt")
}

/// Clone `base` with the current token injected as the password.
///
/// The result is for a single connection attempt; TLS settings, hosts and
/// every other argument stay whatever the caller put in `base`.
pub async fn pg_connect_options(base: &PgConnectOptions) -> Result<PgConnectOptions> {
    let password = connection_password().await?;
    Ok(base.clone().password(&password))
}

/// Open one connection with per-attempt credentials.
pub async fn pg_connect(base: &PgConnectOptions) -> Result<PgConnection> {
    let options = pg_connect_options(base).await?;
    debug!("connecting to postgres with a freshly resolved token");
    let connection = options
        .connect()
        .await
        .context("postgres connection attempt failed")?;
    Ok(connection)
}
