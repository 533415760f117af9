use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use pg_token_agent::config::settings::LogFormat;
use pg_token_agent::selector;
use pg_token_agent::sources::selected_kind_from_env;
use pg_token_agent::utils::logging;
use pg_token_agent::utils::logging::LogLevel;
use serde::Serialize;
use tracing::info;

/// Resolve one database auth token from the configured source and report
/// what a connection attempt would see. For validating PG_TOKEN_*
/// configuration before wiring a service.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print the report as JSON instead of plain text.
    #[arg(long)]
    json: bool,
    /// Include the token value itself in the report.
    #[arg(long)]
    reveal: bool,
}

#[derive(Serialize)]
struct TokenReport {
    source: String,
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    // -------------------------------

    let args = Args::parse();
    logging::init_logging(args.log_level, LogFormat::from_env());

    // -------------------------------
    // 2. Resolve one token through the process-wide provider
    // -------------------------------

    let token = selector::get_token().await?;
    info!("token resolved");

    // -------------------------------
    // 3. Report
    // -------------------------------

    let report = TokenReport {
        source: selected_kind_from_env().as_str().to_string(),
        expires_at: token.expires_at,
        value: args.reveal.then(|| token.value),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("source:     {}", report.source);
        match report.expires_at {
            Some(expires_at) => println!("expires at: {}", expires_at.to_rfc3339()),
            None => println!("expires at: never"),
        }
        if let Some(value) = &report.value {
            println!("token:      {}", value);
        }
    }

    Ok(())
}
