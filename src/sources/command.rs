use crate::cache::token::Token;
use crate::config::env::{command_timeout_seconds, get_env, ttl_seconds, ENV_TOKEN_CMD};
use crate::sources::{SourceKind, TokenSource};
use crate::utils::time::{expiry_from_ttl, parse_expiry};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

/// Runs an operator-supplied command and reads the token from its stdout.
///
/// The command line is split with shell quoting rules and executed directly
/// as an argument vector, never through a shell, so token material cannot be
/// injected into shell context. stdout is either a bare token string or a
/// JSON object `{"token": ..., "expires_at": ...}`.
#[derive(Debug)]
pub struct CommandTokenSource {
    cmd: String,
    timeout: std::time::Duration,
}

impl CommandTokenSource {
    pub fn new(cmd: String, timeout_seconds: u64) -> Self {
        Self {
            cmd,
            timeout: std::time::Duration::from_secs(timeout_seconds),
        }
    }

    /// Build from `PG_TOKEN_CMD` and `PG_TOKEN_CMD_TIMEOUT_SECONDS`; the
    /// command itself is required configuration.
    pub fn from_env() -> Result<Self> {
        let cmd = get_env(ENV_TOKEN_CMD).ok_or_else(|| {
            anyhow!("{} is not set; cannot use the command token source", ENV_TOKEN_CMD)
        })?;
        Ok(Self::new(cmd, command_timeout_seconds()))
    }

    async fn run(&self) -> Result<std::process::Output> {
        let argv = shell_words::split(&self.cmd)
            .map_err(|e| anyhow!("failed to split token command '{}': {}", self.cmd, e))?;
        let program = argv
            .first()
            .ok_or_else(|| anyhow!("token command is empty"))?;

        let mut command = Command::new(program);
        // kill_on_drop reaps the child when the timeout drops the future
        command.args(&argv[1..]).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| anyhow!("token command timed out after {:?}", self.timeout))?
            .with_context(|| format!("failed to run token command '{}'", program))?;

        Ok(output)
    }
}

#[async_trait]
impl TokenSource for CommandTokenSource {
    async fn fetch_token(&self) -> Result<Token> {
        let output = self.run().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = match output.status.code() {
                Some(code) => format!("exit {}", code),
                None => output.status.to_string(),
            };
            return Err(anyhow!("token command failed ({}): {}", status, stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        let (value, mut expires_at) = if stdout.starts_with('{') {
            parse_json_output(&stdout)?
        } else {
            (stdout, None)
        };

        if value.is_empty() {
            return Err(anyhow!("token command produced no token value"));
        }

        if expires_at.is_none() {
            expires_at = ttl_seconds().and_then(expiry_from_ttl);
        }

        debug!(expires_at = ?expires_at, "token acquired from command");
        Ok(Token::new(value, expires_at))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Command
    }
}

/// JSON stdout contract: `token` is a required non-empty string,
/// `expires_at` an optional timestamp string. Malformed JSON and a missing
/// token field are distinct failures; an unparseable expiry only warns.
fn parse_json_output(stdout: &str) -> Result<(String, Option<DateTime<Utc>>)> {
    let payload: Value = serde_json::from_str(stdout)
        .map_err(|e| anyhow!("failed to parse token command JSON output: {}", e))?;

    let value = payload["token"]
        .as_str()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("token command JSON output is missing a non-empty 'token' field"))?
        .to_string();

    let expires_at = payload["expires_at"].as_str().and_then(parse_expiry);

    Ok((value, expires_at))
}
