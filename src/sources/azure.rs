use crate::cache::token::Token;
use crate::config::env::{azure_mode, azure_scope, get_env, ttl_seconds, ENV_AZURE_CLIENT_ID};
use crate::sources::{SourceKind, TokenSource};
use crate::utils::time::expiry_from_ttl;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use tracing::{debug, warn};

/// Minimal view of an Azure credential: a scope in, a token plus its
/// epoch-seconds expiry out. The SDK-backed implementation lives behind the
/// `azure` feature; tests and embedders with their own wiring supply fakes.
#[async_trait]
pub trait AzureCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AzureAccessToken>;
}

/// Raw credential response before translation into a [`Token`].
#[derive(Debug, Clone)]
pub struct AzureAccessToken {
    pub token: String,
    pub expires_on: i64,
}

/// Acquires tokens from Azure AD for one OAuth scope.
///
/// One credential object is created at construction and reused across
/// fetches; the SDK refreshes its own transport state internally.
pub struct AzureTokenSource {
    scope: String,
    credential: Box<dyn AzureCredential>,
}

impl AzureTokenSource {
    /// Build from the `PG_TOKEN_AZURE_*` variables.
    ///
    /// Fails immediately when the crate was built without the `azure`
    /// feature: this auth mode requires the identity SDK dependency.
    pub fn from_env() -> Result<Self> {
        let credential = sdk::build_credential(azure_mode(), get_env(ENV_AZURE_CLIENT_ID))?;
        Ok(Self::with_credential(azure_scope(), credential))
    }

    pub fn with_credential(scope: String, credential: Box<dyn AzureCredential>) -> Self {
        Self { scope, credential }
    }
}

// The boxed credential has no useful Debug form; the scope is the
// interesting part.
impl std::fmt::Debug for AzureTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTokenSource")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for AzureTokenSource {
    async fn fetch_token(&self) -> Result<Token> {
        let access = self
            .credential
            .get_token(&self.scope)
            .await
            .context("failed to obtain Azure AD token")?;

        if access.token.is_empty() {
            return Err(anyhow!("Azure credential returned an empty token"));
        }

        let mut expires_at = match DateTime::from_timestamp(access.expires_on, 0) {
            Some(expires_at) => Some(expires_at),
            None => {
                warn!(
                    "Azure token expires_on {} is out of range, ignoring it",
                    access.expires_on
                );
                None
            }
        };
        if expires_at.is_none() {
            expires_at = ttl_seconds().and_then(expiry_from_ttl);
        }

        debug!(scope = %self.scope, "azure token acquired");
        Ok(Token::new(access.token, expires_at))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Azure
    }
}

#[cfg(feature = "azure")]
mod sdk {
    use super::{AzureAccessToken, AzureCredential};
    use crate::config::settings::AzureIdentityMode;
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use azure_core::credentials::TokenCredential;
    use azure_identity::{
        DefaultAzureCredential, ManagedIdentityCredential, ManagedIdentityCredentialOptions,
        UserAssignedId,
    };
    use std::sync::Arc;

    struct SdkCredential {
        inner: Arc<dyn TokenCredential>,
    }

    #[async_trait]
    impl AzureCredential for SdkCredential {
        async fn get_token(&self, scope: &str) -> Result<AzureAccessToken> {
            let access = self.inner.get_token(&[scope], None).await?;
            Ok(AzureAccessToken {
                token: access.token.secret().to_string(),
                expires_on: access.expires_on.unix_timestamp(),
            })
        }
    }

    pub(super) fn build_credential(
        mode: AzureIdentityMode,
        client_id: Option<String>,
    ) -> Result<Box<dyn AzureCredential>> {
        let inner: Arc<dyn TokenCredential> = match mode {
            AzureIdentityMode::Managed => {
                let mut options = ManagedIdentityCredentialOptions::default();
                options.user_assigned_id = client_id.map(UserAssignedId::ClientId);
                ManagedIdentityCredential::new(Some(options))
                    .context("failed to build the Azure managed identity credential")?
            }
            AzureIdentityMode::Default => DefaultAzureCredential::new()
                .context("failed to build the Azure default credential chain")?,
        };
        Ok(Box::new(SdkCredential { inner }))
    }
}

#[cfg(not(feature = "azure"))]
mod sdk {
    use super::AzureCredential;
    use crate::config::settings::AzureIdentityMode;
    use anyhow::{bail, Result};

    pub(super) fn build_credential(
        _mode: AzureIdentityMode,
        _client_id: Option<String>,
    ) -> Result<Box<dyn AzureCredential>> {
        bail!(
            "the azure auth mode requires the identity SDK; rebuild with `--features azure` to enable it"
        )
    }
}
