// Drives the process-wide selector end to end: environment-driven source
// selection, the override hooks, and recovery after a configuration fix.
// Everything here mutates process environment, hence #[serial] throughout.

#[cfg(test)]
mod test {

    use crate::config::env::{
        ENV_AUTH_MODE, ENV_TOKEN_CMD, ENV_TOKEN_SKEW_SECONDS, ENV_TOKEN_VALUE,
    };
    use crate::selector::{clear_token_provider, get_token, get_token_value, set_token_provider};
    use crate::sources::{selected_kind_from_env, SourceKind};
    use crate::tests::common::{reset_token_env, CountingSource, StaticSource};
    use serial_test::serial;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    #[serial]
    async fn default_selection_reads_the_env_token() {
        reset_token_env();
        std::env::set_var(ENV_TOKEN_VALUE, "abc");

        assert_eq!(get_token_value().await.unwrap(), "abc");
        reset_token_env();
    }

    #[tokio::test]
    #[serial]
    async fn explicit_command_mode_runs_the_command() {
        reset_token_env();
        std::env::set_var(ENV_AUTH_MODE, "token-cmd");
        std::env::set_var(ENV_TOKEN_CMD, "printf cmd-tok");

        assert_eq!(get_token_value().await.unwrap(), "cmd-tok");
        reset_token_env();
    }

    #[tokio::test]
    #[serial]
    async fn unrecognized_mode_falls_back_to_the_env_source() {
        reset_token_env();
        std::env::set_var(ENV_AUTH_MODE, "kerberos");
        std::env::set_var(ENV_TOKEN_VALUE, "fallback");

        assert_eq!(get_token_value().await.unwrap(), "fallback");
        reset_token_env();
    }

    #[tokio::test]
    #[serial]
    async fn missing_configuration_fails_then_recovers() {
        reset_token_env();

        let err = get_token().await.unwrap_err();
        assert!(format!("{:#}", err).contains(ENV_TOKEN_VALUE));
        // no token was cached by the failure, so the call keeps failing
        assert!(get_token().await.is_err());

        // the env source re-reads the environment on every fetch, so fixing
        // the variable recovers without touching the provider
        std::env::set_var(ENV_TOKEN_VALUE, "late-config");
        assert_eq!(get_token_value().await.unwrap(), "late-config");
        reset_token_env();
    }

    #[tokio::test]
    #[serial]
    async fn override_hook_bypasses_env_selection() {
        reset_token_env();
        std::env::set_var(ENV_TOKEN_VALUE, "from-env");

        set_token_provider(Box::new(StaticSource::new("override")), None);
        assert_eq!(get_token_value().await.unwrap(), "override");

        clear_token_provider();
        assert_eq!(get_token_value().await.unwrap(), "from-env");
        reset_token_env();
    }

    #[tokio::test]
    #[serial]
    async fn override_without_skew_reads_the_env_skew() {
        reset_token_env();
        std::env::set_var(ENV_TOKEN_SKEW_SECONDS, "3600");

        // 120s tokens sit inside a 3600s skew window, so every call refreshes
        let source = CountingSource::new(120);
        let calls = source.calls.clone();
        set_token_provider(Box::new(source), None);
        get_token().await.unwrap();
        get_token().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // an explicit skew wins over the environment
        let source = CountingSource::new(120);
        let calls = source.calls.clone();
        set_token_provider(Box::new(source), Some(60));
        get_token().await.unwrap();
        get_token().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        reset_token_env();
    }

    #[test]
    #[serial]
    fn reported_kind_tracks_the_resolved_selection() {
        reset_token_env();
        assert_eq!(selected_kind_from_env(), SourceKind::Env);

        std::env::set_var(ENV_AUTH_MODE, "kerberos");
        assert_eq!(selected_kind_from_env(), SourceKind::Env);

        std::env::set_var(ENV_AUTH_MODE, "token-cmd");
        assert_eq!(selected_kind_from_env(), SourceKind::Command);

        std::env::set_var(ENV_AUTH_MODE, "azure");
        assert_eq!(selected_kind_from_env(), SourceKind::Azure);
        reset_token_env();
    }

    #[cfg(not(feature = "azure"))]
    #[tokio::test]
    #[serial]
    async fn azure_mode_without_the_sdk_is_an_actionable_error() {
        reset_token_env();
        std::env::set_var(ENV_AUTH_MODE, "azure");

        let err = get_token().await.unwrap_err();
        assert!(format!("{:#}", err).contains("--features azure"));
        reset_token_env();
    }
}
