//! Scenario-based Integration Tests
//!
//! Production scenarios for a broker process: locating credential
//! directories, reading provisioned keys, keeping sessions current and
//! surviving interrupted writes.

use broker_content::{EnvCodec, EnvFile, SaveMode};
use broker_core::{
    AuthType, AuthorizationConfig, ConnectionConfig, ErrorKind, FileSessionStore,
    JsonServiceKeyStore, SafeSessionStore, ServiceKeyStore, SessionPolicy, SessionStore,
};
use broker_fs::{NormalizedPath, PathResolver};
use broker_test_utils::{TestDir, init_tracing, payloads};

// =============================================================================
// Scenario 1: Directory discovery
// =============================================================================

mod s1_discovery {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S1.1: Explicit directories outrank the override variable
    #[test]
    fn s1_1_explicit_before_override() {
        let dir = TestDir::new();
        let explicit = dir.subdir("explicit");
        let override_value = format!(
            "{}{}{}",
            dir.path("env-a").display(),
            if cfg!(windows) { ";" } else { ":" },
            dir.path("env-b").display()
        );

        let resolver =
            PathResolver::from_sources([&explicit], Some(override_value.as_str()), dir.root());
        let dirs = resolver.search_dirs();

        assert_eq!(dirs.len(), 3);
        assert_eq!(dirs[0], NormalizedPath::new(&explicit));
        assert!(dirs[1].as_str().ends_with("/env-a"));
        assert!(dirs[2].as_str().ends_with("/env-b"));
    }

    /// S1.2: The cwd is searched only when nothing else is configured
    #[test]
    fn s1_2_cwd_fallback() {
        let dir = TestDir::new();
        let none: [&str; 0] = [];

        let resolver = PathResolver::from_sources(none, None, dir.root());
        assert_eq!(resolver.search_dirs(), &[NormalizedPath::new(dir.root())]);
    }

    /// S1.3: A key in a lower-priority directory is found
    #[tokio::test]
    async fn s1_3_lookup_falls_through() {
        let dir = TestDir::new();
        dir.write_service_key_in("shared", "TRIAL", &payloads::abap_service_key());
        let store = JsonServiceKeyStore::new(dir.resolver_for(&["personal", "shared"]));

        assert!(store.load_service_key("TRIAL").await.unwrap().is_some());
    }
}

// =============================================================================
// Scenario 2: Provisioned service keys
// =============================================================================

mod s2_service_keys {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S2.1: A key pasted straight from CLI output is usable
    #[tokio::test]
    async fn s2_1_cli_output_is_salvaged() {
        let dir = TestDir::new();
        dir.write(
            "TRIAL.json",
            &payloads::with_banner(&payloads::wrapped(payloads::xsuaa_service_key())),
        );
        let store = JsonServiceKeyStore::new(dir.resolver());

        let connection = store.get_connection_config("TRIAL").await.unwrap().unwrap();
        assert_eq!(connection.service_url.as_deref(), Some("https://x.abap.test"));
    }

    /// S2.2: A truncated key is an error, never silently absent
    #[tokio::test]
    async fn s2_2_truncated_key_is_error() {
        let dir = TestDir::new();
        dir.write("TRIAL.json", "{\"uaa\": {\"url\": \"https://uaa\"");
        let store = JsonServiceKeyStore::new(dir.resolver());

        let err = store.get_service_key("TRIAL").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}

// =============================================================================
// Scenario 3: Session lifecycle
// =============================================================================

mod s3_sessions {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S3.1: absent -> created -> updated -> deleted -> absent
    #[tokio::test]
    async fn s3_1_full_lifecycle() {
        init_tracing();
        let dir = TestDir::new();
        let store = FileSessionStore::abap(dir.resolver());

        assert_eq!(store.load_session("TRIAL").await.unwrap(), None);

        store
            .set_connection_config(
                "TRIAL",
                &ConnectionConfig::new()
                    .with_service_url(payloads::ABAP_URL)
                    .with_token("t1"),
            )
            .await
            .unwrap();
        dir.assert_file_exists("TRIAL.env");

        store
            .set_authorization_config(
                "TRIAL",
                &AuthorizationConfig::new(payloads::UAA_URL, "client", "secret")
                    .with_refresh_token("r1"),
            )
            .await
            .unwrap();
        let session = store.load_session("TRIAL").await.unwrap().unwrap();
        assert_eq!(session.jwt_token.as_deref(), Some("t1"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));

        assert!(store.delete_session("TRIAL").await.unwrap());
        dir.assert_file_not_exists("TRIAL.env");
        assert_eq!(store.load_session("TRIAL").await.unwrap(), None);
        assert!(!store.delete_session("TRIAL").await.unwrap());
    }

    /// S3.2: A browser login replaces a bearer token with cookies
    #[tokio::test]
    async fn s3_2_saml_login_after_jwt() {
        let dir = TestDir::new();
        let store = FileSessionStore::abap(dir.resolver());

        store
            .set_connection_config(
                "TRIAL",
                &ConnectionConfig::new().with_service_url("https://sys").with_token("jwt"),
            )
            .await
            .unwrap();
        store
            .set_connection_config("TRIAL", &ConnectionConfig::new().with_session_cookies("X"))
            .await
            .unwrap();

        let reopened = FileSessionStore::abap(dir.resolver());
        let view = reopened.get_connection_config("TRIAL").await.unwrap().unwrap();
        assert_eq!(view.auth_type, Some(AuthType::Saml));
        assert_eq!(view.authorization_token.as_deref(), Some(""));
        assert_eq!(view.username, None);
        assert_eq!(view.password, None);
    }

    /// S3.3: ABAP sessions need a system URL, BTP sessions do not
    #[tokio::test]
    async fn s3_3_service_url_requirement_by_kind() {
        let abap = SafeSessionStore::abap();
        let err = abap
            .set_connection_config("TRIAL", &ConnectionConfig::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("serviceUrl is required"));

        let btp = SafeSessionStore::btp();
        btp.set_connection_config("TRIAL", &ConnectionConfig::new())
            .await
            .unwrap();
    }

    /// S3.4: A configured default URL lets token-only callers create sessions
    #[tokio::test]
    async fn s3_4_default_service_url() {
        let store = SafeSessionStore::with_policy(
            SessionPolicy::abap().with_default_service_url(payloads::ABAP_URL),
        );
        store
            .set_connection_config("TRIAL", &ConnectionConfig::new().with_token("t"))
            .await
            .unwrap();

        let view = store.get_connection_config("TRIAL").await.unwrap().unwrap();
        assert_eq!(view.service_url.as_deref(), Some(payloads::ABAP_URL));
    }
}

// =============================================================================
// Scenario 4: Crash consistency
// =============================================================================

mod s4_persistence {
    use super::*;
    use pretty_assertions::assert_eq;

    /// S4.1: A write interrupted before its rename leaves the old file intact
    #[tokio::test]
    async fn s4_1_interrupted_write_keeps_previous_content() {
        let dir = TestDir::new();
        dir.write_session("TRIAL", &[("SAP_URL", "https://sys"), ("SAP_JWT_TOKEN", "old")]);
        // Temp file left behind by a writer killed mid-write
        dir.write("TRIAL.env.tmp", "SAP_URL=https://sys\nSAP_JWT_TO");
        let store = FileSessionStore::abap(dir.resolver());

        let view = store.get_connection_config("TRIAL").await.unwrap().unwrap();
        assert_eq!(view.authorization_token.as_deref(), Some("old"));

        store
            .set_connection_config("TRIAL", &ConnectionConfig::new().with_token("new"))
            .await
            .unwrap();
        assert!(dir.temp_files().is_empty(), "{:?}", dir.temp_files());
        assert_eq!(dir.env_value("TRIAL.env", "SAP_JWT_TOKEN").as_deref(), Some("new"));
    }

    /// S4.2: Keys written by other tools survive broker saves
    #[test]
    fn s4_2_codec_preserves_foreign_keys() {
        let dir = TestDir::new();
        dir.write_session("TRIAL", &[("NODE_TLS_REJECT_UNAUTHORIZED", "0")]);
        let path = NormalizedPath::new(dir.path("TRIAL.env"));

        let values: EnvFile = [("SAP_URL", "https://sys")].into_iter().collect();
        EnvCodec::new()
            .save(&path, &values, &[], SaveMode::PreserveExisting)
            .unwrap();

        assert_eq!(
            dir.read("TRIAL.env"),
            "NODE_TLS_REJECT_UNAUTHORIZED=0\nSAP_URL=https://sys\n"
        );
    }
}
