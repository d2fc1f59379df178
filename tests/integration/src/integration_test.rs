//! End-to-end flow across the stores
//!
//! Exercises: service key on disk -> views -> session seeded from the key ->
//! token refresh -> session reload.

use broker_core::{
    AuthType, ConnectionConfig, FileSessionStore, JsonServiceKeyStore, SafeSessionStore,
    ServiceKeyStore, Session, SessionStore,
};
use broker_test_utils::TestDir;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/service-keys")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {e}", path.display()))
}

/// A credential directory holding every fixture key.
fn setup_keys() -> TestDir {
    let dir = TestDir::new();
    dir.write("TRIAL.json", &fixture("abap-trial.json"));
    dir.write("MCP.json", &fixture("xsuaa-banner.txt"));
    dir.write("ONPREM.json", &fixture("onprem-sap-url.json"));
    dir
}

#[tokio::test]
async fn test_fixture_keys_parse() {
    let dir = setup_keys();
    let keys = JsonServiceKeyStore::new(dir.resolver());

    assert_eq!(keys.list_destinations().await.unwrap(), vec!["MCP", "ONPREM", "TRIAL"]);

    let trial = keys.get_connection_config("TRIAL").await.unwrap().unwrap();
    assert_eq!(trial.service_url.as_deref(), Some("https://abc123.abap.eu10.hana.ondemand.com"));

    let mcp = keys.get_service_key("MCP").await.unwrap().unwrap();
    assert_eq!(mcp.connection, None);
    assert_eq!(
        mcp.authorization.unwrap().uaa_url,
        "https://mcp-tenant.authentication.us10.hana.ondemand.com"
    );

    let onprem = keys.get_connection_config("ONPREM").await.unwrap().unwrap();
    assert_eq!(onprem.service_url.as_deref(), Some("https://s4.corp.example:44300"));
    assert_eq!(onprem.sap_client.as_deref(), Some("200"));
    assert_eq!(onprem.language.as_deref(), Some("DE"));
}

#[tokio::test]
async fn test_session_seeded_from_service_key() {
    let dir = setup_keys();
    let keys = JsonServiceKeyStore::new(dir.resolver());
    let sessions = FileSessionStore::abap(dir.resolver());

    let credentials = keys.get_service_key("TRIAL").await.unwrap().unwrap();
    sessions
        .set_connection_config("TRIAL", credentials.connection.as_ref().unwrap())
        .await
        .unwrap();
    sessions
        .set_authorization_config("TRIAL", credentials.authorization.as_ref().unwrap())
        .await
        .unwrap();

    // Token refresh writes only what changed
    sessions
        .set_connection_config("TRIAL", &ConnectionConfig::new().with_token("eyJhbGciOi.access"))
        .await
        .unwrap();

    let session = sessions.load_session("TRIAL").await.unwrap().unwrap();
    assert_eq!(
        session.service_url.as_deref(),
        Some("https://abc123.abap.eu10.hana.ondemand.com")
    );
    assert_eq!(session.jwt_token.as_deref(), Some("eyJhbGciOi.access"));
    assert_eq!(session.auth_type, Some(AuthType::Jwt));
    assert_eq!(
        session.uaa_url.as_deref(),
        Some("https://trial-tenant.authentication.eu10.hana.ondemand.com")
    );

    // The service key itself is never touched
    assert_eq!(dir.read("TRIAL.json"), fixture("abap-trial.json"));
}

#[tokio::test]
async fn test_file_and_safe_stores_agree() {
    let dir = TestDir::new();
    let file = FileSessionStore::abap(dir.resolver());
    let safe = SafeSessionStore::abap();

    let updates = [
        ConnectionConfig::new()
            .with_service_url("https://sys")
            .with_basic_auth("dev", "pw")
            .with_sap_client("100"),
        ConnectionConfig::new().with_session_cookies("MYSAPSSO2=abc; path=/"),
        ConnectionConfig::new().with_token("jwt").with_language("EN"),
    ];

    for update in &updates {
        file.set_connection_config("TRIAL", update).await.unwrap();
        safe.set_connection_config("TRIAL", update).await.unwrap();

        let from_file = file.load_session("TRIAL").await.unwrap();
        let from_memory = safe.load_session("TRIAL").await.unwrap();
        assert_eq!(from_file, from_memory);
    }

    let expected = Session {
        service_url: Some("https://sys".into()),
        jwt_token: Some("jwt".into()),
        auth_type: Some(AuthType::Jwt),
        sap_client: Some("100".into()),
        language: Some("EN".into()),
        ..Session::default()
    };
    assert_eq!(file.load_session("TRIAL").await.unwrap(), Some(expected));
}

#[tokio::test]
async fn test_xsuaa_example_key_end_to_end() {
    let dir = TestDir::new();
    dir.write(
        "X.json",
        r#"{"url":"https://x.authentication.test","clientid":"c","clientsecret":"s","abap":{"url":"https://x.abap.test","client":"001"}}"#,
    );
    let keys = JsonServiceKeyStore::new(dir.resolver());

    let connection = keys.get_connection_config("X").await.unwrap().unwrap();
    assert_eq!(connection.service_url.as_deref(), Some("https://x.abap.test"));
    assert_eq!(connection.sap_client.as_deref(), Some("001"));

    let authorization = keys.get_authorization_config("X").await.unwrap().unwrap();
    assert_eq!(authorization.uaa_url, "https://x.authentication.test");
}
