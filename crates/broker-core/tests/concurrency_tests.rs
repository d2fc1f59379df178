use std::sync::Arc;

use broker_core::{
    AuthorizationConfig, ConnectionConfig, FileSessionStore, PathResolver, SafeSessionStore,
    SessionStore,
};
use tempfile::TempDir;

const ROUNDS: usize = 20;

/// Interleaved connection and authorization updates through one store
/// instance must not lose each other's fields.
async fn assert_updates_do_not_interfere(store: Arc<dyn SessionStore>) {
    store
        .set_connection_config(
            "TRIAL",
            &ConnectionConfig::new().with_service_url("https://sys").with_token("t0"),
        )
        .await
        .unwrap();

    let connection = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..ROUNDS {
                store
                    .set_connection_config("TRIAL", &ConnectionConfig::new().with_token(format!("t{i}")))
                    .await
                    .unwrap();
            }
        })
    };
    let authorization = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..ROUNDS {
                store
                    .set_authorization_config(
                        "TRIAL",
                        &AuthorizationConfig::new("https://uaa", "client", "secret")
                            .with_refresh_token(format!("r{i}")),
                    )
                    .await
                    .unwrap();
            }
        })
    };
    connection.await.unwrap();
    authorization.await.unwrap();

    let session = store.load_session("TRIAL").await.unwrap().unwrap();
    let last = ROUNDS - 1;
    assert_eq!(session.service_url.as_deref(), Some("https://sys"));
    assert_eq!(session.jwt_token, Some(format!("t{last}")));
    assert_eq!(session.refresh_token, Some(format!("r{last}")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_serializes_updates_per_destination() {
    let temp = TempDir::new().unwrap();
    let resolver = PathResolver::from_sources([temp.path()], None, temp.path());
    assert_updates_do_not_interfere(Arc::new(FileSessionStore::abap(resolver))).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_safe_store_serializes_updates_per_destination() {
    assert_updates_do_not_interfere(Arc::new(SafeSessionStore::abap())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_destinations_update_independently() {
    let temp = TempDir::new().unwrap();
    let resolver = PathResolver::from_sources([temp.path()], None, temp.path());
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::btp(resolver));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .set_connection_config(
                        &format!("DEST{i}"),
                        &ConnectionConfig::new().with_token(format!("token-{i}")),
                    )
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..8 {
        let view = store
            .get_connection_config(&format!("DEST{i}"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.authorization_token, Some(format!("token-{i}")));
    }
    assert_eq!(store.list_destinations().await.unwrap().len(), 8);
}
