//! Shared test setup: a real server on an ephemeral port.

use sr_server::api::{create_router, AppState};
use sr_server::config::Config;
use sr_server::directory::RoomRegistry;

/// Spawn the full application and return its base URL.
pub async fn spawn_server() -> String {
    let config = Config {
        bind_address: "127.0.0.1:0".into(),
        token_secret: "test-secret".into(),
        token_ttl: 600,
    };
    let state = AppState::new(config, RoomRegistry::new());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{addr}")
}
