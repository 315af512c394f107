//! Helpers shared by unit tests that need a real HTTP peer.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral localhost port for the rest of the test.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
