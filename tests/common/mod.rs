//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use pageroute::{HttpServer, Router, ServerConfig};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Start a server for `router` on an ephemeral loopback port.
///
/// Returns the bound address and a handle on the served router.
#[allow(dead_code)]
pub async fn start_server(router: Router, config: ServerConfig) -> (SocketAddr, Arc<Router>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(router, config);
    let handle = server.router();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, handle)
}

/// Drive one request through the service without a socket.
#[allow(dead_code)]
pub async fn send(server: &HttpServer, request: Request<Body>) -> (Response<Body>, String) {
    let response = server.app().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (
        Response::from_parts(parts, Body::empty()),
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
