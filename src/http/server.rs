//! HTTP server setup.
//!
//! # Responsibilities
//! - Install the dispatcher as the single handler for every path
//! - Wire up request tracing
//! - Bind the listener and serve until it stops

use std::sync::Arc;

use axum::Router as AxumRouter;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::dispatcher::{dispatch, DispatchState};
use crate::routing::Router;

/// Failure to start or keep serving.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listening address could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server serving one frozen [`Router`].
pub struct HttpServer {
    app: AxumRouter,
    router: Arc<Router>,
    config: ServerConfig,
}

impl HttpServer {
    /// Freeze `router` and build the service around it.
    ///
    /// A match policy set in the configuration overrides the router's own.
    pub fn new(mut router: Router, config: ServerConfig) -> Self {
        if let Some(policy) = config.routing.match_policy {
            router.set_policy(policy);
        }

        tracing::info!(
            routes = router.routes().len(),
            policy = ?router.policy(),
            "Router frozen"
        );

        let router = Arc::new(router);
        let state = DispatchState {
            router: router.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let app = Self::build_router(state);

        Self {
            app,
            router,
            config,
        }
    }

    fn build_router(state: DispatchState) -> AxumRouter {
        AxumRouter::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Shared handle on the served router, e.g. to swap the not-found page.
    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// The axum service, for driving requests without a socket.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Settings this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve.
    pub async fn bind_and_run(self) -> Result<(), ServeError> {
        let listener = bind_listener(&self.config.listener.bind_address).await?;
        self.run(listener).await
    }

    /// Serve connections accepted on `listener` until it stops.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve `router` on `addr` with default settings.
///
/// `addr` is `"host:port"`, or `":port"` for every interface. The bare form
/// binds the IPv6 wildcard, which also accepts IPv4 where the host allows
/// dual-stack sockets, and falls back to `0.0.0.0` otherwise.
pub async fn serve(addr: &str, router: Router) -> Result<(), ServeError> {
    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();
    HttpServer::new(router, config).bind_and_run().await
}

/// Addresses to try, in order, for a configured bind address.
pub fn bind_candidates(addr: &str) -> Vec<String> {
    let port = if addr.is_empty() {
        ":80"
    } else if addr.starts_with(':') {
        addr
    } else {
        return vec![addr.to_string()];
    };
    vec![format!("[::]{}", port), format!("0.0.0.0{}", port)]
}

/// Bind the first candidate of `addr` that succeeds.
pub async fn bind_listener(addr: &str) -> Result<TcpListener, ServeError> {
    let mut last = None;
    for candidate in bind_candidates(addr) {
        match TcpListener::bind(&candidate).await {
            Ok(listener) => return Ok(listener),
            Err(source) => {
                tracing::debug!(address = %candidate, error = %source, "Bind attempt failed");
                last = Some(ServeError::Bind {
                    address: candidate,
                    source,
                });
            }
        }
    }
    Err(last.unwrap_or_else(|| ServeError::Bind {
        address: addr.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address to bind"),
    }))
}
