//! Page registration and request dispatch.
//!
//! # Responsibilities
//! - Collect routes in registration order
//! - Pick the handler(s) for a request by exact (method, path) comparison
//! - Fall back to the not-found handler when nothing matches
//!
//! # Design Decisions
//! - Builder-style registration on an owned value; serving moves the router
//!   into an `Arc`, so the route table is frozen once traffic starts
//! - Only the not-found slot stays replaceable after that (atomic swap)
//! - By default every matching route runs and the last one decides the
//!   response; `MatchPolicy::FirstMatch` stops at the first one

use serde::{Deserialize, Serialize};

use crate::http::server::{serve, ServeError};
use crate::http::Context;
use crate::routing::handler::{boxed, Handler};
use crate::routing::method::Method;
use crate::routing::not_found::NotFoundSlot;
use crate::routing::table::{Route, RouteTable};

/// How many matching routes run for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every matching route runs in registration order; the last result is
    /// written. Earlier handlers still apply their header writes.
    #[default]
    AllMatches,
    /// The first matching route runs and scanning stops.
    FirstMatch,
}

/// Result of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// At least one route ran.
    Matched {
        status: u16,
        body: String,
        /// Number of handlers that ran.
        handlers_run: usize,
    },
    /// No route matched. Only the not-found body is kept; the response status
    /// is always 404 whatever the handler returned.
    NotFound { body: String },
}

impl Outcome {
    /// Status that goes on the wire.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Matched { status, .. } => *status,
            Outcome::NotFound { .. } => 404,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Outcome::Matched { body, .. } | Outcome::NotFound { body } => body,
        }
    }

    pub fn into_parts(self) -> (u16, String) {
        match self {
            Outcome::Matched { status, body, .. } => (status, body),
            Outcome::NotFound { body } => (404, body),
        }
    }
}

/// The set of pages served by one server.
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RouteTable,
    not_found: NotFoundSlot,
    policy: MatchPolicy,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how duplicate routes are resolved.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: MatchPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Append a route. Paths are not validated; duplicates are kept.
    pub fn route<H: Handler>(
        &mut self,
        path: impl Into<String>,
        method: Method,
        handler: H,
    ) -> &mut Self {
        let path = path.into();
        tracing::debug!(method = %method, path = %path, "Route registered");
        self.table.push(Route::new(path, method, boxed(handler)));
        self
    }

    /// Builder form of [`Router::route`].
    pub fn register<H: Handler>(mut self, path: impl Into<String>, method: Method, handler: H) -> Self {
        self.route(path, method, handler);
        self
    }

    pub fn get<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Get, handler)
    }

    pub fn head<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Head, handler)
    }

    pub fn post<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Post, handler)
    }

    pub fn put<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Put, handler)
    }

    pub fn delete<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Delete, handler)
    }

    pub fn connect<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Connect, handler)
    }

    pub fn options<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Options, handler)
    }

    pub fn trace<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Trace, handler)
    }

    pub fn patch<H: Handler>(self, path: impl Into<String>, handler: H) -> Self {
        self.register(path, Method::Patch, handler)
    }

    /// Builder form of [`Router::set_not_found`].
    pub fn not_found<H: Handler>(self, handler: H) -> Self {
        self.set_not_found(handler);
        self
    }

    /// Replace the not-found handler. Allowed while serving.
    pub fn set_not_found<H: Handler>(&self, handler: H) {
        self.not_found.set(boxed(handler));
    }

    /// Alias of [`Router::set_not_found`].
    pub fn set_404<H: Handler>(&self, handler: H) {
        self.set_not_found(handler);
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        self.table.as_slice()
    }

    /// Run the handler(s) for the request held by `ctx`.
    pub fn dispatch(&self, ctx: &mut Context) -> Outcome {
        let mut result = None;
        let mut handlers_run = 0;

        if let Some(method) = Method::from_http(ctx.method()) {
            let path = ctx.path().to_owned();
            for route in self.table.matching(method, &path) {
                result = Some(route.handler().call(ctx));
                handlers_run += 1;
                if self.policy == MatchPolicy::FirstMatch {
                    break;
                }
            }
        }

        match result {
            Some((status, body)) => Outcome::Matched {
                status,
                body,
                handlers_run,
            },
            None => {
                let (_, body) = self.not_found.call(ctx);
                Outcome::NotFound { body }
            }
        }
    }

    /// Serve this router on `addr` until the listener stops.
    pub async fn run(self, addr: &str) -> Result<(), ServeError> {
        serve(addr, self).await
    }
}
