//! Route storage.
//!
//! # Design Decisions
//! - Append-only: routes are never removed or replaced
//! - No uniqueness check: duplicate (path, method) pairs are kept in order
//! - Lookup is a linear scan in registration order

use std::fmt;

use crate::routing::handler::BoxedHandler;
use crate::routing::method::Method;

/// A registered page.
#[derive(Clone)]
pub struct Route {
    path: String,
    method: Method,
    handler: BoxedHandler,
}

impl Route {
    pub(crate) fn new(path: String, method: Method, handler: BoxedHandler) -> Self {
        Self {
            path,
            method,
            handler,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Exact comparison on both path and method.
    pub fn matches(&self, method: Method, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Ordered list of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Routes matching `(method, path)`, in registration order.
    pub fn matching<'a>(
        &'a self,
        method: Method,
        path: &'a str,
    ) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |r| r.matches(method, path))
    }

    pub fn as_slice(&self) -> &[Route] {
        &self.routes
    }
}
