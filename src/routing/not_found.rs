//! Fallback page for requests no route matches.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::http::Context;
use crate::routing::handler::{boxed, BoxedHandler};

/// Body of the built-in not-found page.
pub const DEFAULT_NOT_FOUND_BODY: &str = "404 Not Found";

fn default_not_found(_: &mut Context) -> (u16, String) {
    (404, DEFAULT_NOT_FOUND_BODY.to_string())
}

/// Replaceable not-found handler.
///
/// Replacement is an atomic swap, so it is allowed while requests are being
/// served. Last writer wins.
pub struct NotFoundSlot {
    current: ArcSwap<BoxedHandler>,
}

impl NotFoundSlot {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(boxed(default_not_found)),
        }
    }

    pub fn set(&self, handler: BoxedHandler) {
        self.current.store(Arc::new(handler));
    }

    pub fn get(&self) -> BoxedHandler {
        BoxedHandler::clone(&self.current.load())
    }

    /// Run the current handler.
    pub fn call(&self, ctx: &mut Context) -> (u16, String) {
        self.get().call(ctx)
    }
}

impl Default for NotFoundSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NotFoundSlot {
    fn clone(&self) -> Self {
        Self {
            current: ArcSwap::from_pointee(self.get()),
        }
    }
}

impl fmt::Debug for NotFoundSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotFoundSlot").finish_non_exhaustive()
    }
}
