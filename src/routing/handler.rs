//! Page handler abstraction.

use std::sync::Arc;

use crate::http::Context;

/// A page: turns a request context into a status code and a body.
///
/// Any `Fn(&mut Context) -> (u16, String)` closure or function is a handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut Context) -> (u16, String);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> (u16, String) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context) -> (u16, String) {
        self(ctx)
    }
}

/// Shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

pub(crate) fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}
