//! Catch-all request handler.
//!
//! # Responsibilities
//! - Build a `Context` for every inbound request
//! - Run the router and turn its outcome into exactly one response

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::Response,
};

use crate::http::context::Context;
use crate::routing::{Outcome, Router};

/// State shared by every dispatcher invocation.
#[derive(Clone)]
pub struct DispatchState {
    pub router: Arc<Router>,
    pub max_body_bytes: usize,
}

/// Entry point installed for every path and method.
pub async fn dispatch(State(state): State<DispatchState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut ctx = Context::from_request(request, state.max_body_bytes).await;

    let outcome = state.router.dispatch(&mut ctx);
    match &outcome {
        Outcome::Matched { status, handlers_run, .. } => {
            tracing::debug!(
                method = %method,
                path = %path,
                status = *status,
                handlers_run = *handlers_run,
                "Page served"
            );
        }
        Outcome::NotFound { .. } => {
            tracing::debug!(method = %method, path = %path, "No route matched");
        }
    }

    let (status, body) = outcome.into_parts();
    build_response(status, body, ctx.into_response_headers())
}

/// Assemble the single response of a request.
///
/// Codes outside 100..=999 cannot be sent and become 500.
pub fn build_response(status: u16, body: String, headers: HeaderMap) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or_else(|_| {
        tracing::error!(status, "Handler returned an invalid status code");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
