//! Per-request context handed to page handlers.
//!
//! # Responsibilities
//! - Expose the request head and buffered body
//! - Collect response headers set by handlers
//! - Resolve form values and uploaded files
//!
//! # Design Decisions
//! - One context per request, dropped once the response is built
//! - Handlers borrow it mutably, so nothing can touch it after the response
//!   has been produced
//! - A body that cannot be buffered never rejects the request: the context
//!   gets an empty body and the failure surfaces through `get_form_file`

use axum::body::{Body, Bytes};
use axum::http::{
    header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri,
};
use http_body_util::LengthLimitError;

use crate::http::form::{FileHeader, FileReader, Form, FormFileError};

/// Request data and response-writing capabilities for one request.
#[derive(Debug)]
pub struct Context {
    request: Parts,
    body: Bytes,
    form: Form,
    response_headers: HeaderMap,
}

impl Context {
    /// Buffer the body (at most `max_body_bytes`) and decode the form.
    ///
    /// Bodies over the limit, or that fail to read, leave the context with an
    /// empty body and a query-only form.
    pub async fn from_request(request: Request<Body>, max_body_bytes: usize) -> Self {
        let (parts, body) = request.into_parts();
        let (body, form) = match axum::body::to_bytes(body, max_body_bytes).await {
            Ok(body) => {
                let form = Form::parse(&parts, &body).await;
                (body, form)
            }
            Err(e) => {
                let inner = e.into_inner();
                let error = if inner.downcast_ref::<LengthLimitError>().is_some() {
                    FormFileError::BodyTooLarge {
                        limit: max_body_bytes,
                    }
                } else {
                    FormFileError::Unreadable(inner.to_string())
                };
                tracing::warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    error = %error,
                    "Request body not buffered"
                );
                (Bytes::new(), Form::without_body(&parts, error))
            }
        };

        Self {
            request: parts,
            body,
            form,
            response_headers: HeaderMap::new(),
        }
    }

    /// Context for a request without a body. The form holds the query string
    /// only.
    pub fn from_parts(parts: Parts) -> Self {
        let form = Form::from_query(&parts);
        Self {
            request: parts,
            body: Bytes::new(),
            form,
            response_headers: HeaderMap::new(),
        }
    }

    /// Request head: method, URI, version, headers and extensions.
    pub fn request(&self) -> &Parts {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    /// Request path, without the query string.
    pub fn path(&self) -> &str {
        self.request.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Append a response header. Existing values under the same name are kept.
    ///
    /// Names or values that are not valid HTTP are dropped with a warning.
    pub fn set_header(&mut self, key: &str, value: &str) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(header = %key, "Ignoring invalid response header name");
                return;
            }
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(header = %key, "Ignoring invalid response header value");
                return;
            }
        };
        self.response_headers.append(name, value);
    }

    /// First form value for `key`, or an empty string.
    pub fn get_form_value(&self, key: &str) -> String {
        self.form.value(key).unwrap_or_default().to_string()
    }

    /// First uploaded file sent under `key`.
    pub fn get_form_file(&self, key: &str) -> Result<(FileReader, FileHeader), FormFileError> {
        self.form.file(key)
    }

    /// Mark the response as plain text and pass `status` and `body` through.
    ///
    /// Meant as a handler's tail expression: `c.to_text(200, "hi")`.
    pub fn to_text(&mut self, status: u16, body: impl Into<String>) -> (u16, String) {
        self.response_headers.append(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        (status, body.into())
    }

    /// Headers collected for the response so far.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub(crate) fn into_response_headers(self) -> HeaderMap {
        self.response_headers
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        let (parts, _) = Request::builder()
            .uri("/")
            .body(())
            .expect("valid test request")
            .into_parts();
        Self::from_parts(parts)
    }
}
