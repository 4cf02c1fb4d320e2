//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum/hyper, tracing layer)
//!     → dispatcher.rs (single catch-all handler)
//!     → context.rs + form.rs (buffer body, decode form, collect headers)
//!     → [routing decides which pages run]
//!     → dispatcher.rs (one status + body write)
//!     → Send to client
//! ```

pub mod context;
pub mod dispatcher;
pub mod form;
pub mod server;

pub use context::Context;
pub use form::{FileHeader, FileReader, Form, FormFileError};
pub use server::{serve, HttpServer, ServeError};
