//! Minimal page router on top of axum.
//!
//! Pages are declared as `(path, method, handler)` triples and matched by
//! exact comparison:
//!
//! ```no_run
//! use pageroute::{Context, Router};
//!
//! # async fn run() -> Result<(), pageroute::ServeError> {
//! Router::new()
//!     .get("/", |c: &mut Context| c.to_text(200, "hello"))
//!     .post("/echo", |c: &mut Context| {
//!         let msg = c.get_form_value("msg");
//!         c.to_text(200, msg)
//!     })
//!     .not_found(|c: &mut Context| c.to_text(404, "nothing here"))
//!     .run(":8080")
//!     .await
//! # }
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{serve, Context, FormFileError, HttpServer, ServeError};
pub use routing::{Handler, MatchPolicy, Method, Router};
