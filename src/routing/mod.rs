//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Router::new().get(path, handler).post(...)
//!     → table.rs (append route records, registration order kept)
//!     → Router moved into Arc when serving starts (table frozen)
//!
//! Per request:
//!     Context (method, path)
//!     → router.rs (linear scan, exact method + path comparison)
//!     → handler.rs (run matching page handlers)
//!     → not_found.rs (fallback when nothing matched)
//!     → Outcome (status, body)
//! ```
//!
//! # Design Decisions
//! - No path parameters, wildcards or priorities: exact comparison only
//! - Deterministic: same input always runs the same handlers

pub mod handler;
pub mod method;
pub mod not_found;
pub mod router;
pub mod table;

pub use handler::{BoxedHandler, Handler};
pub use method::Method;
pub use not_found::{NotFoundSlot, DEFAULT_NOT_FOUND_BODY};
pub use router::{MatchPolicy, Outcome, Router};
pub use table::{Route, RouteTable};
