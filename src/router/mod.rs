//! # Router Module
//!
//! The route table: an ordered collection of `(path, method, handler)`
//! registrations that is filled during sketch `setup()` and frozen when the
//! server starts listening.
//!
//! ## Semantics
//!
//! - Lookup is an exact match on `(method, path)`. The path is compared
//!   without its query string and without any pattern syntax; firmware web
//!   servers do not support path parameters.
//! - Registering the same `(path, method)` twice silently replaces the first
//!   handler. The route keeps its original position in the table. Sketches
//!   are not expected to rely on this, but it must not be an error.
//! - Once serving starts the table is shared read-only (`Arc<RouteTable>`), so
//!   lookups take no lock.
//!
//! ## Example
//!
//! ```rust
//! use fwsim::router::RouteTable;
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.register("/status", Method::GET, || {});
//! assert!(table.route(&Method::GET, "/status").is_some());
//! assert!(table.route(&Method::POST, "/status").is_none());
//! ```

mod core;

pub use self::core::{Handler, Route, RouteTable};
