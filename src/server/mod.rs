//! # Server Module
//!
//! The HTTP transport that feeds requests to the dispatcher.
//!
//! ## Components
//!
//! - [`HttpServer`] binds the listener and runs the accept loop on its own thread
//! - [`ServerHandle`] controls a running listener (ready check, stop)
//! - [`AppService`] routes each request and turns the dispatch result into a response
//! - [`parse_request`] converts a `tiny_http` request into a [`RequestContext`](crate::context::RequestContext)
//!
//! Every accepted request is served on a fresh worker thread, so many
//! requests are in flight at once while the dispatcher lets only one handler
//! run at a time.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, MAX_BODY_BYTES};
pub use response::{into_http_response, not_found};
pub use service::AppService;
