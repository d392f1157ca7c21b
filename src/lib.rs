//! # fwsim
//!
//! **fwsim** runs firmware-style web handlers (zero arguments, no return value,
//! written for a single-threaded `server.handleClient()` loop) on a real,
//! multi-threaded HTTP listener.
//!
//! ## Overview
//!
//! Device firmware registers plain callbacks and reads "the current request"
//! from global accessors:
//!
//! ```rust,no_run
//! use fwsim::WebServer;
//! use http::Method;
//!
//! let server = WebServer::new(8080);
//!
//! let s = server.current();
//! server.on("/secure", move || {
//!     if !s.authenticate("admin", "secret") {
//!         return s.request_authentication();
//!     }
//!     s.send(200, "text/plain", "welcome");
//! });
//!
//! let s = server.current();
//! server.on_method("/set", Method::POST, move || {
//!     let pin = s.arg("pin");
//!     let val = s.arg("val");
//!     s.send(200, "text/plain", format!("{pin}={val}"));
//! });
//!
//! server.begin()?;
//! loop {
//!     server.handle_client();
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok::<(), fwsim::ServerError>(())
//! ```
//!
//! fwsim makes that model safe under concurrent connections: every request
//! is bound to the thread serving it, and handler execution is serialized.
//!
//! ## Architecture
//!
//! - **[`router`]** - exact `(path, method)` route table
//! - **[`context`]** - thread-local binding of the request being dispatched
//! - **[`response`]** - per-dispatch response accumulator
//! - **[`security`]** - HTTP Basic authentication gate
//! - **[`dispatcher`]** - serialized, panic-safe handler invocation
//! - **[`server`]** - `tiny_http` transport adapter
//! - **[`webserver`]** - the firmware-facing [`WebServer`] object and the [`Current`] handler surface
//! - **[`client`]** - firmware-style blocking HTTP client
//! - **[`config`]**, **[`logging`]**, **[`error`]** - ambient plumbing
//! - **[`demo`]**, **[`cli`]** - the sketch and command line behind the `fwsim` binary
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Worker as Worker thread
//!     participant Routes as RouteTable
//!     participant Disp as Dispatcher
//!     participant Ctx as Thread-local context
//!     participant Handler
//!
//!     Client->>Worker: HTTP request
//!     Worker->>Routes: route(method, path)
//!     Routes-->>Worker: Route or 404
//!     Worker->>Disp: dispatch(route, request)
//!     Disp->>Disp: lock
//!     Disp->>Ctx: bind(request, default response)
//!     Disp->>Handler: handler()
//!     Handler->>Ctx: arg / header / authenticate
//!     Handler->>Ctx: send / send_header / send_content
//!     Disp->>Ctx: take response, unbind
//!     Disp->>Disp: unlock
//!     Disp-->>Worker: ResponseState
//!     Worker-->>Client: status + headers + body
//! ```
//!
//! ## Guarantees
//!
//! - A handler only ever sees the request it was invoked for
//! - At most one handler runs at a time, per server
//! - A panicking handler yields `500 Internal Server Error` and the server keeps serving
//! - Unregistered `(path, method)` pairs get `404` with an empty body
//!
//! ## Logging
//!
//! All components log through `tracing`. Install a subscriber with
//! [`logging::init_logging`], configured by `FWSIM_LOG_*` variables.

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod response;
pub mod router;
pub mod security;
pub mod server;
pub mod webserver;

pub use client::HttpClient;
pub use config::ServerConfig;
pub use context::RequestContext;
pub use error::{ConfigError, ServerError};
pub use response::ResponseState;
pub use webserver::{Current, WebServer};
