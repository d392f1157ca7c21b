//! # WebServer
//!
//! The firmware-facing server object: register handlers, `begin()`, and read
//! or answer the request from inside handlers through [`Current`].
//!
//! ```rust,no_run
//! use fwsim::WebServer;
//!
//! let server = WebServer::new(8080);
//! let s = server.current();
//! server.on("/status", move || s.send(200, "text/plain", "OK"));
//! server.begin()?;
//! # Ok::<(), fwsim::ServerError>(())
//! ```
//!
//! [`WebServer`] owns the listener: when the last clone is dropped the server
//! stops. Handlers capture [`Current`] instead, a stateless handle whose
//! methods act on the dispatch running on the calling thread. A handler that
//! captured a `WebServer` clone would keep the server alive through its own
//! route table.

use crate::config::ServerConfig;
use crate::context;
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::response;
use crate::router::RouteTable;
use crate::security;
use crate::server::{AppService, HttpServer, ServerHandle};
use http::Method;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

struct Inner {
    config: ServerConfig,
    routes: Mutex<RouteTable>,
    running: Mutex<Option<ServerHandle>>,
}

/// A simulated firmware web server.
#[derive(Clone)]
pub struct WebServer {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for WebServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes = self.route_count();
        let running = self.is_running();
        f.debug_struct("WebServer")
            .field("config", &self.inner.config)
            .field("routes", &routes)
            .field("running", &running)
            .finish()
    }
}

impl WebServer {
    /// Server on `0.0.0.0:port` with the default realm
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self::with_config(ServerConfig::with_port(port))
    }

    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                routes: Mutex::new(RouteTable::new()),
                running: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    // ---- setup ----------------------------------------------------------

    /// Register a GET handler for `path`
    pub fn on<F>(&self, path: &str, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_method(path, Method::GET, handler);
    }

    /// Register a handler for `(path, method)`.
    ///
    /// Re-registering a key replaces the previous handler. While the server
    /// is running the route table is frozen and the call is ignored.
    pub fn on_method<F>(&self, path: &str, method: Method, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_running() {
            warn!(
                method = %method,
                path = %path,
                "Route registered after begin() - ignored"
            );
            return;
        }
        self.inner.routes.lock().register(path, method, handler);
    }

    /// Number of registered routes
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.routes.lock().len()
    }

    /// Bind the listener and start serving the registered routes.
    ///
    /// Returns once the listener accepts connections.
    ///
    /// # Errors
    ///
    /// [`ServerError::AlreadyStarted`] if already serving,
    /// [`ServerError::Bind`] if the address cannot be bound.
    pub fn begin(&self) -> Result<(), ServerError> {
        let mut running = self.inner.running.lock();
        if running.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let routes = Arc::new(self.inner.routes.lock().clone());
        routes.log_routes();
        let dispatcher = Arc::new(Dispatcher::new(self.inner.config.realm.as_str()));
        let service = AppService::new(routes, dispatcher);

        let handle = HttpServer(service).start(self.inner.config.listen_addr())?;
        if let Err(e) = handle.wait_ready() {
            warn!(addr = %handle.addr(), error = %e, "Listener not accepting yet");
        }
        info!(
            addr = %handle.addr(),
            realm = %self.inner.config.realm,
            "Web server started"
        );
        *running = Some(handle);
        Ok(())
    }

    /// Firmware loops call this every iteration; requests are served by the
    /// listener's own threads so there is nothing to do here.
    pub fn handle_client(&self) {}

    /// Stop the listener and wait for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// [`ServerError::NotStarted`] if the server is not running.
    pub fn stop(&self) -> Result<(), ServerError> {
        let handle = self
            .inner
            .running
            .lock()
            .take()
            .ok_or(ServerError::NotStarted)?;
        handle.stop();
        Ok(())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.lock().is_some()
    }

    /// Bound address while running (resolves port `0`)
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.running.lock().as_ref().map(ServerHandle::addr)
    }

    /// The request/response surface for handlers registered on this server
    #[must_use]
    pub fn current(&self) -> Current {
        Current
    }
}

/// The dispatch running on the calling thread.
///
/// Holds no state: every method reads the request bound by the dispatcher
/// or writes its response. Outside a dispatch, reads return empty values and
/// writes are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Current;

impl Current {
    // ---- request ----------------------------------------------------------

    /// Query or form parameter `name`; `""` when absent
    #[must_use]
    pub fn arg(&self, name: &str) -> String {
        context::param(name)
    }

    #[must_use]
    pub fn has_arg(&self, name: &str) -> bool {
        context::has_param(name)
    }

    /// Number of parameters of the current request
    #[must_use]
    pub fn args(&self) -> usize {
        context::param_count()
    }

    /// Name of the parameter at `index`; `""` when out of range
    #[must_use]
    pub fn arg_name(&self, index: usize) -> String {
        context::param_at(index).map(|(k, _)| k).unwrap_or_default()
    }

    /// Value of the parameter at `index`; `""` when out of range
    #[must_use]
    pub fn arg_at(&self, index: usize) -> String {
        context::param_at(index).map(|(_, v)| v).unwrap_or_default()
    }

    /// Request header (case-insensitive); `""` when absent
    #[must_use]
    pub fn header(&self, name: &str) -> String {
        context::header(name)
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        context::has_header(name)
    }

    /// Path of the current request without the query string
    #[must_use]
    pub fn uri(&self) -> String {
        context::uri()
    }

    #[must_use]
    pub fn method(&self) -> Option<Method> {
        context::method()
    }

    /// Peer address of the current request
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        context::remote_addr()
    }

    /// Peer IP of the current request; `""` outside a dispatch
    #[must_use]
    pub fn remote_ip(&self) -> String {
        self.remote_addr()
            .map(|a| a.ip().to_string())
            .unwrap_or_default()
    }

    // ---- response ---------------------------------------------------------

    pub fn send_status(&self, code: u16) {
        response::send_status(code);
    }

    pub fn send(&self, code: u16, content_type: &str, body: impl AsRef<[u8]>) {
        response::send(code, content_type, body);
    }

    pub fn send_header(&self, name: &str, value: &str) {
        response::send_header(name, value);
    }

    pub fn send_content(&self, chunk: impl AsRef<[u8]>) {
        response::send_content(chunk);
    }

    pub fn set_content_length(&self, len: usize) {
        response::set_content_length(len);
    }

    // ---- auth -------------------------------------------------------------

    /// Whether the current request carries Basic credentials `username:password`
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        security::authenticate(username, password)
    }

    /// Answer with `401` and a Basic challenge for the serving realm
    pub fn request_authentication(&self) {
        security::request_authentication();
    }
}
