use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A firmware handler: no arguments, no return value.
///
/// Handlers read their request and write their response through the
/// thread-local accessors in [`crate::context`] and [`crate::response`].
pub type Handler = Arc<dyn Fn() + Send + Sync + 'static>;

/// One registered route
#[derive(Clone)]
pub struct Route {
    /// Exact request path (e.g. `/status`)
    pub path: Arc<str>,
    /// HTTP method the route answers to
    pub method: Method,
    /// Callback invoked once per matching request
    pub handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Ordered `(path, method) -> handler` table
#[derive(Clone, Default, Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `handler` for `(path, method)`.
    ///
    /// A second registration for the same key replaces the handler in place.
    pub fn register<F>(&mut self, path: &str, method: Method, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_handler(path, method, Arc::new(handler));
    }

    /// Register an already shared handler.
    pub fn register_handler(&mut self, path: &str, method: Method, handler: Handler) {
        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path.as_ref() == path)
        {
            warn!(
                method = %method,
                path = %path,
                "Route registered twice - previous handler replaced"
            );
            existing.handler = handler;
            return;
        }

        debug!(
            method = %method,
            path = %path,
            total_routes = self.routes.len() + 1,
            "Route registered"
        );
        self.routes.push(Route {
            path: Arc::from(path),
            method,
            handler,
        });
    }

    /// Find the route for an exact `(method, path)` pair.
    ///
    /// `path` must already have its query string stripped.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.path.as_ref() == path)
    }

    /// Registered routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Log the routing table at `info` level
    pub fn log_routes(&self) {
        let summary: Vec<String> = self
            .routes
            .iter()
            .take(20)
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?summary,
            "Routing table frozen"
        );
    }
}
