use super::request::parse_request;
use super::response::{into_http_response, not_found};
use crate::dispatcher::Dispatcher;
use crate::router::RouteTable;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes one request and writes the dispatch result back to the client.
///
/// Cheap to clone; every worker thread gets its own copy.
#[derive(Clone)]
pub struct AppService {
    pub routes: Arc<RouteTable>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { routes, dispatcher }
    }

    /// Serve one request to completion.
    pub fn call(&self, mut req: tiny_http::Request) {
        let Some(ctx) = parse_request(&mut req) else {
            respond(req, not_found());
            return;
        };

        let Some(route) = self.routes.route(&ctx.method, &ctx.path) else {
            debug!(dispatch_id = %ctx.id, method = %ctx.method, path = %ctx.path, "No route matched");
            respond(req, not_found());
            return;
        };

        let state = self.dispatcher.dispatch(route, ctx);
        respond(req, into_http_response(state));
    }
}

fn respond<R: std::io::Read>(req: tiny_http::Request, resp: tiny_http::Response<R>) {
    if let Err(e) = req.respond(resp) {
        warn!(error = %e, "Failed to write response");
    }
}
