use crate::context::{self, RequestContext};
use crate::response::ResponseState;
use crate::router::Route;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span};

/// Serializes handler invocations and brackets each one with a request binding.
pub struct Dispatcher {
    lock: Mutex<()>,
    realm: Arc<str>,
}

impl Dispatcher {
    /// Create a dispatcher whose auth challenges advertise `realm`
    #[must_use]
    pub fn new(realm: impl Into<Arc<str>>) -> Self {
        Self {
            lock: Mutex::new(()),
            realm: realm.into(),
        }
    }

    /// Realm used by `request_authentication()`
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Invoke `route`'s handler for `request` and return what it produced.
    ///
    /// Blocks until no other handler is running.
    pub fn dispatch(&self, route: &Route, request: RequestContext) -> ResponseState {
        let span = info_span!(
            "dispatch",
            dispatch_id = %request.id,
            method = %request.method,
            path = %request.path,
            remote_addr = ?request.remote_addr,
        );
        let _enter = span.enter();

        let has_auth = request.header("authorization").is_some();
        let param_count = request.params.len();

        let wait_start = Instant::now();
        let _guard = self.lock.lock();
        let waited = wait_start.elapsed();

        let scope = context::bind(request, Arc::clone(&self.realm));
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| (route.handler)()));
        let elapsed = started.elapsed();

        let response = match outcome {
            Ok(()) => scope.take_response(),
            Err(payload) => {
                error!(
                    panic_message = %panic_message(payload.as_ref()),
                    "Handler panicked"
                );
                ResponseState::internal_error()
            }
        };
        drop(scope);

        info!(
            status = response.status,
            body_len = response.body.len(),
            param_count,
            has_auth,
            lock_wait_us = waited.as_micros() as u64,
            duration_us = elapsed.as_micros() as u64,
            "Dispatch complete"
        );
        response
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("realm", &self.realm)
            .field("busy", &self.lock.is_locked())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
