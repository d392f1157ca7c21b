use crate::ids::DispatchId;
use crate::response::ResponseState;
use http::Method;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Maximum query/form parameters stored inline before spilling to the heap
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum request headers stored inline before spilling to the heap
pub const MAX_INLINE_HEADERS: usize = 16;

/// Decoded `(name, value)` parameters in request order
pub type ParamVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// Request headers in request order, names lower-cased
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// The request a handler is serving.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id for log lines of this dispatch
    pub id: DispatchId,
    /// HTTP method
    pub method: Method,
    /// Percent-decoded path without query string
    pub path: String,
    /// Raw request target as received (path plus query string)
    pub uri: String,
    /// Headers with lower-cased names
    pub headers: HeaderVec,
    /// Query parameters followed by urlencoded form parameters
    pub params: ParamVec,
    /// Peer address, when the transport knows it
    pub remote_addr: Option<SocketAddr>,
}

impl RequestContext {
    /// Build a context from a method and request target.
    ///
    /// The path is percent-decoded (invalid UTF-8 is replaced) and the query
    /// string of `uri` is decoded into [`params`](Self::params).
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (uri, None),
        };
        let params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        let path = if path.is_empty() {
            "/".to_string()
        } else {
            percent_decode_str(path).decode_utf8_lossy().into_owned()
        };
        Self {
            id: DispatchId::new(),
            method,
            path,
            uri: uri.to_string(),
            headers: HeaderVec::new(),
            params,
            remote_addr: None,
        }
    }

    /// Set the peer address
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Add a header (name is lower-cased)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Append a parameter after the ones decoded from the query string
    #[must_use]
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// First value of parameter `name`, if present
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header value (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct ActiveDispatch {
    request: Arc<RequestContext>,
    response: ResponseState,
    realm: Arc<str>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveDispatch>> = const { RefCell::new(None) };
}

/// Binding of one request to the current thread.
///
/// Created by [`bind`]; dropping it clears the slot (or restores an outer
/// binding if binds were nested on this thread). Not `Send`: the binding is
/// meaningless on any other thread.
#[must_use = "the request is unbound as soon as the scope is dropped"]
pub struct DispatchScope {
    previous: Option<ActiveDispatch>,
    _not_send: PhantomData<*const ()>,
}

/// Bind `request` as the current request of this thread with a fresh
/// default response.
///
/// `realm` is what `request_authentication()` advertises during this dispatch.
pub fn bind(request: RequestContext, realm: Arc<str>) -> DispatchScope {
    let request = Arc::new(request);
    debug!(
        dispatch_id = %request.id,
        method = %request.method,
        path = %request.path,
        "Request context bound"
    );
    let previous = ACTIVE.with(|slot| {
        slot.borrow_mut().replace(ActiveDispatch {
            request,
            response: ResponseState::default(),
            realm,
        })
    });
    DispatchScope {
        previous,
        _not_send: PhantomData,
    }
}

impl DispatchScope {
    /// Move the accumulated response out of the slot, leaving defaults behind.
    #[must_use]
    pub fn take_response(&self) -> ResponseState {
        ACTIVE.with(|slot| {
            slot.borrow_mut()
                .as_mut()
                .map(|active| std::mem::take(&mut active.response))
                .unwrap_or_default()
        })
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|slot| {
            // try_borrow_mut: never panic inside drop, even while unwinding
            if let Ok(mut slot) = slot.try_borrow_mut() {
                *slot = previous;
            }
        });
    }
}

/// The request bound to the calling thread, or `None` outside a dispatch.
#[must_use]
pub fn current() -> Option<Arc<RequestContext>> {
    ACTIVE.with(|slot| slot.borrow().as_ref().map(|a| Arc::clone(&a.request)))
}

/// Whether the calling thread is inside a dispatch
#[must_use]
pub fn is_dispatching() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

fn with_request<R>(f: impl FnOnce(&RequestContext) -> R) -> Option<R> {
    ACTIVE.with(|slot| slot.borrow().as_ref().map(|a| f(&a.request)))
}

/// Value of parameter `name`, or `""` when it is absent.
///
/// A missing parameter and a parameter sent with an empty value are
/// indistinguishable; use [`has_param`] when the difference matters.
#[must_use]
pub fn param(name: &str) -> String {
    with_request(|r| r.param(name).map(str::to_string))
        .flatten()
        .unwrap_or_default()
}

/// Whether parameter `name` was sent
#[must_use]
pub fn has_param(name: &str) -> bool {
    with_request(|r| r.param(name).is_some()).unwrap_or(false)
}

/// Number of parameters of the current request
#[must_use]
pub fn param_count() -> usize {
    with_request(|r| r.params.len()).unwrap_or(0)
}

/// `(name, value)` of the parameter at `index`, in request order
#[must_use]
pub fn param_at(index: usize) -> Option<(String, String)> {
    with_request(|r| r.params.get(index).cloned()).flatten()
}

/// Value of header `name`, or `""` when it is absent
#[must_use]
pub fn header(name: &str) -> String {
    with_request(|r| r.header(name).map(str::to_string))
        .flatten()
        .unwrap_or_default()
}

/// Whether header `name` was sent
#[must_use]
pub fn has_header(name: &str) -> bool {
    with_request(|r| r.header(name).is_some()).unwrap_or(false)
}

/// Method of the current request
#[must_use]
pub fn method() -> Option<Method> {
    with_request(|r| r.method.clone())
}

/// Peer address of the current request
#[must_use]
pub fn remote_addr() -> Option<SocketAddr> {
    with_request(|r| r.remote_addr).flatten()
}

/// Path of the current request (without query), or `""`
#[must_use]
pub fn uri() -> String {
    with_request(|r| r.path.clone()).unwrap_or_default()
}

/// Run `f` on the response of the current dispatch.
///
/// Returns `None` when the thread is not dispatching.
pub(crate) fn with_response<R>(f: impl FnOnce(&mut ResponseState) -> R) -> Option<R> {
    ACTIVE.with(|slot| slot.borrow_mut().as_mut().map(|a| f(&mut a.response)))
}

/// Realm of the current dispatch
pub(crate) fn realm() -> Option<Arc<str>> {
    ACTIVE.with(|slot| slot.borrow().as_ref().map(|a| Arc::clone(&a.realm)))
}
