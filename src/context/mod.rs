//! # Request Context Module
//!
//! Makes the request being dispatched available to handlers that take no
//! arguments.
//!
//! ## Overview
//!
//! Firmware handlers are plain `fn()` callbacks that call `current.arg("pin")`
//! from whatever depth they like. To support that without a global mutable
//! slot shared by every connection, the dispatcher *binds* the parsed request
//! into a thread-local slot of the thread running the dispatch, invokes the
//! handler on that same thread, and unbinds it afterwards:
//!
//! ```text
//! worker thread ── lock dispatch ── bind(request) ── handler() ── take_response ── unbind ── unlock
//!                                        │               │
//!                                        └── param()/header()/send() read and write this slot
//! ```
//!
//! Two consequences:
//!
//! - Concurrent dispatches live on different threads and therefore in
//!   different slots; they can never observe each other's request.
//! - Accessors called outside a dispatch (or from a thread the handler
//!   spawned) see no request: [`current`] returns `None`, [`param`] returns an
//!   empty string, and response writes are dropped with a warning.
//!
//! The binding is released by [`DispatchScope`]'s `Drop`, so it is cleared on
//! every exit path including a handler panic.

mod core;

pub use self::core::{
    bind, current, has_header, has_param, header, is_dispatching, method, param, param_at,
    param_count, remote_addr, uri, DispatchScope, HeaderVec, ParamVec, RequestContext,
    MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};

pub(crate) use self::core::{realm, with_response};
