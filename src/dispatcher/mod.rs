//! # Dispatcher Module
//!
//! Runs one matched handler for one request, one handler at a time.
//!
//! ## Request Flow
//!
//! 1. The transport matched a [`Route`](crate::router::Route) and parsed a
//!    [`RequestContext`](crate::context::RequestContext)
//! 2. The dispatcher takes the process-wide dispatch lock
//! 3. The request is bound to the current thread with a default response
//! 4. The handler runs; it reads the request and writes the response through
//!    the context accessors
//! 5. The accumulated response is taken, the binding cleared, the lock released
//!
//! ## Concurrency
//!
//! The transport calls [`Dispatcher::dispatch`] from many threads at once.
//! The lock makes handler execution strictly sequential, so handler code
//! written for a single-threaded loop keeps working. A slow handler stalls
//! every other request; there is no timeout and no fairness guarantee.
//!
//! ## Panic Recovery
//!
//! Handler panics are caught. The client gets `500 Internal Server Error` and
//! anything the handler wrote before panicking is discarded. The lock is a
//! `parking_lot::Mutex`, which does not poison, so the next dispatch proceeds
//! normally.

mod core;

pub use self::core::Dispatcher;
