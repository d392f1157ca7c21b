//! # Response Module
//!
//! The response a handler builds while it runs.
//!
//! Each dispatch starts from [`ResponseState::default`] (status 200,
//! `text/plain`, empty body, no headers). Handlers mutate it through the free
//! functions below, which write into the state bound to the current thread by
//! [`context::bind`](crate::context::bind). After the handler returns, the
//! dispatcher takes the state and the transport serialises it.
//!
//! ## Rules
//!
//! - `send` replaces status, content type and body; a second `send` wins.
//! - `send_header` upserts by case-insensitive name, keeping the first
//!   position.
//! - `send_content` appends to the body without touching status or type.
//! - `set_content_length` is accepted and ignored; the transport always
//!   computes the length from the final body.
//!
//! Outside a dispatch every write is dropped with a `warn!`.

use crate::context;
use tracing::warn;

/// Content type used when a handler does not set one
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Status, type, headers and body accumulated during one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseState {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` of the body
    pub content_type: String,
    /// Body bytes
    pub body: Vec<u8>,
    /// Extra headers in insertion order, original case preserved
    pub headers: Vec<(String, String)>,
    /// Set by `send_status`: a terminal response with no body expected.
    /// `send` leaves it open for `send_content` appends.
    pub finalized: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: Vec::new(),
            headers: Vec::new(),
            finalized: false,
        }
    }
}

impl ResponseState {
    /// The fixed response for a handler that panicked.
    #[must_use]
    pub fn internal_error() -> Self {
        Self {
            status: 500,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: b"Internal Server Error".to_vec(),
            headers: Vec::new(),
            finalized: true,
        }
    }

    /// Status only: `text/plain`, empty body.
    pub fn send_status(&mut self, code: u16) {
        self.status = code;
        self.content_type = DEFAULT_CONTENT_TYPE.to_string();
        self.body.clear();
        self.finalized = true;
    }

    /// Replace status, content type and body.
    pub fn send(&mut self, code: u16, content_type: &str, body: impl AsRef<[u8]>) {
        self.status = code;
        self.content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type.to_string()
        };
        self.body.clear();
        self.body.extend_from_slice(body.as_ref());
        self.finalized = false;
    }

    /// Set a header, replacing any existing one with the same name.
    pub fn send_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Append to the body.
    pub fn send_content(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8, lossily
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn write(op: &'static str, f: impl FnOnce(&mut ResponseState)) {
    if context::with_response(f).is_none() {
        warn!(operation = op, "Response write outside of a dispatch ignored");
    }
}

/// `send_status(code)` on the current dispatch
pub fn send_status(code: u16) {
    write("send_status", |r| r.send_status(code));
}

/// `send(code, type, body)` on the current dispatch
pub fn send(code: u16, content_type: &str, body: impl AsRef<[u8]>) {
    write("send", |r| r.send(code, content_type, body));
}

/// `send_header(name, value)` on the current dispatch
pub fn send_header(name: &str, value: &str) {
    write("send_header", |r| r.send_header(name, value));
}

/// `send_content(chunk)` on the current dispatch
pub fn send_content(chunk: impl AsRef<[u8]>) {
    write("send_content", |r| r.send_content(chunk));
}

/// Accepted for firmware compatibility; the length is always derived from
/// the final body.
pub fn set_content_length(_len: usize) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{bind, RequestContext};
    use http::Method;
    use std::sync::Arc;

    #[test]
    fn defaults() {
        let r = ResponseState::default();
        assert_eq!(r.status, 200);
        assert_eq!(r.content_type, "text/plain");
        assert!(r.body.is_empty());
        assert!(r.headers.is_empty());
        assert!(!r.finalized);
    }

    #[test]
    fn last_send_wins() {
        let mut r = ResponseState::default();
        r.send(200, "text/html", "first");
        r.send(404, "application/json", "{}");
        assert_eq!(r.status, 404);
        assert_eq!(r.content_type, "application/json");
        assert_eq!(r.body_text(), "{}");
        assert!(!r.finalized);
    }

    #[test]
    fn empty_content_type_falls_back() {
        let mut r = ResponseState::default();
        r.send(200, "", "x");
        assert_eq!(r.content_type, "text/plain");
    }

    #[test]
    fn send_status_clears_body() {
        let mut r = ResponseState::default();
        r.send(200, "text/html", "body");
        r.send_status(204);
        assert_eq!(r.status, 204);
        assert_eq!(r.content_type, "text/plain");
        assert!(r.body.is_empty());
        assert!(r.finalized);
    }

    #[test]
    fn header_upsert_is_case_insensitive() {
        let mut r = ResponseState::default();
        r.send_header("X-Test", "1");
        r.send_header("Cache-Control", "no-cache");
        r.send_header("x-test", "2");
        assert_eq!(r.headers.len(), 2);
        assert_eq!(r.headers[0], ("X-Test".to_string(), "2".to_string()));
        assert_eq!(r.header("X-TEST"), Some("2"));
    }

    #[test]
    fn send_content_appends_after_send() {
        let mut r = ResponseState::default();
        r.send(200, "application/json", "");
        r.send_content("[");
        r.send_content("1]");
        assert_eq!(r.body_text(), "[1]");
        assert_eq!(r.content_type, "application/json");
    }

    #[test]
    fn free_functions_write_bound_response() {
        let scope = bind(RequestContext::new(Method::GET, "/"), Arc::from("r"));
        send(201, "text/html", "<p>");
        send_content("ok</p>");
        send_header("X-A", "b");
        set_content_length(999);
        let r = scope.take_response();
        assert_eq!(r.status, 201);
        assert_eq!(r.body_text(), "<p>ok</p>");
        assert_eq!(r.header("x-a"), Some("b"));
    }

    #[test]
    fn writes_outside_dispatch_are_ignored() {
        send(500, "text/plain", "nobody listens");
        send_status(404);
        send_header("X", "y");
        send_content("z");
    }
}
