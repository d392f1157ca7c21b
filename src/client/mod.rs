//! # HTTP Client
//!
//! Blocking outbound GET with the firmware `HTTPClient` call shape:
//!
//! ```rust,no_run
//! use fwsim::client::{HttpClient, HTTP_CODE_OK};
//!
//! let mut http = HttpClient::new();
//! http.set_insecure();
//! http.begin("https://example.com/data.json");
//! http.set_authorization("user", "pass");
//! if http.get() == HTTP_CODE_OK {
//!     let mut stream = http.get_stream();
//!     while let Some(b) = stream.next_byte() {
//!         let _ = b;
//!     }
//! }
//! http.end();
//! ```
//!
//! The whole body is buffered by [`HttpClient::get`]; the stream reads that
//! buffer. Called from a handler, `get` holds the dispatch lock for the
//! duration of the fetch and every other request waits.

mod http_client;
mod stream;

pub use http_client::{HttpClient, DEFAULT_TIMEOUT, HTTP_CODE_OK, HTTP_TRANSPORT_ERROR};
pub use stream::BodyStream;
