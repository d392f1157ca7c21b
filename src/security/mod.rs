//! # Security Module
//!
//! HTTP Basic authentication (RFC 7617) as firmware handlers use it.
//!
//! ## Overview
//!
//! There is no policy layer here: routes are never protected automatically.
//! A handler asks the question itself and decides what to do with the answer:
//!
//! ```rust,ignore
//! server.on("/secure", {
//!     let s = server.current();
//!     move || {
//!         if !s.authenticate("admin", "secret") {
//!             return s.request_authentication();
//!         }
//!         s.send(200, "text/plain", "welcome");
//!     }
//! });
//! ```
//!
//! ## Decoding
//!
//! The header must start with the literal `Basic ` prefix. The remainder is
//! decoded as standard Base64 up to the first character outside the alphabet;
//! padding and trailing garbage end the credential rather than rejecting it.
//! Every malformed form (missing prefix, nothing decodable, no `:`) is simply
//! an authentication failure.

mod basic;

pub use basic::{
    authenticate, challenge_header, request_authentication, BasicCredentials, BASIC_PREFIX,
    UNAUTHORIZED_BODY,
};
