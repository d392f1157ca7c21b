use crate::response::ResponseState;
use std::io::Cursor;
use tracing::warn;

/// Headers the transport owns; handler values for them are not forwarded.
const TRANSPORT_HEADERS: [&str; 3] = ["content-length", "transfer-encoding", "content-type"];

/// Convert an accumulated response into a `tiny_http` response.
///
/// `Content-Type` comes from the `send` type and `Content-Length` from the
/// body, whatever the handler put in its own headers.
#[must_use]
pub fn into_http_response(state: ResponseState) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let mut response = tiny_http::Response::from_data(state.body).with_status_code(state.status);

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], state.content_type.as_bytes()) {
        Ok(h) => response.add_header(h),
        Err(()) => warn!(content_type = %state.content_type, "Invalid content type dropped"),
    }

    for (name, value) in &state.headers {
        if TRANSPORT_HEADERS
            .iter()
            .any(|t| name.eq_ignore_ascii_case(t))
        {
            continue;
        }
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(h) => response.add_header(h),
            Err(()) => warn!(header = %name, "Invalid response header dropped"),
        }
    }
    response
}

/// The fixed response for an unmatched `(path, method)`: 404, empty body
#[must_use]
pub fn not_found() -> tiny_http::Response<Cursor<Vec<u8>>> {
    tiny_http::Response::from_data(Vec::new()).with_status_code(404)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_body_carry_over() {
        let mut state = ResponseState::default();
        state.send(201, "application/json", "{}");
        let resp = into_http_response(state);
        assert_eq!(resp.status_code().0, 201);
        assert_eq!(resp.data_length(), Some(2));
    }

    #[test]
    fn handler_framing_headers_are_ignored() {
        let mut state = ResponseState::default();
        state.send_header("Content-Length", "999");
        state.send_header("Content-Type", "image/png");
        state.send_header("X-Keep", "yes");
        state.send(200, "text/html", "abc");
        let resp = into_http_response(state);
        assert_eq!(resp.data_length(), Some(3));
        let types: Vec<_> = resp
            .headers()
            .iter()
            .filter(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string())
            .collect();
        assert_eq!(types, vec!["text/html".to_string()]);
        assert!(resp.headers().iter().any(|h| h.field.equiv("X-Keep")));
    }

    #[test]
    fn not_found_is_empty() {
        let resp = not_found();
        assert_eq!(resp.status_code().0, 404);
        assert_eq!(resp.data_length(), Some(0));
    }
}
