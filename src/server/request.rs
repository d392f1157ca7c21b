use crate::context::RequestContext;
use std::io::Read;
use tracing::{debug, warn};

/// Largest request body read for form parameters (1 MiB)
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Build a [`RequestContext`] from a `tiny_http` request.
///
/// Query parameters come first; for `application/x-www-form-urlencoded`
/// bodies the form fields follow them, so a query value shadows a form value
/// of the same name. Returns `None` when the method is not a valid HTTP token.
pub fn parse_request(req: &mut tiny_http::Request) -> Option<RequestContext> {
    let method = match http::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!(method = %req.method(), "Unsupported request method");
            return None;
        }
    };

    let mut ctx = RequestContext::new(method, req.url());
    ctx.remote_addr = req.remote_addr().copied();
    for header in req.headers() {
        ctx.headers.push((
            header.field.as_str().as_str().to_ascii_lowercase(),
            header.value.as_str().to_string(),
        ));
    }

    let is_form = ctx
        .header("content-type")
        .is_some_and(|ct| ct.trim_start().starts_with(FORM_CONTENT_TYPE));
    if is_form {
        let mut body = Vec::new();
        match req
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
        {
            Ok(n) => {
                let before = ctx.params.len();
                ctx.params.extend(
                    url::form_urlencoded::parse(&body)
                        .map(|(k, v)| (k.into_owned(), v.into_owned())),
                );
                debug!(
                    dispatch_id = %ctx.id,
                    body_bytes = n,
                    form_params = ctx.params.len() - before,
                    "Form body parsed"
                );
            }
            Err(e) => warn!(dispatch_id = %ctx.id, error = %e, "Failed to read request body"),
        }
    }

    Some(ctx)
}
