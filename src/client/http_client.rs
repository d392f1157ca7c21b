use super::stream::BodyStream;
use std::time::Duration;
use tracing::{debug, warn};

/// Status returned for a successful fetch
pub const HTTP_CODE_OK: i32 = 200;

/// Status returned when no HTTP response was received at all
pub const HTTP_TRANSPORT_ERROR: i32 = 500;

/// Timeout applied until `set_timeout` is called
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Firmware-style blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    url: Option<String>,
    credentials: Option<(String, String)>,
    headers: Vec<(String, String)>,
    timeout: Duration,
    insecure: bool,
    payload: Vec<u8>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: None,
            credentials: None,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
            payload: Vec::new(),
        }
    }

    /// Set the target URL. Always succeeds; bad URLs fail at `get`.
    pub fn begin(&mut self, url: &str) -> bool {
        self.url = Some(url.to_string());
        self.payload.clear();
        true
    }

    /// Send Basic credentials with the next request
    pub fn set_authorization(&mut self, username: &str, password: &str) {
        self.credentials = Some((username.to_string(), password.to_string()));
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Whole-request timeout in milliseconds
    pub fn set_timeout(&mut self, ms: u64) {
        self.timeout = Duration::from_millis(ms);
    }

    /// Skip TLS certificate verification
    pub fn set_insecure(&mut self) {
        self.insecure = true;
    }

    /// Accepted for firmware compatibility; has no effect
    pub fn use_http10(&mut self, _enabled: bool) {}

    /// Perform the GET and buffer the body.
    ///
    /// Returns the response status, or [`HTTP_TRANSPORT_ERROR`] when no
    /// response arrived (no URL, connect/TLS failure, timeout).
    pub fn get(&mut self) -> i32 {
        self.payload.clear();
        let Some(url) = self.url.as_deref() else {
            warn!("HttpClient::get called before begin()");
            return HTTP_TRANSPORT_ERROR;
        };

        match self.fetch(url) {
            Ok((status, body)) => {
                debug!(url = %url, status, body_len = body.len(), "Outbound GET complete");
                self.payload = body;
                i32::from(status)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Outbound GET failed");
                HTTP_TRANSPORT_ERROR
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<(u16, Vec<u8>), reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()?;
        let mut request = client.get(url);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok((status, body))
    }

    /// Stream over the body buffered by the last `get`
    #[must_use]
    pub fn get_stream(&self) -> BodyStream<'_> {
        BodyStream::new(&self.payload)
    }

    /// Body of the last `get` as text (lossy UTF-8)
    #[must_use]
    pub fn get_string(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Release the buffered body
    pub fn end(&mut self) {
        self.payload = Vec::new();
    }
}
