//! Bundled demo sketch served by `fwsim serve`.
//!
//! A small firmware program written against [`WebServer`] the way a device
//! sketch would be: `setup()` registers the routes once, then `loop_once()`
//! is called forever.
//!
//! | Route    | Method | Behaviour                                                   |
//! |----------|--------|-------------------------------------------------------------|
//! | `/status`| GET    | `200 OK`                                                    |
//! | `/secure`| GET    | Basic auth `admin`/`secret`, then `welcome`                 |
//! | `/set`   | POST   | `pin`, `val` params; `val == "1"` drives the pin high       |
//! | `/pins`  | GET    | JSON array of pin levels, written with `send_content`       |
//! | `/proxy` | GET    | fetches `url` with [`HttpClient`] and relays the body       |

use crate::client::{HttpClient, HTTP_CODE_OK};
use crate::webserver::WebServer;
use http::Method;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use tracing::info;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

const PROXY_CHUNK: usize = 512;
const PROXY_TIMEOUT_MS: u64 = 5_000;

/// Simulated digital output levels, keyed by pin number
pub type PinMap = BTreeMap<u8, bool>;

/// The demo firmware program
#[derive(Debug, Clone)]
pub struct DemoSketch {
    server: WebServer,
    pins: Arc<Mutex<PinMap>>,
}

impl DemoSketch {
    #[must_use]
    pub fn new(server: WebServer) -> Self {
        Self {
            server,
            pins: Arc::new(Mutex::new(PinMap::new())),
        }
    }

    #[must_use]
    pub fn server(&self) -> &WebServer {
        &self.server
    }

    /// Snapshot of the pin levels
    #[must_use]
    pub fn pins(&self) -> PinMap {
        self.pins.lock().clone()
    }

    /// Register the sketch's routes. Call before `begin()`.
    pub fn setup(&self) {
        let s = self.server.current();
        self.server
            .on("/status", move || s.send(200, "text/plain", "OK"));

        let s = self.server.current();
        self.server.on("/secure", move || {
            if !s.authenticate(ADMIN_USER, ADMIN_PASSWORD) {
                return s.request_authentication();
            }
            s.send(200, "text/plain", "welcome");
        });

        let s = self.server.current();
        let pins = Arc::clone(&self.pins);
        self.server.on_method("/set", Method::POST, move || {
            let Ok(pin) = s.arg("pin").trim().parse::<u8>() else {
                return s.send(400, "text/plain", "invalid pin");
            };
            let level = s.arg("val") == "1";
            pins.lock().insert(pin, level);
            info!(pin, level, "Pin written");
            s.send(200, "text/plain", format!("pin {pin} -> {level}"));
        });

        let s = self.server.current();
        let pins = Arc::clone(&self.pins);
        self.server.on("/pins", move || {
            let snapshot = pins.lock().clone();
            s.send(200, "application/json", "");
            s.send_content("[");
            for (i, (pin, level)) in snapshot.iter().enumerate() {
                if i > 0 {
                    s.send_content(",");
                }
                s.send_content(serde_json::json!({ "pin": pin, "level": level }).to_string());
            }
            s.send_content("]");
        });

        let s = self.server.current();
        self.server.on("/proxy", move || {
            let url = s.arg("url");
            if url.is_empty() {
                return s.send(400, "text/plain", "missing url");
            }
            let mut http = HttpClient::new();
            http.set_insecure();
            http.set_timeout(PROXY_TIMEOUT_MS);
            http.begin(&url);
            let code = http.get();
            if code != HTTP_CODE_OK {
                http.end();
                return s.send(502, "text/plain", format!("upstream returned {code}"));
            }
            s.send(200, "text/plain", "");
            let mut stream = http.get_stream();
            let mut chunk = [0u8; PROXY_CHUNK];
            while let Ok(n) = stream.read(&mut chunk) {
                if n == 0 {
                    break;
                }
                s.send_content(&chunk[..n]);
            }
            http.end();
        });
    }

    /// One iteration of the firmware main loop
    pub fn loop_once(&self) {
        self.server.handle_client();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_registers_all_routes() {
        let sketch = DemoSketch::new(WebServer::new(0));
        sketch.setup();
        assert_eq!(sketch.server().route_count(), 5);
        assert!(sketch.pins().is_empty());
        sketch.loop_once();
    }
}
