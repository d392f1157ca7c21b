#![allow(dead_code)]

//! Shared fixtures for integration tests: a server on an ephemeral port that
//! stops on drop, a raw HTTP/1.1 client, and a mock upstream for the HTTP client.

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// A parsed HTTP response
    #[derive(Debug, Clone)]
    pub struct RawResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        /// Header value by case-insensitive name
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn header_count(&self, name: &str) -> usize {
            self.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(name))
                .count()
        }
    }

    /// Write `req` verbatim and read until the server closes the connection.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 4096];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::ConnectionReset => break,
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn parse_response(resp: &str) -> RawResponse {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        RawResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }

    /// `METHOD target` with extra header lines and an optional body
    pub fn request(
        addr: &SocketAddr,
        method: &str,
        target: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> RawResponse {
        let mut req = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        for (k, v) in headers {
            req.push_str(&format!("{k}: {v}\r\n"));
        }
        if !body.is_empty() || method == "POST" {
            req.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        req.push_str("\r\n");
        req.push_str(body);
        parse_response(&send_request(addr, &req))
    }

    pub fn get(addr: &SocketAddr, target: &str) -> RawResponse {
        request(addr, "GET", target, &[], "")
    }

    pub fn get_with(addr: &SocketAddr, target: &str, headers: &[(&str, &str)]) -> RawResponse {
        request(addr, "GET", target, headers, "")
    }

    pub fn post(addr: &SocketAddr, target: &str) -> RawResponse {
        request(addr, "POST", target, &[], "")
    }

    pub fn post_form(addr: &SocketAddr, target: &str, form: &str) -> RawResponse {
        request(
            addr,
            "POST",
            target,
            &[("Content-Type", "application/x-www-form-urlencoded")],
            form,
        )
    }
}

pub mod test_server {
    use fwsim::{ServerConfig, WebServer};
    use std::net::SocketAddr;

    /// Test fixture with automatic setup and teardown using RAII
    ///
    /// Binds `127.0.0.1:0`, runs `setup` to register routes, starts serving,
    /// and stops the listener when dropped (even if the test panics).
    pub struct TestServer {
        server: WebServer,
        addr: SocketAddr,
    }

    impl TestServer {
        pub fn start<F: FnOnce(&WebServer)>(setup: F) -> Self {
            Self::start_with_realm(fwsim::config::DEFAULT_REALM, setup)
        }

        pub fn start_with_realm<F: FnOnce(&WebServer)>(realm: &str, setup: F) -> Self {
            let server = WebServer::with_config(ServerConfig {
                bind_addr: "127.0.0.1".to_string(),
                port: 0,
                realm: realm.to_string(),
            });
            setup(&server);
            server.begin().unwrap();
            let addr = server.local_addr().unwrap();
            Self { server, addr }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        pub fn server(&self) -> &WebServer {
            &self.server
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            let _ = self.server.stop();
        }
    }
}

pub mod upstream {
    use std::io::Read;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::thread::JoinHandle;

    /// Request as seen by the mock upstream
    #[derive(Debug, Clone, Default)]
    pub struct SeenRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
    }

    impl SeenRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// A `tiny_http` server answering every request with a fixed status and body
    pub struct MockUpstream {
        server: Arc<tiny_http::Server>,
        addr: SocketAddr,
        seen: Arc<Mutex<Vec<SeenRequest>>>,
        handle: Option<JoinHandle<()>>,
    }

    impl MockUpstream {
        pub fn start(status: u16, body: &str) -> Self {
            let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
            let addr = server.server_addr().to_ip().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let body = body.to_string();
            let handle = {
                let server = Arc::clone(&server);
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || {
                    for mut req in server.incoming_requests() {
                        let mut sink = Vec::new();
                        let _ = req.as_reader().read_to_end(&mut sink);
                        seen.lock().unwrap().push(SeenRequest {
                            url: req.url().to_string(),
                            headers: req
                                .headers()
                                .iter()
                                .map(|h| {
                                    (
                                        h.field.as_str().as_str().to_string(),
                                        h.value.as_str().to_string(),
                                    )
                                })
                                .collect(),
                        });
                        let resp = tiny_http::Response::from_string(body.clone())
                            .with_status_code(status);
                        let _ = req.respond(resp);
                    }
                })
            };
            Self {
                server,
                addr,
                seen,
                handle: Some(handle),
            }
        }

        pub fn url(&self, path: &str) -> String {
            format!("http://{}{}", self.addr, path)
        }

        pub fn seen(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Drop for MockUpstream {
        fn drop(&mut self) {
            self.server.unblock();
            if let Some(h) = self.handle.take() {
                let _ = h.join();
            }
        }
    }
}
