use super::service::AppService;
use crate::error::ServerError;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Listener wrapper around [`tiny_http::Server`]
///
/// Accepts on one thread and serves every request on its own worker thread.
pub struct HttpServer(pub AppService);

/// Handle to a running HTTP server
///
/// Dropping the handle stops the accept loop. Requests already handed to a
/// worker still complete.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    handle: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the listener actually bound (resolves port `0`)
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the server address by attempting TCP connections until successful.
    /// A wildcard bind is reached through the loopback address of its family.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server doesn't become ready within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        let target = match self.addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => {
                SocketAddr::new(Ipv4Addr::LOCALHOST.into(), self.addr.port())
            }
            IpAddr::V6(ip) if ip.is_unspecified() => {
                SocketAddr::new(Ipv6Addr::LOCALHOST.into(), self.addr.port())
            }
            _ => self.addr,
        };
        for _ in 0..50 {
            if TcpStream::connect(target).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting connections and wait for the accept loop to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.server.unblock();
            if handle.join().is_err() {
                error!(addr = %self.addr, "HTTP accept thread panicked");
            }
            info!(addr = %self.addr, "HTTP server stopped");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl HttpServer {
    /// Start the HTTP server on the given address
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind to (e.g., `"0.0.0.0:80"` or `"127.0.0.1:0"`)
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs + std::fmt::Display>(
        self,
        addr: A,
    ) -> Result<ServerHandle, ServerError> {
        let requested = addr.to_string();
        let bind_err = |reason: String| ServerError::Bind {
            addr: requested.clone(),
            reason,
        };

        let target = addr
            .to_socket_addrs()
            .map_err(|e| bind_err(e.to_string()))?
            .next()
            .ok_or_else(|| bind_err("address resolved to nothing".to_string()))?;

        let server = tiny_http::Server::http(target).map_err(|e| bind_err(e.to_string()))?;
        let bound = server.server_addr().to_ip().unwrap_or(target);
        let server = Arc::new(server);

        let service = self.0;
        let accept_server = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("fwsim-accept".to_string())
            .spawn(move || accept_loop(&accept_server, &service))
            .map_err(|e| bind_err(e.to_string()))?;

        info!(addr = %bound, "HTTP server listening");
        Ok(ServerHandle {
            addr: bound,
            server,
            handle: Some(handle),
        })
    }
}

fn accept_loop(server: &tiny_http::Server, service: &AppService) {
    for request in server.incoming_requests() {
        let service = service.clone();
        let spawned = thread::Builder::new()
            .name("fwsim-worker".to_string())
            .spawn(move || service.call(request));
        if let Err(e) = spawned {
            // the request is dropped with the failed closure; tiny_http closes it
            warn!(error = %e, "Failed to spawn worker thread");
        }
    }
    debug!("Accept loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::router::RouteTable;
    use std::io::{Read, Write};

    fn service() -> AppService {
        AppService::new(Arc::new(RouteTable::new()), Arc::new(Dispatcher::new("test")))
    }

    #[test]
    fn wait_ready_then_serves() {
        let handle = HttpServer(service()).start("127.0.0.1:0").unwrap();
        handle.wait_ready().unwrap();

        let mut stream = TcpStream::connect(handle.addr()).unwrap();
        stream
            .write_all(b"GET /nothing HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).unwrap();
        assert!(raw.starts_with("HTTP/1.1 404"), "{raw}");

        handle.stop();
    }

    #[test]
    fn wait_ready_reaches_wildcard_bind() {
        let handle = HttpServer(service()).start("0.0.0.0:0").unwrap();
        assert!(handle.addr().ip().is_unspecified());
        handle.wait_ready().unwrap();
        handle.stop();
    }
}
