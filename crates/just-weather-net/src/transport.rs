//! TCP transport connection
//!
//! Owns at most one socket. A `Transport` is either closed or fully
//! connected; a failed [`Transport::connect`] leaves it closed.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, trace};

use just_weather_core::{Error, Result};

/// A byte source that can be read with a per-call timeout
///
/// Implemented by [`Transport`]; the response decoder only depends on this
/// trait so it can be driven from any source.
pub trait Receive {
    /// Wait up to `timeout` for data and perform one read
    ///
    /// Returns the number of bytes read, which may be less than
    /// `buf.len()`. `Ok(0)` means the peer closed the connection.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

/// A single TCP connection
#[derive(Debug, Default)]
pub struct Transport {
    stream: Option<TcpStream>,
}

impl Transport {
    /// Create a closed transport
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Remote address of the open connection
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    /// Resolve `host` and connect to the first candidate that answers
    ///
    /// Every resolved address (IPv4 and IPv6) is tried in turn, each bounded
    /// by `timeout` through a non-blocking connect and a readiness wait. The
    /// connected socket is switched back to blocking mode.
    pub fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        if host.is_empty() {
            return Err(Error::invalid_argument("host must not be empty"));
        }
        if self.stream.is_some() {
            return Err(Error::invalid_argument("connection is already open"));
        }
        if timeout.is_zero() {
            return Err(Error::invalid_argument("connect timeout must be non-zero"));
        }

        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::connection(format!("failed to resolve {host}: {e}")))?
            .collect();
        if candidates.is_empty() {
            return Err(Error::connection(format!("no addresses found for {host}")));
        }

        let mut last_error = None;
        for addr in candidates {
            debug!(%addr, timeout_ms = timeout.as_millis() as u64, "connecting");
            match connect_candidate(addr, timeout) {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(match last_error {
            Some(Error::Timeout(msg)) => Error::Timeout(msg),
            Some(err) => Error::connection(format!(
                "unable to connect to {host}:{port}: {}",
                err.message()
            )),
            None => Error::connection(format!("unable to connect to {host}:{port}")),
        })
    }

    /// Send every byte of `data`, retrying interrupted writes
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("send on a closed connection"))?;

        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| Error::io(format!("send failed: {e}")))?;
        trace!(bytes = data.len(), "sent");
        Ok(())
    }

    /// Release the socket. Safe to call on a closed transport.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone
            let _ = stream.shutdown(Shutdown::Both);
            trace!("connection closed");
        }
    }
}

impl Receive for Transport {
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("receive on a closed connection"))?;
        if buf.is_empty() {
            return Err(Error::invalid_argument("receive buffer must not be empty"));
        }
        if timeout.is_zero() {
            return Err(Error::invalid_argument("receive timeout must be non-zero"));
        }

        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| Error::io(format!("failed to arm receive timeout: {e}")))?;

        loop {
            match stream.read(buf) {
                Ok(n) => {
                    trace!(bytes = n, "received");
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Err(Error::timeout(format!(
                        "no data received within {} ms",
                        timeout.as_millis()
                    )));
                }
                Err(e) => return Err(Error::io(format!("receive failed: {e}"))),
            }
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

fn connect_candidate(addr: SocketAddr, timeout: Duration) -> Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(|e| Error::connection(format!("failed to open socket for {addr}: {e}")))?;

    // Non-blocking connect followed by a writability wait; the socket is
    // left in blocking mode on success.
    socket
        .connect_timeout(&SockAddr::from(addr), timeout)
        .map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::timeout(format!(
                "connect to {addr} exceeded {} ms",
                timeout.as_millis()
            )),
            _ => Error::connection(format!("connect to {addr} failed: {e}")),
        })?;

    let stream = TcpStream::from(socket);
    stream
        .set_nodelay(true)
        .map_err(|e| Error::connection(format!("failed to set TCP_NODELAY: {e}")))?;
    Ok(stream)
}
