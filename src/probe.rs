//! Decoy probe dispatch.
//!
//! When a handshake initiation leaves the host, a single UDP datagram with a
//! fixed payload is sent to the same peer on a well-known port (443 by
//! default) so the tunnel's first packet is preceded by traffic that looks
//! like something else. The probe is best-effort: it runs on a detached task,
//! is bounded by its own connect and write timeouts, and its outcome is never
//! reported to the sender.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tokio::time::timeout;

/// Default probe destination port.
pub const DEFAULT_PROBE_PORT: u16 = 443;
/// Bound on binding + connecting the probe socket.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(400);
/// Bound on the single payload write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(200);

/// What happened to one probe. Only observable through
/// [`ProbeDispatcher::send_probe`]; detached probes discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Payload handed to the kernel; carries the number of bytes written.
    Sent(usize),
    ConnectFailed,
    ConnectTimedOut,
    WriteFailed,
    WriteTimedOut,
}

/// Sends the configured probe payload to `(peer, port)` over UDP.
///
/// Cloning is cheap: the payload is shared and the runtime handle is
/// reference counted.
#[derive(Debug, Clone)]
pub struct ProbeDispatcher {
    payload: Arc<[u8]>,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
    runtime: Handle,
}

impl ProbeDispatcher {
    /// Create a dispatcher that spawns probe tasks on `runtime`.
    pub fn new(payload: Vec<u8>, port: u16, runtime: Handle) -> Self {
        Self {
            payload: payload.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            runtime,
        }
    }

    /// Override the connect and write bounds.
    pub fn with_timeouts(mut self, connect_timeout: Duration, write_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.write_timeout = write_timeout;
        self
    }

    /// Bytes carried by every side datagram.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Destination port of the side datagram.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Bound on binding and connecting the side socket.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Bound on the single payload write.
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Launch a probe towards `dst` and return immediately.
    ///
    /// Callable from any thread, inside or outside the runtime. The task's
    /// join handle is dropped, which detaches it.
    pub fn dispatch(&self, dst: IpAddr) {
        let probe = self.clone();
        let _detached = self.runtime.spawn(async move {
            let outcome = probe.send_probe(dst).await;
            log::debug!("Preflight probe to {}:{} finished: {:?}", dst, probe.port, outcome);
        });
    }

    /// Send one probe to `dst` and report what happened. Never errors: every
    /// failure is folded into the returned [`ProbeOutcome`].
    ///
    /// The socket lives only inside this call and is closed on every path.
    pub async fn send_probe(&self, dst: IpAddr) -> ProbeOutcome {
        let target = SocketAddr::new(dst, self.port);

        let socket = match timeout(self.connect_timeout, connect(target)).await {
            Ok(Ok(socket)) => socket,
            Ok(Err(e)) => {
                log::debug!("Preflight connect to {} failed: {}", target, e);
                return ProbeOutcome::ConnectFailed;
            }
            Err(_) => return ProbeOutcome::ConnectTimedOut,
        };

        match timeout(self.write_timeout, socket.send(&self.payload)).await {
            Ok(Ok(n)) => ProbeOutcome::Sent(n),
            Ok(Err(e)) => {
                log::debug!("Preflight write to {} failed: {}", target, e);
                ProbeOutcome::WriteFailed
            }
            Err(_) => ProbeOutcome::WriteTimedOut,
        }
    }
}

/// Bind an ephemeral socket of `target`'s family and connect it.
async fn connect(target: SocketAddr) -> io::Result<UdpSocket> {
    let local = match target {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(target).await?;
    Ok(socket)
}
