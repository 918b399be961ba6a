//! Packet transport abstraction.
//!
//! A [`Bind`] is the tunnel's view of the network: it opens the listening
//! socket(s), hands back receive functions, and sends batches of datagrams
//! to a peer [`Endpoint`]. Decorators implement `Bind` by wrapping another
//! `Bind`, so they can be stacked and substituted anywhere a plain transport
//! is expected.

pub mod preflight;

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

pub use preflight::{PreflightBind, PreflightStats};

/// Receive function returned by [`Bind::open`].
///
/// Fills `packets[i]` with a datagram, `sizes[i]` with its length and
/// `endpoints[i]` with its source, for `i < n`; returns `n`.
pub type ReceiveFn<E> = Box<
    dyn FnMut(&mut [Vec<u8>], &mut [usize], &mut [Option<E>]) -> io::Result<usize> + Send,
>;

/// A peer address as seen by the transport.
pub trait Endpoint: Send + Sync {
    /// Destination IP of the peer.
    fn dst_ip(&self) -> IpAddr;

    /// Destination rendered for logs.
    fn dst_to_string(&self) -> String {
        self.dst_ip().to_string()
    }
}

impl Endpoint for SocketAddr {
    fn dst_ip(&self) -> IpAddr {
        self.ip()
    }

    fn dst_to_string(&self) -> String {
        self.to_string()
    }
}

/// Send/receive surface of a tunnel transport.
///
/// All methods take `&self`: implementations are shared between the tunnel's
/// send and receive pipelines and handle their own synchronisation.
pub trait Bind: Send + Sync {
    type Endpoint: Endpoint;

    /// Open the transport on `port` (0 = any). Returns the receive functions
    /// and the port actually bound.
    fn open(&self, port: u16) -> io::Result<(Vec<ReceiveFn<Self::Endpoint>>, u16)>;

    fn close(&self) -> io::Result<()>;

    /// Set the platform routing mark (`SO_MARK` / fwmark) on outgoing packets.
    fn set_mark(&self, mark: u32) -> io::Result<()>;

    fn parse_endpoint(&self, s: &str) -> io::Result<Self::Endpoint>;

    /// Preferred number of datagrams per `send`/receive call.
    fn batch_size(&self) -> usize;

    /// Send every buffer in `bufs` to `ep`.
    fn send(&self, bufs: &[Vec<u8>], ep: &Self::Endpoint) -> io::Result<()>;
}

impl<B: Bind + ?Sized> Bind for Arc<B> {
    type Endpoint = B::Endpoint;

    fn open(&self, port: u16) -> io::Result<(Vec<ReceiveFn<Self::Endpoint>>, u16)> {
        (**self).open(port)
    }

    fn close(&self) -> io::Result<()> {
        (**self).close()
    }

    fn set_mark(&self, mark: u32) -> io::Result<()> {
        (**self).set_mark(mark)
    }

    fn parse_endpoint(&self, s: &str) -> io::Result<Self::Endpoint> {
        (**self).parse_endpoint(s)
    }

    fn batch_size(&self) -> usize {
        (**self).batch_size()
    }

    fn send(&self, bufs: &[Vec<u8>], ep: &Self::Endpoint) -> io::Result<()> {
        (**self).send(bufs, ep)
    }
}
