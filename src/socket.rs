//! Datagram endpoint plumbing.
//!
//! [`Socket`] layers the protocol's two wire shapes over a
//! `tokio::net::UdpSocket`: fixed-size [`crate::frame::Frame`]s travel
//! toward the AP, short response text travels back.  Nothing here looks
//! inside a frame — classification, validation, and the retry policy all
//! live in [`crate::ap`] and [`crate::station`].

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::frame::{Frame, FrameError, FRAME_LEN};

/// Receive buffer size for text responses; responses are short canonical
/// strings, but leave headroom.
const TEXT_BUF: usize = 1024;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failure modes of the datagram endpoint.
#[derive(Debug)]
pub enum SocketError {
    /// The OS rejected or failed the send/receive call.
    Io(std::io::Error),
    /// The received datagram does not parse as a frame.
    Frame(FrameError),
}

impl std::fmt::Display for SocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "socket I/O error: {e}"),
            Self::Frame(e) => write!(f, "frame decode error: {e}"),
        }
    }
}

impl std::error::Error for SocketError {}

impl From<std::io::Error> for SocketError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FrameError> for SocketError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Socket
// ---------------------------------------------------------------------------

/// One bound datagram endpoint.
///
/// Every method takes `&self`, so an AP task and its callers can hold the
/// same socket without locking.
#[derive(Debug)]
pub struct Socket {
    /// The resolved bound address, useful when binding to port 0.
    pub local_addr: SocketAddr,
    inner: UdpSocket,
}

impl Socket {
    /// Bind to `local_addr`; port 0 asks the OS for an ephemeral port.
    pub async fn bind(local_addr: SocketAddr) -> Result<Self, SocketError> {
        let inner = UdpSocket::bind(local_addr).await?;
        let local_addr = inner.local_addr()?;
        Ok(Self { local_addr, inner })
    }

    /// Encode `frame` and send it as a single UDP datagram to `dest`.
    pub async fn send_frame(&self, frame: &Frame, dest: SocketAddr) -> Result<(), SocketError> {
        self.inner.send_to(&frame.encode(), dest).await?;
        Ok(())
    }

    /// Receive the next datagram and decode it into a [`Frame`].
    ///
    /// Returns `(frame, sender_address)`.  Datagrams that fail to decode
    /// (zero-length ones included) are returned as `Err` — the caller
    /// decides whether to keep listening.
    pub async fn recv_frame(&self) -> Result<(Frame, SocketAddr), SocketError> {
        let mut buf = vec![0u8; FRAME_LEN + 1];
        let (n, addr) = self.inner.recv_from(&mut buf).await?;
        let frame = Frame::decode(&buf[..n])?;
        Ok((frame, addr))
    }

    /// Send a plain-text response to `dest`.
    ///
    /// No length prefix or terminator goes on the wire; the receiver infers
    /// the length from the datagram size.
    pub async fn send_text(&self, text: &str, dest: SocketAddr) -> Result<(), SocketError> {
        self.inner.send_to(text.as_bytes(), dest).await?;
        Ok(())
    }

    /// Receive the next datagram as response text.
    ///
    /// Returns `(text, sender_address)`.  Non-UTF-8 bytes are replaced
    /// lossily; canonical responses are pure ASCII so this never matters in
    /// a well-behaved exchange.
    pub async fn recv_text(&self) -> Result<(String, SocketAddr), SocketError> {
        let mut buf = vec![0u8; TEXT_BUF];
        let (n, addr) = self.inner.recv_from(&mut buf).await?;
        Ok((String::from_utf8_lossy(&buf[..n]).into_owned(), addr))
    }
}
