//! Access-point responder.
//!
//! The AP owns one datagram socket and serves frames one at a time, end to
//! end, with no state carried between datagrams.  Each received frame moves
//! through a fixed pipeline:
//!
//! ```text
//!  receive ─▶ decode ─▶ type check ─▶ processing delay ─▶ FCS check ─▶ dispatch ─▶ response delay ─▶ reply
//!                │           │                                │
//!                │           └─▶ "Error: Invalid Frame Type"  └─▶ "Error: FCS Mismatch"
//!                └─▶ log + keep listening (malformed datagram)
//! ```
//!
//! The processing delay models a slow AP and fires exactly once per
//! type-validated frame, *before* the FCS comparison — so stations see it
//! on the mismatch path too.  Error replies go out immediately; only
//! dispatch replies wait out the shorter response delay.

use std::net::SocketAddr;

use crate::frame::{Frame, FrameType};
use crate::latency::LatencyPolicy;
use crate::socket::{Socket, SocketError};

/// Canonical response strings.
///
/// These cross the wire byte-for-byte and stations compare them with exact
/// string equality, so they are the protocol's entire response vocabulary.
pub mod responses {
    pub const ASSOCIATION_ACCEPTED: &str = "Association Response: Accepted";
    pub const PROBE_ACCEPTED: &str = "Probe Response: Accepted";
    pub const CTS: &str = "CTS";
    pub const ACK: &str = "ACK";
    pub const INVALID_FRAME_TYPE: &str = "Error: Invalid Frame Type";
    pub const FCS_MISMATCH: &str = "Error: FCS Mismatch";
    /// Fallback for a dispatch call on an unvalidated type byte; the serve
    /// loop's type check makes this unreachable in the live protocol.
    pub const UNKNOWN_FRAME_TYPE: &str = "Unknown Frame Type";
}

/// Map a validated frame-type byte to its dispatch reply.
pub fn response_for(kind: u8) -> &'static str {
    match FrameType::from_byte(kind) {
        Some(FrameType::Association) => responses::ASSOCIATION_ACCEPTED,
        Some(FrameType::Probe) => responses::PROBE_ACCEPTED,
        Some(FrameType::Rts) => responses::CTS,
        Some(FrameType::Data) => responses::ACK,
        None => responses::UNKNOWN_FRAME_TYPE,
    }
}

// ---------------------------------------------------------------------------
// AccessPoint
// ---------------------------------------------------------------------------

/// A running access point: socket plus simulated-latency policy.
#[derive(Debug)]
pub struct AccessPoint {
    socket: Socket,
    latency: LatencyPolicy,
}

impl AccessPoint {
    pub fn new(socket: Socket, latency: LatencyPolicy) -> Self {
        Self { socket, latency }
    }

    /// Address the AP is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr
    }

    /// Serve frames until the socket fails.
    ///
    /// Malformed datagrams (wrong size, zero-length) are logged and
    /// skipped; everything that decodes gets a reply.  Only I/O errors end
    /// the loop.
    pub async fn serve(&self) -> Result<(), SocketError> {
        log::info!("[ap] listening on {}", self.socket.local_addr);
        loop {
            let (frame, peer) = match self.socket.recv_frame().await {
                Ok(recv) => recv,
                Err(SocketError::Frame(e)) => {
                    log::warn!("[ap] ignoring malformed datagram: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.handle(frame, peer).await?;
        }
    }

    /// Run one frame through the validation/dispatch pipeline and reply.
    async fn handle(&self, frame: Frame, peer: SocketAddr) -> Result<(), SocketError> {
        let Some(kind) = FrameType::from_byte(frame.kind) else {
            log::warn!("[ap] invalid frame type {:#04x} from {peer}", frame.kind);
            return self.socket.send_text(responses::INVALID_FRAME_TYPE, peer).await;
        };

        self.latency.processing_delay().await;

        let expected = frame.expected_fcs();
        if expected != frame.fcs {
            log::warn!(
                "[ap] FCS mismatch from {peer}: expected {expected:#010x}, got {:#010x}",
                frame.fcs
            );
            return self.socket.send_text(responses::FCS_MISMATCH, peer).await;
        }

        match kind {
            FrameType::Data => {
                log::info!("[ap] Data frame from {peer}, payload: {}", frame.payload.as_text());
            }
            other => log::info!("[ap] {other} frame from {peer}"),
        }

        let reply = response_for(frame.kind);
        self.latency.response_delay().await;
        self.socket.send_text(reply, peer).await?;
        log::debug!("[ap] sent {reply:?} to {peer}");
        Ok(())
    }
}
