//! Station-side exchange driver.
//!
//! A [`Station`] talks to one AP and exposes the scripted protocol
//! exercises as named, independently invocable scenarios:
//!
//! - [`Station::handshake`] — Association → Probe → RTS → one Data frame;
//!   every step requires the exact canonical reply and any miss is fatal.
//! - [`Station::probe_bad_fcs`] — one frame with a deliberately wrong FCS;
//!   no retry.
//! - [`Station::bulk_transfer`] — sequential data frames with a bounded
//!   retry budget per frame; exhausting it is logged, not fatal.
//! - [`Station::scenario_corrupted_fcs`] / [`Station::scenario_invalid_type`]
//!   — narration-only negative paths.
//! - [`Station::run`] — the full scripted session, in that order.
//!
//! The station never pipelines: one frame is outstanding at a time, and
//! every wait is bounded.  The bulk/negative phases use the short ACK wait
//! that drives the retry policy; the handshake has its own, much more
//! generous wait sized to ride out the AP's full simulated latency (the
//! original blocks unboundedly there).  A retry re-encodes a fresh frame
//! rather than replaying bytes, though the payload is logically the same.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::timeout;

use crate::ap::responses;
use crate::frame::{Address, Frame, FrameType};
use crate::socket::{Socket, SocketError};

/// Maximum transmissions per bulk frame (the first send counts).
pub const RETRY_LIMIT: u32 = 3;

/// How long the retry-driven phases wait for a reply before treating it
/// as a miss.  Deliberately shorter than the AP's default processing
/// delay so the retry path actually fires against a default AP.
pub const ACK_WAIT: Duration = Duration::from_secs(3);

/// How long each handshake exchange waits for its reply.
///
/// The handshake has no retry, so unlike [`ACK_WAIT`] this must outlast
/// the AP's worst-case simulated latency (4 s processing + 1 s response
/// on the defaults); expiry is still fatal.
pub const HANDSHAKE_WAIT: Duration = Duration::from_secs(10);

/// Number of data frames in the scripted bulk-transfer phase.
pub const BULK_FRAMES: u32 = 5;

/// Payload of the handshake phase's data frame.
pub const HANDSHAKE_PAYLOAD: &str = "Hello, this is a data payload";

/// Sentinel FCS for the deliberate-mismatch frames.
const BAD_FCS: u32 = 0xDEAD_BEEF;

/// Number of deliberately broken frames each negative scenario sends.
const SCENARIO_BAD_FRAMES: u32 = 4;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can end a fatal exchange (the handshake phase).
#[derive(Debug)]
pub enum ExchangeError {
    /// Transport-level failure.
    Socket(SocketError),
    /// No reply arrived within the ACK wait.
    Timeout { waited: Duration },
    /// A reply arrived but was not the required canonical string.
    UnexpectedResponse { expected: &'static str, got: String },
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Socket(e) => write!(f, "transport failure: {e}"),
            Self::Timeout { waited } => write!(f, "no response within {waited:?}"),
            Self::UnexpectedResponse { expected, got } => {
                write!(f, "expected {expected:?}, got {got:?}")
            }
        }
    }
}

impl std::error::Error for ExchangeError {}

impl From<SocketError> for ExchangeError {
    fn from(e: SocketError) -> Self {
        Self::Socket(e)
    }
}

// ---------------------------------------------------------------------------
// Bulk-transfer report
// ---------------------------------------------------------------------------

/// Outcome of one bulk-transfer frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    /// 1-based frame number within the bulk phase.
    pub frame_no: u32,
    /// Transmissions performed (1 = acknowledged on the first send).
    pub attempts: u32,
    /// Whether an ACK arrived within the retry budget.
    pub acked: bool,
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// One station endpoint, bound to a local socket and aimed at an AP.
#[derive(Debug)]
pub struct Station {
    socket: Socket,
    ap: SocketAddr,
    ack_wait: Duration,
    handshake_wait: Duration,
}

impl Station {
    pub fn new(socket: Socket, ap: SocketAddr) -> Self {
        Self {
            socket,
            ap,
            ack_wait: ACK_WAIT,
            handshake_wait: HANDSHAKE_WAIT,
        }
    }

    /// Override the ACK wait; tests shrink it to keep runs fast.
    pub fn with_ack_wait(mut self, ack_wait: Duration) -> Self {
        self.ack_wait = ack_wait;
        self
    }

    /// Override the handshake wait.
    pub fn with_handshake_wait(mut self, handshake_wait: Duration) -> Self {
        self.handshake_wait = handshake_wait;
        self
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    /// Handshake phase: Association, Probe, RTS, then one Data frame.
    ///
    /// Each exchange must return its canonical reply within the handshake
    /// wait, which is sized to cover the AP's simulated delays.  There is
    /// no retry here — the first miss aborts the run.
    pub async fn handshake(&self) -> Result<(), ExchangeError> {
        log::info!("[sta] associating with {}", self.ap);
        self.expect(&empty_frame(FrameType::Association), responses::ASSOCIATION_ACCEPTED)
            .await?;
        log::info!("[sta] association successful");

        self.expect(&empty_frame(FrameType::Probe), responses::PROBE_ACCEPTED)
            .await?;
        log::info!("[sta] probe successful");

        self.expect(&empty_frame(FrameType::Rts), responses::CTS).await?;
        log::info!("[sta] CTS received");

        self.expect(&data_frame(HANDSHAKE_PAYLOAD), responses::ACK).await?;
        log::info!("[sta] data transmission successful");
        Ok(())
    }

    /// Send one frame whose FCS is forced to the sentinel value.
    ///
    /// Exercises the AP's mismatch branch.  No retry; the AP's error reply
    /// is drained (bounded wait) and logged so it cannot be mistaken for a
    /// later exchange's answer.
    pub async fn probe_bad_fcs(&self) -> Result<(), SocketError> {
        log::info!("[sta] sending frame with deliberately wrong FCS");
        self.socket.send_frame(&bad_fcs_frame(), self.ap).await?;
        match self.recv_reply().await? {
            Some(text) => log::info!("[sta] access point: {text:?}"),
            None => log::info!("[sta] no reply to bad-FCS frame within {:?}", self.ack_wait),
        }
        Ok(())
    }

    /// Bulk transfer: `frames` sequential data frames, each with up to
    /// [`RETRY_LIMIT`] transmissions.
    ///
    /// A timeout or a non-"ACK" reply counts as a miss and triggers a
    /// resend (a freshly encoded frame with the same payload).  Exhausting
    /// the budget logs a failure and moves on — the run continues.
    pub async fn bulk_transfer(&self, frames: u32) -> Result<Vec<BulkOutcome>, SocketError> {
        let mut outcomes = Vec::with_capacity(frames as usize);

        for frame_no in 1..=frames {
            let payload = format!("Frame {frame_no} data payload");
            let mut attempts = 0;
            let mut acked = false;

            while attempts < RETRY_LIMIT {
                attempts += 1;
                self.socket.send_frame(&data_frame(&payload), self.ap).await?;
                log::debug!("[sta] frame {frame_no}, transmission {attempts}");

                match self.recv_reply().await? {
                    Some(text) if text == responses::ACK => {
                        log::info!("[sta] ACK received for frame {frame_no}");
                        acked = true;
                        break;
                    }
                    Some(text) => {
                        log::warn!("[sta] frame {frame_no}: expected ACK, got {text:?}, retrying");
                    }
                    None => {
                        log::warn!("[sta] frame {frame_no}: no ACK, retrying");
                    }
                }
            }

            if !acked {
                log::warn!(
                    "[sta] no ACK for frame {frame_no} after {attempts} transmissions, \
                     access point may not be available"
                );
            }
            outcomes.push(BulkOutcome {
                frame_no,
                attempts,
                acked,
            });
        }

        Ok(outcomes)
    }

    /// Scenario: one valid data frame, then several corrupted-FCS frames.
    ///
    /// Narration only — replies are logged, nothing is asserted.
    pub async fn scenario_corrupted_fcs(&self) -> Result<(), SocketError> {
        log::info!("[sta] scenario: valid frame followed by corrupted-FCS frames");
        self.narrated_data_frame("Valid payload").await?;

        for n in 1..=SCENARIO_BAD_FRAMES {
            log::info!("[sta] sending corrupted-FCS frame {n}");
            self.socket.send_frame(&bad_fcs_frame(), self.ap).await?;
            if let Some(text) = self.recv_reply().await? {
                log::info!("[sta] access point: {text:?}");
            }
        }
        Ok(())
    }

    /// Scenario: one valid data frame, then several invalid-type frames.
    pub async fn scenario_invalid_type(&self) -> Result<(), SocketError> {
        log::info!("[sta] scenario: valid frame followed by invalid-type frames");
        self.narrated_data_frame("Valid payload").await?;

        for n in 1..=SCENARIO_BAD_FRAMES {
            log::info!("[sta] sending invalid-type frame {n}");
            self.socket.send_frame(&invalid_type_frame(), self.ap).await?;
            if let Some(text) = self.recv_reply().await? {
                log::info!("[sta] access point: {text:?}");
            }
        }
        Ok(())
    }

    /// The full scripted session.
    ///
    /// Only a handshake failure (or a transport failure) is fatal;
    /// everything after the handshake is best-effort narration.
    pub async fn run(&self) -> Result<(), ExchangeError> {
        self.handshake().await?;
        self.probe_bad_fcs().await?;

        let outcomes = self.bulk_transfer(BULK_FRAMES).await?;
        let delivered = outcomes.iter().filter(|o| o.acked).count();
        log::info!("[sta] bulk transfer: {delivered}/{} frames acknowledged", outcomes.len());

        self.scenario_corrupted_fcs().await?;
        self.scenario_invalid_type().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Exchange plumbing
    // -----------------------------------------------------------------------

    /// Wait up to the ACK timeout for any reply.  `None` means the wait
    /// expired; only transport failures are errors.
    async fn recv_reply(&self) -> Result<Option<String>, SocketError> {
        self.recv_reply_within(self.ack_wait).await
    }

    async fn recv_reply_within(&self, wait: Duration) -> Result<Option<String>, SocketError> {
        match timeout(wait, self.socket.recv_text()).await {
            Ok(Ok((text, _addr))) => Ok(Some(text)),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(None),
        }
    }

    /// Send `frame` and require the exact canonical reply within the
    /// handshake wait.
    async fn expect(&self, frame: &Frame, expected: &'static str) -> Result<(), ExchangeError> {
        self.socket.send_frame(frame, self.ap).await?;
        match self.recv_reply_within(self.handshake_wait).await? {
            Some(text) if text == expected => Ok(()),
            Some(got) => Err(ExchangeError::UnexpectedResponse { expected, got }),
            None => Err(ExchangeError::Timeout {
                waited: self.handshake_wait,
            }),
        }
    }

    /// Send one valid data frame and narrate whether it was acknowledged.
    async fn narrated_data_frame(&self, payload: &str) -> Result<(), SocketError> {
        self.socket.send_frame(&data_frame(payload), self.ap).await?;
        match self.recv_reply().await? {
            Some(text) if text == responses::ACK => {
                log::info!("[sta] ACK received for the valid frame");
            }
            Some(text) => log::warn!("[sta] expected ACK for the valid frame, got {text:?}"),
            None => log::warn!("[sta] no ACK for the valid frame"),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Frame builders
// ---------------------------------------------------------------------------

fn empty_frame(kind: FrameType) -> Frame {
    Frame::build(kind, [Address::EMPTY; 3], "")
}

fn data_frame(payload: &str) -> Frame {
    Frame::build(FrameType::Data, [Address::EMPTY; 3], payload)
}

/// A data frame whose FCS is forced to the sentinel, guaranteed wrong.
fn bad_fcs_frame() -> Frame {
    let mut frame = Frame::build(
        FrameType::Data,
        [
            Address::new("AABBCCDDEEFF"),
            Address::new("FFEEDDCCBBAA"),
            Address::new("AABBCCDDEEFF"),
        ],
        "",
    );
    frame.duration_id = 1;
    frame.fcs = BAD_FCS;
    frame
}

/// An otherwise-zero frame carrying a type byte outside the protocol.
fn invalid_type_frame() -> Frame {
    let mut frame = empty_frame(FrameType::Association);
    frame.kind = 0xFF;
    frame
}
