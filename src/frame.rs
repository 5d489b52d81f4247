//! Wire-format definitions for simulated 802.11-style frames.
//!
//! Every datagram the station sends to the AP is a [`Frame`].  This module
//! owns:
//! - The on-wire binary layout (fixed 574 bytes, no padding).
//! - Serialising a [`Frame`] into a byte buffer ready for transmission.
//! - Deserialising a received datagram back into a [`Frame`].
//! - Computing the FCS over the type-dependent hashed span.
//!
//! No I/O happens here — this is pure data transformation.  AP responses
//! travel in the other direction as plain text and never use this layout.
//!
//! # Wire format
//!
//! ```text
//! offset  size  field
//!      0     1  type         (frame classification, see FrameType)
//!      1     1  subtype      (reserved, always 0)
//!      2     2  duration_id  (u16 big-endian, reserved)
//!      4    18  address1     (17 usable chars + terminator)
//!     22    18  address2
//!     40    18  address3
//!     58     4  fcs          (u32 big-endian)
//!     62   512  payload      (null-terminated text; Data frames only)
//! ```
//!
//! Total frame size: [`FRAME_LEN`] = 574 bytes.
//!
//! # FCS coverage
//!
//! The FCS is computed with [`crate::checksum::fcs32`] over the 58 header
//! bytes preceding the `fcs` field, plus the logical payload bytes when
//! (and only when) `type` is [`FrameType::Data`].  The hash itself stops at
//! the first zero byte — see the caveat on [`crate::checksum`].

use crate::checksum::fcs32;

/// Byte length of a serialized frame on the wire.
pub const FRAME_LEN: usize = 574;

/// Byte length of the hashed header span (everything before the FCS field).
pub const HEADER_LEN: usize = 58;

/// Capacity of an address field, including the terminator.
pub const ADDR_LEN: usize = 18;

/// Capacity of the payload buffer, including the terminator.
pub const MAX_PAYLOAD: usize = 512;

// Byte offsets of each field within the serialized frame.
const OFF_TYPE: usize = 0;
const OFF_SUBTYPE: usize = 1;
const OFF_DURATION: usize = 2;
const OFF_ADDR1: usize = 4;
const OFF_ADDR2: usize = 22;
const OFF_ADDR3: usize = 40;
const OFF_FCS: usize = 58;
const OFF_PAYLOAD: usize = 62;

// ---------------------------------------------------------------------------
// FrameType
// ---------------------------------------------------------------------------

/// The closed set of frame classifications the AP accepts.
///
/// Any other value on the wire is treated as invalid by the AP's type
/// validation step; the raw byte is kept in [`Frame::kind`] so stations can
/// deliberately craft out-of-range frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    /// Association request.
    Association = 0x00,
    /// Probe request.
    Probe = 0x01,
    /// Request-To-Send.
    Rts = 0x02,
    /// Data frame; the only type whose payload is meaningful.
    Data = 0x10,
}

impl FrameType {
    /// Classify a raw wire byte.  `None` means the type is invalid.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(Self::Association),
            0x01 => Some(Self::Probe),
            0x02 => Some(Self::Rts),
            0x10 => Some(Self::Data),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Association => "Association",
            Self::Probe => "Probe",
            Self::Rts => "RTS",
            Self::Data => "Data",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A fixed-capacity address field: 17 usable characters plus a terminator.
///
/// Addresses are opaque identifiers; the AP never validates them.  Longer
/// input is silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address([u8; ADDR_LEN]);

impl Address {
    /// The all-zero address used when a scenario does not care about one.
    pub const EMPTY: Address = Address([0; ADDR_LEN]);

    /// Build an address from text, truncating past 17 bytes.
    pub fn new(text: &str) -> Self {
        let mut buf = [0u8; ADDR_LEN];
        let n = text.len().min(ADDR_LEN - 1);
        buf[..n].copy_from_slice(&text.as_bytes()[..n]);
        Address(buf)
    }

    /// The raw field bytes, terminator and padding included.
    pub fn raw(&self) -> &[u8; ADDR_LEN] {
        &self.0
    }

    fn from_raw(bytes: &[u8]) -> Self {
        let mut buf = [0u8; ADDR_LEN];
        buf.copy_from_slice(bytes);
        Address(buf)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Owned, bounds-checked payload buffer with logical-length tracking.
///
/// Capacity is [`MAX_PAYLOAD`] bytes including the terminator; text longer
/// than 511 bytes is silently truncated, never rejected.  The logical
/// length is the number of bytes before the terminator.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload {
    buf: [u8; MAX_PAYLOAD],
    len: usize,
}

impl Payload {
    /// An empty payload (all zero bytes, logical length 0).
    pub const fn empty() -> Self {
        Payload {
            buf: [0; MAX_PAYLOAD],
            len: 0,
        }
    }

    /// Copy `text` into a fresh buffer, truncating at 511 bytes.
    pub fn from_text(text: &str) -> Self {
        let mut buf = [0u8; MAX_PAYLOAD];
        let n = text.len().min(MAX_PAYLOAD - 1);
        buf[..n].copy_from_slice(&text.as_bytes()[..n]);
        Payload { buf, len: n }
    }

    /// Rebuild from a received wire region; the logical length is the
    /// number of bytes before the first zero.
    fn from_raw(bytes: &[u8]) -> Self {
        let mut buf = [0u8; MAX_PAYLOAD];
        buf.copy_from_slice(bytes);
        let len = buf.iter().position(|&b| b == 0).unwrap_or(MAX_PAYLOAD);
        Payload { buf, len }
    }

    /// The logical payload bytes (terminator excluded).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The logical payload rendered as text (lossy for non-UTF-8 input).
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn raw(&self) -> &[u8; MAX_PAYLOAD] {
        &self.buf
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Payload({:?}, len={})", self.as_text(), self.len)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A complete protocol frame in host form.
///
/// `kind` holds the raw type byte rather than a [`FrameType`] so that
/// frames with deliberately invalid types can be represented; classify with
/// [`FrameType::from_byte`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw frame-type byte.
    pub kind: u8,
    /// Reserved; always 0, unused by handlers.
    pub subtype: u8,
    /// Reserved; unused by handlers.
    pub duration_id: u16,
    pub address1: Address,
    pub address2: Address,
    pub address3: Address,
    /// Frame Check Sequence; see the module docs for coverage rules.
    pub fcs: u32,
    pub payload: Payload,
}

impl Frame {
    /// Build a frame of the given type with a correctly computed FCS.
    ///
    /// The payload is carried for every type but only enters the hashed
    /// span for [`FrameType::Data`] frames.
    pub fn build(kind: FrameType, addresses: [Address; 3], payload: &str) -> Self {
        let mut frame = Frame {
            kind: kind as u8,
            subtype: 0,
            duration_id: 0,
            address1: addresses[0],
            address2: addresses[1],
            address3: addresses[2],
            fcs: 0,
            payload: Payload::from_text(payload),
        };
        frame.fcs = frame.expected_fcs();
        frame
    }

    /// Recompute the FCS the AP would expect for this frame's contents.
    ///
    /// The stored [`Frame::fcs`] field is not part of the input, so this is
    /// safe to call on received frames without zeroing anything first.
    pub fn expected_fcs(&self) -> u32 {
        fcs32(&self.fcs_input())
    }

    /// Recompute and store the FCS after mutating fields directly.
    pub fn refresh_fcs(&mut self) {
        self.fcs = self.expected_fcs();
    }

    /// The hashed span: header bytes, plus the logical payload for Data
    /// frames.
    fn fcs_input(&self) -> Vec<u8> {
        let mut span = vec![0u8; HEADER_LEN];
        self.write_header(&mut span);
        if self.kind == FrameType::Data as u8 {
            span.extend_from_slice(self.payload.as_bytes());
        }
        span
    }

    fn write_header(&self, buf: &mut [u8]) {
        buf[OFF_TYPE] = self.kind;
        buf[OFF_SUBTYPE] = self.subtype;
        buf[OFF_DURATION..OFF_DURATION + 2].copy_from_slice(&self.duration_id.to_be_bytes());
        buf[OFF_ADDR1..OFF_ADDR1 + ADDR_LEN].copy_from_slice(self.address1.raw());
        buf[OFF_ADDR2..OFF_ADDR2 + ADDR_LEN].copy_from_slice(self.address2.raw());
        buf[OFF_ADDR3..OFF_ADDR3 + ADDR_LEN].copy_from_slice(self.address3.raw());
    }

    /// Serialise this frame into a newly allocated [`FRAME_LEN`]-byte buffer.
    ///
    /// The stored `fcs` field is written as-is; it is the caller's business
    /// whether it is correct (negative-path scenarios force bogus values).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; FRAME_LEN];
        self.write_header(&mut buf);
        buf[OFF_FCS..OFF_FCS + 4].copy_from_slice(&self.fcs.to_be_bytes());
        buf[OFF_PAYLOAD..].copy_from_slice(self.payload.raw());
        buf
    }

    /// Parse a [`Frame`] from a received datagram.
    ///
    /// The buffer must be exactly [`FRAME_LEN`] bytes; anything else is a
    /// [`FrameError::WrongSize`].  The FCS is *not* verified here — that is
    /// the AP's validation step, which needs to answer with a protocol
    /// error rather than drop the frame.
    pub fn decode(buf: &[u8]) -> Result<Self, FrameError> {
        if buf.len() != FRAME_LEN {
            return Err(FrameError::WrongSize { got: buf.len() });
        }

        Ok(Frame {
            kind: buf[OFF_TYPE],
            subtype: buf[OFF_SUBTYPE],
            duration_id: u16::from_be_bytes(buf[OFF_DURATION..OFF_DURATION + 2].try_into().unwrap()),
            address1: Address::from_raw(&buf[OFF_ADDR1..OFF_ADDR1 + ADDR_LEN]),
            address2: Address::from_raw(&buf[OFF_ADDR2..OFF_ADDR2 + ADDR_LEN]),
            address3: Address::from_raw(&buf[OFF_ADDR3..OFF_ADDR3 + ADDR_LEN]),
            fcs: u32::from_be_bytes(buf[OFF_FCS..OFF_FCS + 4].try_into().unwrap()),
            payload: Payload::from_raw(&buf[OFF_PAYLOAD..]),
        })
    }
}

// ---------------------------------------------------------------------------
// FrameError
// ---------------------------------------------------------------------------

/// Errors that can arise when parsing a raw datagram.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// The datagram is not exactly [`FRAME_LEN`] bytes.
    WrongSize { got: usize },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::WrongSize { got } => {
                write!(f, "datagram is {got} bytes, expected {FRAME_LEN}")
            }
        }
    }
}

impl std::error::Error for FrameError {}
