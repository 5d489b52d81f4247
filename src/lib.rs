//! `wlan-sim` — a simulated 802.11-style frame exchange over UDP.
//!
//! A station (client) sends fixed-layout frames to an access point over a
//! lossy, unordered datagram channel; the AP validates each frame's type
//! and FCS and answers with a short canonical text response.  The station
//! drives a scripted session: handshake, deliberate negative paths, and a
//! bulk transfer with bounded acknowledge/retry semantics.  This is a
//! teaching harness for MAC-style reliability behavior, not a radio stack.
//!
//! # Architecture
//!
//! ```text
//!  ┌───────────┐    frames (574 B)     ┌───────────┐
//!  │  Station  │──────────────────────▶│    AP     │
//!  └─────┬─────┘                       └─────┬─────┘
//!        │       text responses              │
//!        │◀───────────────────────────────────┘
//!        │
//!  ┌─────▼─────────────────────────────┐
//!  │             Socket                │
//!  │ (thin async wrapper around tokio  │
//!  │  UdpSocket: frames out, text in)  │
//!  └───────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`checksum`] — 32-bit FCS (one-at-a-time mixing) + bitstring variant
//! - [`frame`]    — wire format (serialise / deserialise / FCS span)
//! - [`socket`]   — async UDP socket abstraction
//! - [`latency`]  — injectable simulated-delay policy for the AP
//! - [`ap`]       — frame classification, validation, response dispatch
//! - [`station`]  — scripted send/acknowledge/retry exchange driver

pub mod ap;
pub mod checksum;
pub mod frame;
pub mod latency;
pub mod socket;
pub mod station;
