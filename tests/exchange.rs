//! End-to-end tests for the station/AP frame exchange.
//!
//! Each test spins up real `tokio::net::UdpSocket`s on loopback, runs the
//! AP half in a background task with a zero-latency policy (so no test
//! waits out the simulated 4-second processing pause), and checks the
//! canonical byte-for-byte responses.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use wlan_sim::{
    ap::{responses, AccessPoint},
    frame::{Address, Frame, FrameType},
    latency::LatencyPolicy,
    socket::Socket,
    station::{ExchangeError, Station, HANDSHAKE_PAYLOAD, RETRY_LIMIT},
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bind a socket to an OS-assigned port on loopback.
async fn ephemeral() -> Socket {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    Socket::bind(addr).await.expect("bind failed")
}

/// Spawn an AP with the given latency policy in a background task and
/// return its address.
async fn spawn_ap_with(latency: LatencyPolicy) -> SocketAddr {
    let socket = ephemeral().await;
    let addr = socket.local_addr;
    let ap = AccessPoint::new(socket, latency);
    tokio::spawn(async move {
        let _ = ap.serve().await;
    });
    addr
}

/// Spawn a zero-latency AP in a background task and return its address.
async fn spawn_ap() -> SocketAddr {
    spawn_ap_with(LatencyPolicy::none()).await
}

/// An address with nothing listening behind it: bind a socket for the port,
/// then drop it so every frame sent there vanishes.
async fn silent_addr() -> SocketAddr {
    ephemeral().await.local_addr
}

/// A station aimed at `ap` with test-friendly waits (the default 10 s
/// handshake wait would make the silent-peer tests crawl).
async fn station(ap: SocketAddr, ack_wait: Duration) -> Station {
    Station::new(ephemeral().await, ap)
        .with_ack_wait(ack_wait)
        .with_handshake_wait(ack_wait)
}

/// Send one frame from a throwaway socket and return the AP's reply text.
async fn exchange_raw(frame: &Frame, ap: SocketAddr) -> String {
    let sock = ephemeral().await;
    sock.send_frame(frame, ap).await.expect("send failed");
    let (text, _addr) = tokio::time::timeout(Duration::from_secs(5), sock.recv_text())
        .await
        .expect("no reply from AP")
        .expect("recv failed");
    text
}

fn data_frame(payload: &str) -> Frame {
    Frame::build(FrameType::Data, [Address::EMPTY; 3], payload)
}

// ---------------------------------------------------------------------------
// Canonical per-type responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn association_frame_is_accepted() {
    let ap = spawn_ap().await;
    let frame = Frame::build(FrameType::Association, [Address::EMPTY; 3], "");
    assert_eq!(exchange_raw(&frame, ap).await, "Association Response: Accepted");
}

#[tokio::test]
async fn probe_frame_is_accepted() {
    let ap = spawn_ap().await;
    let frame = Frame::build(FrameType::Probe, [Address::EMPTY; 3], "");
    assert_eq!(exchange_raw(&frame, ap).await, "Probe Response: Accepted");
}

#[tokio::test]
async fn rts_frame_gets_cts() {
    let ap = spawn_ap().await;
    let frame = Frame::build(FrameType::Rts, [Address::EMPTY; 3], "");
    assert_eq!(exchange_raw(&frame, ap).await, "CTS");
}

#[tokio::test]
async fn data_frame_with_correct_fcs_is_acked() {
    let ap = spawn_ap().await;
    assert_eq!(exchange_raw(&data_frame(HANDSHAKE_PAYLOAD), ap).await, "ACK");
}

// ---------------------------------------------------------------------------
// Negative paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forced_bad_fcs_is_rejected() {
    let ap = spawn_ap().await;
    let mut frame = data_frame("whatever the true content");
    frame.fcs = 0xDEADBEEF;
    assert_eq!(exchange_raw(&frame, ap).await, "Error: FCS Mismatch");
}

#[tokio::test]
async fn invalid_type_is_rejected_before_dispatch() {
    let ap = spawn_ap().await;
    let mut frame = data_frame("");
    frame.kind = 0xFF;
    // An invalid type must short-circuit: the reply is the type error even
    // though this frame's FCS would not verify either.
    assert_eq!(exchange_raw(&frame, ap).await, "Error: Invalid Frame Type");
}

#[tokio::test]
async fn every_undefined_type_byte_is_rejected() {
    let ap = spawn_ap().await;
    for kind in [0x03u8, 0x0F, 0x11, 0x7F, 0xFF] {
        let mut frame = data_frame("");
        frame.kind = kind;
        assert_eq!(
            exchange_raw(&frame, ap).await,
            "Error: Invalid Frame Type",
            "type byte {kind:#04x}"
        );
    }
}

#[tokio::test]
async fn ap_skips_malformed_datagrams_and_keeps_serving() {
    let ap = spawn_ap().await;
    let sock = ephemeral().await;

    // Not a frame; the AP must ignore it without replying or dying.
    sock.send_text("not a frame", ap).await.unwrap();

    let frame = Frame::build(FrameType::Probe, [Address::EMPTY; 3], "");
    sock.send_frame(&frame, ap).await.unwrap();
    let (text, _) = tokio::time::timeout(Duration::from_secs(5), sock.recv_text())
        .await
        .expect("AP stopped serving after malformed datagram")
        .unwrap();
    assert_eq!(text, responses::PROBE_ACCEPTED);
}

// ---------------------------------------------------------------------------
// Delay placement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn simulated_delays_follow_the_pipeline() {
    // Wide gaps between the two delays so scheduling noise cannot blur the
    // bounds: replies gated by a sleep can never arrive early, and the
    // upper bounds have half a second of slack or more.
    let processing = Duration::from_millis(500);
    let response = Duration::from_millis(1000);
    let ap = spawn_ap_with(LatencyPolicy::new(processing, response)).await;

    // Invalid type is rejected before the processing delay starts.
    let start = Instant::now();
    let mut frame = data_frame("");
    frame.kind = 0xFF;
    assert_eq!(exchange_raw(&frame, ap).await, "Error: Invalid Frame Type");
    assert!(
        start.elapsed() < processing,
        "type error must not wait out the processing delay"
    );

    // FCS mismatch is detected after the processing delay, and its error
    // reply skips the response delay.
    let start = Instant::now();
    let mut frame = data_frame("");
    frame.fcs = 0xDEADBEEF;
    assert_eq!(exchange_raw(&frame, ap).await, "Error: FCS Mismatch");
    let elapsed = start.elapsed();
    assert!(
        elapsed >= processing,
        "FCS comparison runs after the processing delay, got {elapsed:?}"
    );
    assert!(
        elapsed < processing + response,
        "error replies must skip the response delay, got {elapsed:?}"
    );

    // A dispatch reply waits out both delays.
    let start = Instant::now();
    let frame = Frame::build(FrameType::Rts, [Address::EMPTY; 3], "");
    assert_eq!(exchange_raw(&frame, ap).await, "CTS");
    assert!(
        start.elapsed() >= processing + response,
        "dispatch replies wait for both delays"
    );
}

// ---------------------------------------------------------------------------
// Handshake phase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_completes_against_live_ap() {
    let ap = spawn_ap().await;
    let sta = station(ap, Duration::from_secs(5)).await;
    sta.handshake().await.expect("handshake failed");
}

#[tokio::test]
async fn handshake_outlasts_ap_latency_exceeding_ack_wait() {
    // Scaled-down default deployment: the AP's combined delays exceed the
    // retry phases' ACK wait.  The handshake must still complete, because
    // it waits on its own, more generous clock.
    let ap = spawn_ap_with(LatencyPolicy::new(
        Duration::from_millis(300),
        Duration::from_millis(150),
    ))
    .await;

    let sta = Station::new(ephemeral().await, ap)
        .with_ack_wait(Duration::from_millis(100))
        .with_handshake_wait(Duration::from_secs(5));
    sta.handshake()
        .await
        .expect("handshake must ride out the AP's simulated latency");
}

#[tokio::test]
async fn handshake_timeout_is_fatal() {
    let sta = station(silent_addr().await, Duration::from_millis(100)).await;
    let result = sta.handshake().await;
    assert!(
        matches!(result, Err(ExchangeError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn handshake_aborts_on_unexpected_response() {
    // A fake AP that answers the first frame with the wrong text.
    let sock = ephemeral().await;
    let addr = sock.local_addr;
    tokio::spawn(async move {
        let (_frame, peer) = sock.recv_frame().await.expect("fake AP recv");
        sock.send_text("Nope", peer).await.expect("fake AP send");
    });

    let sta = station(addr, Duration::from_secs(5)).await;
    match sta.handshake().await {
        Err(ExchangeError::UnexpectedResponse { expected, got }) => {
            assert_eq!(expected, responses::ASSOCIATION_ACCEPTED);
            assert_eq!(got, "Nope");
        }
        other => panic!("expected UnexpectedResponse, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Bulk transfer with retries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_transfer_all_acked_first_try() {
    let ap = spawn_ap().await;
    let sta = station(ap, Duration::from_secs(5)).await;

    let outcomes = sta.bulk_transfer(5).await.expect("bulk transfer failed");
    assert_eq!(outcomes.len(), 5);
    for outcome in &outcomes {
        assert!(outcome.acked, "frame {} not acked", outcome.frame_no);
        assert_eq!(outcome.attempts, 1, "frame {} retried", outcome.frame_no);
    }
}

#[tokio::test]
async fn silent_peer_exhausts_retry_budget_then_proceeds() {
    let sta = station(silent_addr().await, Duration::from_millis(100)).await;

    let outcomes = sta.bulk_transfer(2).await.expect("bulk must not error out");
    assert_eq!(outcomes.len(), 2, "run must continue past a dead frame");
    for outcome in &outcomes {
        assert!(!outcome.acked);
        assert_eq!(outcome.attempts, RETRY_LIMIT);
    }
}

#[tokio::test]
async fn non_ack_reply_counts_as_a_miss() {
    // A fake AP that always answers with the FCS error text; the station
    // must treat it like a dropped ACK and burn its retry budget.
    let sock = ephemeral().await;
    let addr = sock.local_addr;
    tokio::spawn(async move {
        loop {
            let Ok((_frame, peer)) = sock.recv_frame().await else {
                break;
            };
            let _ = sock.send_text(responses::FCS_MISMATCH, peer).await;
        }
    });

    let sta = station(addr, Duration::from_secs(2)).await;
    let outcomes = sta.bulk_transfer(1).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].acked);
    assert_eq!(outcomes[0].attempts, RETRY_LIMIT);
}

// ---------------------------------------------------------------------------
// Scripted scenarios and the full session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn negative_scenarios_complete_against_live_ap() {
    let ap = spawn_ap().await;
    let sta = station(ap, Duration::from_secs(5)).await;

    sta.probe_bad_fcs().await.expect("bad-FCS probe failed");
    sta.scenario_corrupted_fcs().await.expect("corrupted-FCS scenario failed");
    sta.scenario_invalid_type().await.expect("invalid-type scenario failed");
}

#[tokio::test]
async fn full_scripted_session_succeeds() {
    let ap = spawn_ap().await;
    let sta = station(ap, Duration::from_secs(5)).await;
    sta.run().await.expect("scripted session failed");
}
