//! Simulated AP processing latency.
//!
//! The original exchange models a slow access point with fixed blocking
//! sleeps: 4 seconds of "processing" once a frame's type has been
//! validated, plus 1 second before a dispatch response goes out.  Those
//! pauses are what make the station's retry path fire.
//!
//! Here the delays are an explicit, injectable policy so tests can run the
//! whole protocol without wall-clock waits ([`LatencyPolicy::none`]) and
//! the CLI can tune them.

use std::time::Duration;

/// Adjustable simulated-delay parameters for the AP.
#[derive(Debug, Clone, Copy)]
pub struct LatencyPolicy {
    /// Pause after type validation, before the FCS comparison.
    pub processing: Duration,
    /// Pause before sending a dispatch response (error replies skip it).
    pub response: Duration,
}

impl LatencyPolicy {
    pub const fn new(processing: Duration, response: Duration) -> Self {
        Self {
            processing,
            response,
        }
    }

    /// No delays at all; the policy used by the test suite.
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Suspend for the processing interval.
    ///
    /// Not cancellable — once started it runs to completion, like the
    /// blocking sleep it stands in for.
    pub async fn processing_delay(&self) {
        pause(self.processing).await;
    }

    /// Suspend for the pre-response interval.
    pub async fn response_delay(&self) {
        pause(self.response).await;
    }
}

impl Default for LatencyPolicy {
    /// The original simulation's timings: 4 s processing, 1 s response.
    fn default() -> Self {
        Self::new(Duration::from_secs(4), Duration::from_secs(1))
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}
