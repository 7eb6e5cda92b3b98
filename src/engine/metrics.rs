//! Engine metrics
//!
//! Counters are emitted through the `metrics` facade. Nothing is recorded
//! unless the host installs a recorder.
//!
//! # Metrics
//!
//! - `coachkit_synthesis_total`: responses produced, labelled by `path`
//!   (`remote` or `local`)
//! - `coachkit_synthesis_duration_seconds`: time spent producing a response
//! - `coachkit_generation_rejected_total`: remote replies discarded, labelled
//!   by `reason` (`error`, `timeout`, `too_short`)
//! - `coachkit_interventions_triggered_total`: interventions opened, labelled
//!   by `mood`
//! - `coachkit_remote_content_total`: remote content fetches, labelled by
//!   `outcome` (`ok`, `error`, `timeout`)
//!
//! # Examples
//!
//! ```
//! use coachkit::engine::metrics::{record_rejection, RejectReason};
//!
//! record_rejection(RejectReason::TooShort);
//! ```

use crate::engine::ResponseSource;
use crate::intent::Mood;
use metrics::{histogram, increment_counter};
use std::time::Duration;

/// Why a remote reply was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Transport, status or decoding failure
    Error,
    /// No reply within the configured timeout
    Timeout,
    /// Reply shorter than the minimum acceptable length
    TooShort,
}

impl RejectReason {
    /// Metric label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::TooShort => "too_short",
        }
    }
}

/// Outcome of one remote content fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Item received
    Ok,
    /// Provider failed
    Error,
    /// Provider did not answer in time
    Timeout,
}

impl FetchOutcome {
    /// Metric label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

/// Records one produced response
pub fn record_synthesis(source: ResponseSource, elapsed: Duration) {
    increment_counter!("coachkit_synthesis_total", "path" => source.as_str());
    histogram!(
        "coachkit_synthesis_duration_seconds",
        elapsed.as_secs_f64(),
        "path" => source.as_str()
    );
}

/// Records one discarded remote reply
pub fn record_rejection(reason: RejectReason) {
    increment_counter!("coachkit_generation_rejected_total", "reason" => reason.as_str());
}

/// Records one opened intervention
pub fn record_intervention(mood: Mood) {
    increment_counter!("coachkit_interventions_triggered_total", "mood" => mood.as_str());
}

/// Records one remote content fetch
pub fn record_content_fetch(outcome: FetchOutcome) {
    increment_counter!("coachkit_remote_content_total", "outcome" => outcome.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(RejectReason::TooShort.as_str(), "too_short");
        assert_eq!(FetchOutcome::Timeout.as_str(), "timeout");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_synthesis(ResponseSource::Local, Duration::from_millis(3));
        record_rejection(RejectReason::Error);
        record_intervention(Mood::Sad);
        record_content_fetch(FetchOutcome::Ok);
    }
}
