//! Test utilities for Coachkit
//!
//! Shared fixtures for unit tests: temporary data directories, simulated
//! clocks and ready-made profiles.

use crate::clock::ManualClock;
use crate::config::Config;
use crate::error::CoachError;
use crate::profile::{Goal, UserProfile};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Default config whose data directory is `dir`
pub fn temp_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = Some(dir.path().to_path_buf());
    config
}

/// Manual clock frozen at the current time
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::starting_now())
}

/// Profile with an id, a goal and a known weight
pub fn profile(goal: Goal) -> UserProfile {
    UserProfile {
        name: Some("Sam".to_string()),
        weight_kg: Some(70.0),
        ..UserProfile::new("test-user", goal)
    }
}

/// Assert that an error is a `CoachError` whose message contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok, the error is not a `CoachError`, or the
/// message does not contain `expected`
pub fn assert_coach_error_contains<T: std::fmt::Debug>(result: crate::Result<T>, expected: &str) {
    let err = result.expect_err("Expected an error");
    let coach = err
        .downcast_ref::<CoachError>()
        .unwrap_or_else(|| panic!("Expected CoachError, got: {:#}", err));
    let message = coach.to_string();
    assert!(
        message.contains(expected),
        "Error message '{}' does not contain '{}'",
        message,
        expected
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_config_points_at_dir() {
        let dir = temp_dir();
        let config = temp_config(&dir);
        assert_eq!(config.data_dir().unwrap(), dir.path());
    }

    #[test]
    fn test_profile_fixture() {
        let p = profile(Goal::WeightLoss);
        assert_eq!(p.id, "test-user");
        assert_eq!(p.goal, Goal::WeightLoss);
    }

    #[test]
    fn test_assert_coach_error_contains() {
        let result: crate::Result<()> = Err(CoachError::Config("bad value".to_string()).into());
        assert_coach_error_contains(result, "bad value");
    }
}
