use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use coachkit::clock::ManualClock;
use coachkit::config::Config;
use coachkit::profile::{Goal, UserProfile};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn config_with_endpoint(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.generation.endpoint = Some(endpoint.to_string());
    config.generation.timeout_ms = 2000;
    config
}

#[allow(dead_code)]
pub fn profile(goal: Goal) -> UserProfile {
    UserProfile::new("integration-user", goal)
}

#[allow(dead_code)]
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::starting_now())
}
