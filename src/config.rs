//! Configuration management for Coachkit
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Coachkit
///
/// Every section has defaults, so an empty YAML document is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote generation service
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Remote joke and image sources
    #[serde(default)]
    pub content: ContentConfig,
    /// Retrieval and context bounds
    #[serde(default)]
    pub engine: EngineConfig,
    /// Mood intervention behavior
    #[serde(default)]
    pub intervention: InterventionConfig,
    /// Session lifetime
    #[serde(default)]
    pub session: SessionConfig,
    /// Where persistent state lives
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote generation service configuration
///
/// With no endpoint every response is composed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Generation endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request deadline in milliseconds
    #[serde(default = "default_generation_timeout_ms")]
    pub timeout_ms: u64,

    /// Replies shorter than this (after trimming) are discarded
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,
}

fn default_generation_timeout_ms() -> u64 {
    8000
}

fn default_min_response_chars() -> usize {
    50
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_generation_timeout_ms(),
            min_response_chars: default_min_response_chars(),
        }
    }
}

/// Remote content sources used by mood interventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Joke source URL
    #[serde(default)]
    pub joke_url: Option<String>,

    /// Image source URL
    #[serde(default)]
    pub image_url: Option<String>,

    /// Per-source deadline in milliseconds
    #[serde(default = "default_content_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_content_timeout_ms() -> u64 {
    3000
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            joke_url: None,
            image_url: None,
            timeout_ms: default_content_timeout_ms(),
        }
    }
}

/// Engine bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum facts returned by retrieval
    #[serde(default = "default_max_facts")]
    pub max_facts: usize,

    /// Conversation turns handed to the synthesizer
    #[serde(default = "default_conversation_window")]
    pub conversation_window: usize,

    /// Most recent history entries placed in the context
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Conversation turns retained before the oldest are dropped
    #[serde(default = "default_max_conversation_turns")]
    pub max_conversation_turns: usize,
}

fn default_max_facts() -> usize {
    8
}

fn default_conversation_window() -> usize {
    6
}

fn default_history_limit() -> usize {
    5
}

fn default_max_conversation_turns() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_facts: default_max_facts(),
            conversation_window: default_conversation_window(),
            history_limit: default_history_limit(),
            max_conversation_turns: default_max_conversation_turns(),
        }
    }
}

/// Mood intervention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionConfig {
    /// Ratings at or below this open an intervention
    #[serde(default = "default_low_mood_threshold")]
    pub low_mood_threshold: u8,

    /// Seconds without interaction before an open intervention closes itself
    #[serde(default = "default_max_open_seconds")]
    pub max_open_seconds: u64,
}

fn default_low_mood_threshold() -> u8 {
    2
}

fn default_max_open_seconds() -> u64 {
    600
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            low_mood_threshold: default_low_mood_threshold(),
            max_open_seconds: default_max_open_seconds(),
        }
    }
}

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// Minutes before expiry at which a warning is emitted
    #[serde(default = "default_warning_minutes")]
    pub warning_minutes: u64,

    /// Saved interventions kept in the session record
    #[serde(default = "default_max_mood_history")]
    pub max_mood_history: usize,
}

/// Longest accepted session lifetime, one year
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

fn default_ttl_hours() -> u64 {
    24
}

fn default_warning_minutes() -> u64 {
    60
}

fn default_max_mood_history() -> usize {
    50
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            warning_minutes: default_warning_minutes(),
            max_mood_history: default_max_mood_history(),
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the session database and mood journal; the platform
    /// data directory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON-formatted logs
    #[serde(default)]
    pub json_format: bool,

    /// Log file path (if None, STDERR only)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse a YAML config file
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoachError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse a YAML document
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::config::Config;
    ///
    /// let config = Config::from_yaml("engine:\n  max_facts: 4\n").unwrap();
    /// assert_eq!(config.engine.max_facts, 4);
    /// assert_eq!(config.session.ttl_hours, 24);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` if the document is not valid config YAML
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
            .map_err(|e| CoachError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply `COACHKIT_*` environment overrides
    ///
    /// Unparsable numeric values are logged and ignored.
    pub fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("COACHKIT_GENERATION_ENDPOINT") {
            self.generation.endpoint = non_empty(endpoint);
        }

        if let Ok(timeout) = std::env::var("COACHKIT_GENERATION_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse() {
                self.generation.timeout_ms = value;
            } else {
                tracing::warn!("Invalid COACHKIT_GENERATION_TIMEOUT_MS: {}", timeout);
            }
        }

        if let Ok(min_chars) = std::env::var("COACHKIT_MIN_RESPONSE_CHARS") {
            if let Ok(value) = min_chars.parse() {
                self.generation.min_response_chars = value;
            } else {
                tracing::warn!("Invalid COACHKIT_MIN_RESPONSE_CHARS: {}", min_chars);
            }
        }

        if let Ok(joke_url) = std::env::var("COACHKIT_JOKE_URL") {
            self.content.joke_url = non_empty(joke_url);
        }

        if let Ok(image_url) = std::env::var("COACHKIT_IMAGE_URL") {
            self.content.image_url = non_empty(image_url);
        }

        if let Ok(max_facts) = std::env::var("COACHKIT_MAX_FACTS") {
            if let Ok(value) = max_facts.parse() {
                self.engine.max_facts = value;
            } else {
                tracing::warn!("Invalid COACHKIT_MAX_FACTS: {}", max_facts);
            }
        }

        if let Ok(ttl) = std::env::var("COACHKIT_SESSION_TTL_HOURS") {
            if let Ok(value) = ttl.parse() {
                self.session.ttl_hours = value;
            } else {
                tracing::warn!("Invalid COACHKIT_SESSION_TTL_HOURS: {}", ttl);
            }
        }

        if let Ok(data_dir) = std::env::var("COACHKIT_DATA_DIR") {
            self.storage.data_dir = non_empty(data_dir).map(PathBuf::from);
        }

        if let Ok(level) = std::env::var("COACHKIT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
        if cli.offline {
            tracing::debug!("Offline mode requested; remote generation disabled");
            self.generation.endpoint = None;
        }
        if let Some(dir) = &cli.data_dir {
            self.storage.data_dir = Some(dir.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` naming the first failing check
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.generation.endpoint {
            validate_url("generation.endpoint", endpoint)?;
        }
        if self.generation.timeout_ms == 0 {
            return Err(CoachError::Config(
                "generation.timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if let Some(url) = &self.content.joke_url {
            validate_url("content.joke_url", url)?;
        }
        if let Some(url) = &self.content.image_url {
            validate_url("content.image_url", url)?;
        }
        if self.content.timeout_ms == 0 {
            return Err(
                CoachError::Config("content.timeout_ms must be greater than 0".to_string()).into(),
            );
        }

        if self.engine.max_facts == 0 || self.engine.max_facts > 32 {
            return Err(CoachError::Config(format!(
                "engine.max_facts must be between 1 and 32, got {}",
                self.engine.max_facts
            ))
            .into());
        }
        if self.engine.conversation_window == 0 {
            return Err(CoachError::Config(
                "engine.conversation_window must be greater than 0".to_string(),
            )
            .into());
        }
        if self.engine.history_limit == 0 {
            return Err(
                CoachError::Config("engine.history_limit must be greater than 0".to_string())
                    .into(),
            );
        }
        if self.engine.max_conversation_turns < self.engine.conversation_window {
            return Err(CoachError::Config(
                "engine.max_conversation_turns must be at least engine.conversation_window"
                    .to_string(),
            )
            .into());
        }

        if !(1..=5).contains(&self.intervention.low_mood_threshold) {
            return Err(CoachError::Config(format!(
                "intervention.low_mood_threshold must be between 1 and 5, got {}",
                self.intervention.low_mood_threshold
            ))
            .into());
        }
        if self.intervention.max_open_seconds == 0 {
            return Err(CoachError::Config(
                "intervention.max_open_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.ttl_hours == 0 {
            return Err(
                CoachError::Config("session.ttl_hours must be greater than 0".to_string()).into(),
            );
        }
        if self.session.ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(CoachError::Config(format!(
                "session.ttl_hours must be at most {}, got {}",
                MAX_SESSION_TTL_HOURS, self.session.ttl_hours
            ))
            .into());
        }
        if self.session.warning_minutes >= self.session.ttl_hours.saturating_mul(60) {
            return Err(CoachError::Config(
                "session.warning_minutes must be shorter than the session lifetime".to_string(),
            )
            .into());
        }
        if self.session.max_mood_history == 0 {
            return Err(CoachError::Config(
                "session.max_mood_history must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Directory holding the session database and mood journal
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Config` if no directory is configured and the
    /// platform data directory cannot be determined
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("com", "coachkit", "coachkit")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CoachError::Config("Could not determine data directory".into()).into())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| CoachError::Config(format!("{} is not a valid URL: {}", field, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoachError::Config(format!(
            "{} must use http or https, got {}",
            field,
            parsed.scheme()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "COACHKIT_GENERATION_ENDPOINT",
            "COACHKIT_GENERATION_TIMEOUT_MS",
            "COACHKIT_MIN_RESPONSE_CHARS",
            "COACHKIT_JOKE_URL",
            "COACHKIT_IMAGE_URL",
            "COACHKIT_MAX_FACTS",
            "COACHKIT_SESSION_TTL_HOURS",
            "COACHKIT_DATA_DIR",
            "COACHKIT_LOG_LEVEL",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.endpoint, None);
        assert_eq!(config.generation.timeout_ms, 8000);
        assert_eq!(config.generation.min_response_chars, 50);
        assert_eq!(config.engine.max_facts, 8);
        assert_eq!(config.engine.conversation_window, 6);
        assert_eq!(config.intervention.low_mood_threshold, 2);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
generation:
  endpoint: "http://localhost:9000/generate"
intervention:
  low_mood_threshold: 3
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.generation.endpoint.as_deref(),
            Some("http://localhost:9000/generate")
        );
        assert_eq!(config.generation.timeout_ms, 8000);
        assert_eq!(config.intervention.low_mood_threshold, 3);
        assert_eq!(config.intervention.max_open_seconds, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("  \n").unwrap();
        assert_eq!(config.engine.history_limit, 5);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Config::from_yaml("engine: [unclosed").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoachError>(),
            Some(CoachError::Config(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.generation.endpoint = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.generation.endpoint = Some("ftp://example.com/x".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.generation.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.content.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_max_facts_bounds() {
        let mut config = Config::default();
        config.engine.max_facts = 0;
        assert!(config.validate().is_err());
        config.engine.max_facts = 33;
        assert!(config.validate().is_err());
        config.engine.max_facts = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_threshold_range() {
        let mut config = Config::default();
        config.intervention.low_mood_threshold = 0;
        assert!(config.validate().is_err());
        config.intervention.low_mood_threshold = 6;
        assert!(config.validate().is_err());
        config.intervention.low_mood_threshold = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_warning_must_fit_ttl() {
        let mut config = Config::default();
        config.session.ttl_hours = 1;
        config.session.warning_minutes = 60;
        assert!(config.validate().is_err());
        config.session.warning_minutes = 59;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_caps_session_lifetime() {
        let mut config = Config::from_yaml("session:\n  ttl_hours: 10000000000\n").unwrap();
        assert!(config.validate().is_err());

        config.session.ttl_hours = MAX_SESSION_TTL_HOURS;
        assert!(config.validate().is_ok());
        config.session.ttl_hours = MAX_SESSION_TTL_HOURS + 1;
        assert!(config.validate().is_err());

        config.session.ttl_hours = 24;
        config.session.warning_minutes = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_turn_cap_covers_window() {
        let mut config = Config::default();
        config.engine.max_conversation_turns = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("COACHKIT_GENERATION_ENDPOINT", "http://localhost:1234/gen");
        std::env::set_var("COACHKIT_MAX_FACTS", "4");
        std::env::set_var("COACHKIT_SESSION_TTL_HOURS", "2");
        std::env::set_var("COACHKIT_JOKE_URL", "   ");

        let mut config = Config::default();
        config.content.joke_url = Some("http://jokes.local".to_string());
        config.apply_env_vars();
        clear_env();

        assert_eq!(
            config.generation.endpoint.as_deref(),
            Some("http://localhost:1234/gen")
        );
        assert_eq!(config.engine.max_facts, 4);
        assert_eq!(config.session.ttl_hours, 2);
        assert_eq!(config.content.joke_url, None);
    }

    #[test]
    #[serial]
    fn test_invalid_env_numbers_are_ignored() {
        clear_env();
        std::env::set_var("COACHKIT_MAX_FACTS", "many");
        std::env::set_var("COACHKIT_GENERATION_TIMEOUT_MS", "-5");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.engine.max_facts, 8);
        assert_eq!(config.generation.timeout_ms, 8000);
    }

    #[test]
    #[serial]
    fn test_data_dir_env_override() {
        clear_env();
        std::env::set_var("COACHKIT_DATA_DIR", "/tmp/coachkit-test");
        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();
        assert_eq!(
            config.data_dir().unwrap(),
            PathBuf::from("/tmp/coachkit-test")
        );
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "session:\n  max_mood_history: 10\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.session.max_mood_history, 10);
    }
}
