//! Configuration structures for the access controller
//!
//! This module contains the controller configuration, its command line surface,
//! the partial configuration file format, and validation logic. Configuration is
//! loaded once at startup and is not part of the controller's runtime behavior.

use super::{BadgeId, DirectoryBackend};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Timing defaults, in milliseconds
pub mod timing {
    /// Minimum time between two reader polls
    pub const SCAN_INTERVAL_MS: u64 = 500;

    /// How long a status message stays on screen before the idle prompt returns
    pub const DISPLAY_MESSAGE_MS: u64 = 1_500;

    /// How long the door stays unlocked after a grant
    pub const DOOR_OPEN_MS: u64 = 5_000;

    /// Deny signal pulse after a denial
    pub const DENY_PULSE_MS: u64 = 700;

    /// Deny signal pulse when the directory cannot be reached
    pub const CONNECTIVITY_PULSE_MS: u64 = 500;

    /// Sleep between two control loop iterations
    pub const TICK_INTERVAL_MS: u64 = 10;

    /// Upper bound on a single directory lookup or audit submission
    pub const NETWORK_TIMEOUT_MS: u64 = 5_000;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "badge-access-controller",
    version,
    about = "Badge Access Controller - gates one door on zone-scoped badge authorization",
    long_about = "Reads badge identifiers, authorizes them against a directory for one configured zone, drives the door and feedback signals, and appends an audit record for every decision.

EXAMPLES:
    # Run against a local directory file, reading badges from stdin
    badge-access-controller --zone IT --directory-file staff.json --audit-log audit.jsonl

    # Use a configuration file
    badge-access-controller --config controller.json

    # Generate configuration template
    badge-access-controller --print-config > controller.json

    # Validate configuration without running
    badge-access-controller --config controller.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Zone this access point enforces
    #[arg(long, help = "Zone name this access point enforces")]
    pub zone: Option<String>,

    /// Admin badge identifier granted without a directory lookup
    #[arg(
        long,
        help = "Admin badge identifier (hex)",
        long_help = "Badge identifier granted access without contacting the directory. Compared case-insensitively. Empty disables the bypass."
    )]
    pub admin_badge: Option<String>,

    /// Directory backend
    #[arg(long, help = "Directory backend (firestore or file)")]
    pub backend: Option<String>,

    /// Local directory JSON file
    #[arg(long, help = "Local directory JSON file (file backend)")]
    pub directory_file: Option<String>,

    /// Local audit JSON-lines file
    #[arg(long, help = "Audit log JSON-lines file (file backend)")]
    pub audit_log: Option<String>,

    /// Firestore project identifier
    #[arg(long, help = "Firestore project identifier")]
    pub firestore_project: Option<String>,

    /// Firestore API key
    #[arg(long, help = "Firestore API key")]
    pub firestore_api_key: Option<String>,

    /// Scan interval override
    #[arg(long, help = "Minimum milliseconds between reader polls")]
    pub scan_interval_ms: Option<u64>,

    /// Display message duration override
    #[arg(long, help = "Milliseconds a status message stays on screen")]
    pub display_message_ms: Option<u64>,

    /// Door open duration override
    #[arg(long, help = "Milliseconds the door stays unlocked after a grant")]
    pub door_open_ms: Option<u64>,

    /// Network timeout override
    #[arg(long, help = "Timeout in milliseconds for directory lookups and audit submissions")]
    pub network_timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Also write logs to daily rolling files in this directory
    #[arg(long, help = "Directory for rolling log files")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running the controller
    #[arg(long, help = "Validate configuration without running the controller")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Timer durations owned by the controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum time between two reader polls
    pub scan_interval_ms: u64,
    /// How long a status message stays on screen
    pub display_message_ms: u64,
    /// How long the door stays unlocked after a grant
    pub door_open_ms: u64,
    /// Deny signal pulse after a denial
    pub deny_pulse_ms: u64,
    /// Deny signal pulse when the directory cannot be reached
    pub connectivity_pulse_ms: u64,
    /// Sleep between control loop iterations
    pub tick_interval_ms: u64,
    /// Timeout applied to every network operation
    pub network_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: timing::SCAN_INTERVAL_MS,
            display_message_ms: timing::DISPLAY_MESSAGE_MS,
            door_open_ms: timing::DOOR_OPEN_MS,
            deny_pulse_ms: timing::DENY_PULSE_MS,
            connectivity_pulse_ms: timing::CONNECTIVITY_PULSE_MS,
            tick_interval_ms: timing::TICK_INTERVAL_MS,
            network_timeout_ms: timing::NETWORK_TIMEOUT_MS,
        }
    }
}

impl TimingConfig {
    /// Minimum time between two reader polls
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    /// How long a status message stays on screen
    pub fn display_message(&self) -> Duration {
        Duration::from_millis(self.display_message_ms)
    }

    /// How long the door stays unlocked
    pub fn door_open(&self) -> Duration {
        Duration::from_millis(self.door_open_ms)
    }

    /// Deny pulse after a denial
    pub fn deny_pulse(&self) -> Duration {
        Duration::from_millis(self.deny_pulse_ms)
    }

    /// Deny pulse on a connectivity failure
    pub fn connectivity_pulse(&self) -> Duration {
        Duration::from_millis(self.connectivity_pulse_ms)
    }

    /// Loop sleep between iterations
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Network operation timeout
    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }
}

/// Names of the directory document fields the controller reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectoryFieldNames {
    /// Given name field
    pub given_name: String,
    /// Family name field
    pub family_name: String,
    /// Array field listing the zones a badge may enter
    pub authorized_zones: String,
}

impl Default for DirectoryFieldNames {
    fn default() -> Self {
        Self {
            given_name: "given_name".to_string(),
            family_name: "family_name".to_string(),
            authorized_zones: "authorized_zones".to_string(),
        }
    }
}

/// Remote Firestore backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FirestoreConfig {
    /// REST API base URL
    pub base_url: String,
    /// Project identifier
    pub project_id: String,
    /// API key appended to every request
    pub api_key: String,
    /// Collection holding one document per badge identifier
    pub directory_collection: String,
    /// Collection audit records are appended to
    pub audit_collection: String,
    /// Document field names
    pub fields: DirectoryFieldNames,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            project_id: String::new(),
            api_key: String::new(),
            directory_collection: "authorized_personnel".to_string(),
            audit_collection: "access_log".to_string(),
            fields: DirectoryFieldNames::default(),
        }
    }
}

/// Local file backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocalBackendConfig {
    /// JSON file mapping badge identifiers to directory entries
    pub directory_path: String,
    /// JSON-lines file audit records are appended to
    pub audit_log_path: String,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            directory_path: "directory.json".to_string(),
            audit_log_path: "audit.jsonl".to_string(),
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Admin badge identifier
    pub admin_badge_id: Option<String>,
    /// Zone this access point enforces
    pub zone: Option<String>,
    /// Timer durations
    pub timing: Option<TimingConfig>,
    /// Directory backend name
    pub backend: Option<String>,
    /// Firestore settings
    pub firestore: Option<FirestoreConfig>,
    /// Local file settings
    pub local: Option<LocalBackendConfig>,
}

/// Configuration for one access point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    /// Badge granted without a directory lookup; empty disables the bypass
    pub admin_badge_id: String,
    /// Zone this access point enforces
    pub zone: String,
    /// Timer durations
    pub timing: TimingConfig,
    /// Directory backend
    pub backend: DirectoryBackend,
    /// Firestore settings
    pub firestore: FirestoreConfig,
    /// Local file settings
    pub local: LocalBackendConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// Backend name did not parse
    #[error("{0}")]
    InvalidBackend(String),

    /// A local directory key is not a badge identifier
    #[error("Invalid badge identifier '{key}' in directory file: {reason}")]
    InvalidDirectoryKey {
        /// Offending key
        key: String,
        /// Why it was rejected
        reason: crate::types::BadgeIdError,
    },
}

/// Validation errors for controller configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Zone name is empty
    #[error("Zone name must not be empty")]
    EmptyZone,

    /// Admin badge identifier is not a valid badge identifier
    #[error("Invalid admin badge identifier '{value}': {reason}")]
    InvalidAdminBadge {
        /// Configured value
        value: String,
        /// Why it was rejected
        reason: crate::types::BadgeIdError,
    },

    /// A duration that must be positive is zero
    #[error("Duration {0} must be greater than 0")]
    ZeroDuration(&'static str),

    /// A backend setting required by the selected backend is missing
    #[error("Backend '{backend}' requires setting '{field}'")]
    MissingBackendSetting {
        /// Selected backend
        backend: DirectoryBackend,
        /// Missing setting
        field: &'static str,
    },
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            admin_badge_id: String::new(),
            zone: "Main".to_string(),
            timing: TimingConfig::default(),
            backend: DirectoryBackend::default(),
            firestore: FirestoreConfig::default(),
            local: LocalBackendConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Self::from_config_file(config_file)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend = match config_file.backend {
            Some(name) => name.parse().map_err(ConfigError::InvalidBackend)?,
            None => defaults.backend,
        };

        Ok(Self {
            admin_badge_id: config_file.admin_badge_id.unwrap_or(defaults.admin_badge_id),
            zone: config_file.zone.unwrap_or(defaults.zone),
            timing: config_file.timing.unwrap_or(defaults.timing),
            backend,
            firestore: config_file.firestore.unwrap_or(defaults.firestore),
            local: config_file.local.unwrap_or(defaults.local),
        })
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) -> Result<(), ConfigError> {
        if let Some(value) = args.zone {
            config.zone = value;
        }
        if let Some(value) = args.admin_badge {
            config.admin_badge_id = value;
        }
        if let Some(value) = args.backend {
            config.backend = value.parse().map_err(ConfigError::InvalidBackend)?;
        }
        if let Some(value) = args.directory_file {
            config.local.directory_path = value;
        }
        if let Some(value) = args.audit_log {
            config.local.audit_log_path = value;
        }
        if let Some(value) = args.firestore_project {
            config.firestore.project_id = value;
        }
        if let Some(value) = args.firestore_api_key {
            config.firestore.api_key = value;
        }
        if let Some(value) = args.scan_interval_ms {
            config.timing.scan_interval_ms = value;
        }
        if let Some(value) = args.display_message_ms {
            config.timing.display_message_ms = value;
        }
        if let Some(value) = args.door_open_ms {
            config.timing.door_open_ms = value;
        }
        if let Some(value) = args.network_timeout_ms {
            config.timing.network_timeout_ms = value;
        }
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.zone.trim().is_empty() {
            return Err(ConfigValidationError::EmptyZone);
        }

        if !self.admin_badge_id.trim().is_empty() {
            BadgeId::parse(&self.admin_badge_id).map_err(|reason| {
                ConfigValidationError::InvalidAdminBadge {
                    value: self.admin_badge_id.clone(),
                    reason,
                }
            })?;
        }

        let durations = [
            ("scan_interval_ms", self.timing.scan_interval_ms),
            ("display_message_ms", self.timing.display_message_ms),
            ("door_open_ms", self.timing.door_open_ms),
            ("deny_pulse_ms", self.timing.deny_pulse_ms),
            ("connectivity_pulse_ms", self.timing.connectivity_pulse_ms),
            ("tick_interval_ms", self.timing.tick_interval_ms),
            ("network_timeout_ms", self.timing.network_timeout_ms),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroDuration(*field));
        }

        match self.backend {
            DirectoryBackend::Firestore => {
                let required = [
                    ("firestore.base_url", &self.firestore.base_url),
                    ("firestore.project_id", &self.firestore.project_id),
                    ("firestore.api_key", &self.firestore.api_key),
                    ("firestore.directory_collection", &self.firestore.directory_collection),
                    ("firestore.audit_collection", &self.firestore.audit_collection),
                ];
                self.require_settings(&required)?;
            }
            DirectoryBackend::File => {
                let required = [
                    ("local.directory_path", &self.local.directory_path),
                    ("local.audit_log_path", &self.local.audit_log_path),
                ];
                self.require_settings(&required)?;
            }
        }

        Ok(())
    }

    fn require_settings(
        &self,
        required: &[(&'static str, &String)],
    ) -> Result<(), ConfigValidationError> {
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ConfigValidationError::MissingBackendSetting {
                backend: self.backend,
                field: *field,
            }),
            None => Ok(()),
        }
    }
}
