use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// SQLite database file; the platform data directory is used when absent
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Boundary detection settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Entry acceptance rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Batch persistence settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Status registry settings
    #[serde(default)]
    pub status: StatusConfig,
}

/// Date heading formats understood by the segmenter
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    // @format: 1/2/2020 – Thursday
    UsSlashWithWeekday,
    // @format: 01/02/2020
    UsSlash,
    // @format: 2020-01-02
    Iso,
    // @format: January 2, 2020
    LongMonth,
}

impl DateFormat {
    // @returns: Stable identifier used in logs and config files
    pub fn name(&self) -> &'static str {
        match self {
            Self::UsSlashWithWeekday => "us_slash_with_weekday",
            Self::UsSlash => "us_slash",
            Self::Iso => "iso",
            Self::LongMonth => "long_month",
        }
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DateFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us_slash_with_weekday" => Ok(Self::UsSlashWithWeekday),
            "us_slash" => Ok(Self::UsSlash),
            "iso" => Ok(Self::Iso),
            "long_month" => Ok(Self::LongMonth),
            _ => Err(ConfigError::invalid("segmentation.date_formats", format!("unknown date format '{}'", s))),
        }
    }
}

/// Boundary detection configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Date rules, highest priority first
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<DateFormat>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
        }
    }
}

/// Entry validation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Earliest accepted entry year (inclusive)
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Latest accepted entry year (inclusive)
    #[serde(default = "default_max_year")]
    pub max_year: i32,

    /// Minimum content length in characters (inclusive)
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Maximum content length in characters (inclusive)
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Allowed difference between declared and actual word counts
    #[serde(default = "default_word_count_tolerance")]
    pub word_count_tolerance: usize,

    /// Characters per word at or above which content is treated as garbled
    #[serde(default = "default_suspicious_ratio_threshold")]
    pub suspicious_ratio_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
            min_content_length: default_min_content_length(),
            max_content_length: default_max_content_length(),
            word_count_tolerance: default_word_count_tolerance(),
            suspicious_ratio_threshold: default_suspicious_ratio_threshold(),
        }
    }
}

/// Batch persistence configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersistenceConfig {
    /// Entries committed per batch transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per entry once a batch has fallen back to single inserts
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retry_attempts: default_max_retry_attempts(),
        }
    }
}

/// Progress percentages reported at each stage boundary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCheckpoints {
    pub staged: u8,
    pub extracted: u8,
    pub segmented: u8,
    pub normalized: u8,
    pub validated: u8,
    pub persisted: u8,
}

impl ProgressCheckpoints {
    // @returns: Checkpoints in pipeline order with their names
    pub fn ordered(&self) -> [(&'static str, u8); 6] {
        [
            ("staged", self.staged),
            ("extracted", self.extracted),
            ("segmented", self.segmented),
            ("normalized", self.normalized),
            ("validated", self.validated),
            ("persisted", self.persisted),
        ]
    }
}

impl Default for ProgressCheckpoints {
    fn default() -> Self {
        Self {
            staged: 10,
            extracted: 30,
            segmented: 50,
            normalized: 70,
            validated: 80,
            persisted: 100,
        }
    }
}

/// Status registry configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusConfig {
    /// Age in seconds after which a status record is swept.
    /// Must exceed the longest expected document run.
    #[serde(default = "default_status_ttl_secs")]
    pub ttl_secs: u64,

    /// Stage checkpoints
    #[serde(default)]
    pub checkpoints: ProgressCheckpoints,
}

impl StatusConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_status_ttl_secs(),
            checkpoints: ProgressCheckpoints::default(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_date_formats() -> Vec<DateFormat> {
    vec![
        DateFormat::UsSlashWithWeekday,
        DateFormat::UsSlash,
        DateFormat::Iso,
        DateFormat::LongMonth,
    ]
}

fn default_min_year() -> i32 {
    1900
}

fn default_max_year() -> i32 {
    2100
}

fn default_min_content_length() -> usize {
    10
}

fn default_max_content_length() -> usize {
    50_000
}

fn default_word_count_tolerance() -> usize {
    5
}

fn default_suspicious_ratio_threshold() -> f64 {
    15.0
}

fn default_batch_size() -> usize {
    100
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_status_ttl_secs() -> u64 {
    3600
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segmentation.date_formats.is_empty() {
            return Err(ConfigError::invalid("segmentation.date_formats", "at least one date format is required"));
        }

        let v = &self.validation;
        if v.min_year > v.max_year {
            return Err(ConfigError::invalid(
                "validation.min_year",
                format!("min_year {} is greater than max_year {}", v.min_year, v.max_year),
            ));
        }
        if v.min_content_length > v.max_content_length {
            return Err(ConfigError::invalid(
                "validation.min_content_length",
                format!(
                    "min_content_length {} is greater than max_content_length {}",
                    v.min_content_length, v.max_content_length
                ),
            ));
        }
        if !(v.suspicious_ratio_threshold > 0.0) {
            return Err(ConfigError::invalid(
                "validation.suspicious_ratio_threshold",
                format!("must be positive, got {}", v.suspicious_ratio_threshold),
            ));
        }

        if self.persistence.batch_size == 0 {
            return Err(ConfigError::invalid("persistence.batch_size", "must be at least 1"));
        }
        if self.persistence.max_retry_attempts == 0 {
            return Err(ConfigError::invalid("persistence.max_retry_attempts", "must be at least 1"));
        }

        if self.status.ttl_secs == 0 {
            return Err(ConfigError::invalid("status.ttl_secs", "must be at least 1 second"));
        }

        let mut previous = 0u8;
        for (name, value) in self.status.checkpoints.ordered() {
            if value > 100 {
                return Err(ConfigError::invalid("status.checkpoints", format!("{} checkpoint {} exceeds 100", name, value)));
            }
            if value < previous {
                return Err(ConfigError::invalid(
                    "status.checkpoints",
                    format!("{} checkpoint {} is lower than the previous checkpoint {}", name, value, previous),
                ));
            }
            previous = value;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            database_path: None,
            segmentation: SegmentationConfig::default(),
            validation: ValidationConfig::default(),
            persistence: PersistenceConfig::default(),
            status: StatusConfig::default(),
        }
    }
}
