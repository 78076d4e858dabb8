//! Engine configuration
//!
//! Board dimensions, drop timing and randomizer choice. Values come from
//! `Default`, the `wide()` preset, or `HEXON_*` environment variables.

use thiserror::Error;

use crate::rng::Randomizer;
use crate::types::{
    BASE_DROP_MS, DEFAULT_COLS, DEFAULT_ROWS, DROP_INTERVAL_FLOOR_MS, SPAWN_SPAN, WIDE_COLS,
    WIDE_ROWS,
};

/// Largest board dimension.
///
/// Coordinates are `i8`; an anchor on the last column plus a two-cell kick and
/// a three-cell shape offset must still fit.
pub const MAX_DIMENSION: u8 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board needs at least {min} columns to fit the spawn span, got {cols}")]
    TooNarrow { cols: u8, min: u8 },
    #[error("board needs at least 2 rows, got {0}")]
    TooShort(u8),
    #[error("board dimension {0} exceeds {}", MAX_DIMENSION)]
    TooLarge(u8),
    #[error("drop interval floor must be non-zero")]
    ZeroFloor,
    #[error("drop interval floor {floor_ms}ms is above the initial interval {initial_ms}ms")]
    FloorAboveInitial { floor_ms: u32, initial_ms: u32 },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub rows: u8,
    pub cols: u8,
    /// Drop interval at level 1
    pub initial_drop_ms: u32,
    /// Interval never goes below this
    pub drop_floor_ms: u32,
    pub randomizer: Randomizer,
    /// Spawn the previewed piece instead of drawing a fresh one.
    ///
    /// Off by default: the preview is display-only and every spawn draws anew.
    pub commit_preview: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            initial_drop_ms: BASE_DROP_MS,
            drop_floor_ms: DROP_INTERVAL_FLOOR_MS,
            randomizer: Randomizer::Uniform,
            commit_preview: false,
        }
    }
}

impl EngineConfig {
    /// 24x14 preset
    pub fn wide() -> Self {
        Self {
            rows: WIDE_ROWS,
            cols: WIDE_COLS,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows > MAX_DIMENSION {
            return Err(ConfigError::TooLarge(self.rows));
        }
        if self.cols > MAX_DIMENSION {
            return Err(ConfigError::TooLarge(self.cols));
        }
        if self.cols < SPAWN_SPAN {
            return Err(ConfigError::TooNarrow {
                cols: self.cols,
                min: SPAWN_SPAN,
            });
        }
        if self.rows < 2 {
            return Err(ConfigError::TooShort(self.rows));
        }
        if self.drop_floor_ms == 0 {
            return Err(ConfigError::ZeroFloor);
        }
        if self.drop_floor_ms > self.initial_drop_ms {
            return Err(ConfigError::FloorAboveInitial {
                floor_ms: self.drop_floor_ms,
                initial_ms: self.initial_drop_ms,
            });
        }
        Ok(())
    }

    /// Read `HEXON_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (missing keys keep their defaults)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("HEXON_ROWS") {
            config.rows = parse_value("HEXON_ROWS", &v)?;
        }
        if let Some(v) = lookup("HEXON_COLS") {
            config.cols = parse_value("HEXON_COLS", &v)?;
        }
        if let Some(v) = lookup("HEXON_DROP_MS") {
            config.initial_drop_ms = parse_value("HEXON_DROP_MS", &v)?;
        }
        if let Some(v) = lookup("HEXON_DROP_FLOOR_MS") {
            config.drop_floor_ms = parse_value("HEXON_DROP_FLOOR_MS", &v)?;
        }
        if let Some(v) = lookup("HEXON_RANDOMIZER") {
            config.randomizer =
                Randomizer::from_str(&v).ok_or_else(|| ConfigError::InvalidValue {
                    key: "HEXON_RANDOMIZER",
                    value: v.clone(),
                })?;
        }
        if let Some(v) = lookup("HEXON_COMMIT_PREVIEW") {
            config.commit_preview = parse_flag("HEXON_COMMIT_PREVIEW", &v)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Parse a boolean flag ("1"/"true"/"yes" or "0"/"false"/"no")
pub fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
