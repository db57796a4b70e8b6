//! Configuration loading
//!
//! Resolution priority:
//! 1. Explicit path passed by the embedding application (highest)
//! 2. `REFOUND_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/refound/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing file at priority 3 silently falls back to defaults; a missing
//! file at priority 1 or 2 is a configuration error, since someone asked
//! for that file specifically. API keys can always be supplied through
//! `REFOUND_GEMINI_API_KEY` / `REFOUND_VISION_API_KEY`, which take
//! precedence over file values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for the matching subsystem.
///
/// All fields have defaults, so a partial TOML file only overrides what it
/// names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Proposals require a score strictly greater than this.
    pub score_threshold: u8,
    /// Candidates further apart than this are skipped before scoring.
    pub max_distance_km: f64,
    /// Window during which a repeated live push for the same
    /// user/notification pair is suppressed.
    pub notification_cooldown_ms: u64,
    /// HTTP timeout for one scorer evaluation.
    pub scorer_timeout_secs: u64,
    /// Event bus channel capacity.
    pub event_capacity: usize,
    pub gemini_api_key: Option<String>,
    pub vision_api_key: Option<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            score_threshold: 70,
            max_distance_km: 40.0,
            notification_cooldown_ms: 5000,
            scorer_timeout_secs: 30,
            event_capacity: 100,
            gemini_api_key: None,
            vision_api_key: None,
        }
    }
}

impl MatchingConfig {
    /// Load configuration following the resolution priority order.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // Priority 1: explicit path
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var("REFOUND_CONFIG") {
            return Self::from_file(Path::new(&path));
        }

        // Priority 3: platform config directory
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // Priority 4: compiled defaults
        Ok(Self::default().with_env_overrides())
    }

    /// Parse a TOML config file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: MatchingConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("REFOUND_GEMINI_API_KEY") {
            if !key.is_empty() {
                self.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("REFOUND_VISION_API_KEY") {
            if !key.is_empty() {
                self.vision_api_key = Some(key);
            }
        }
        self
    }
}

/// Default configuration file location for the platform.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("refound").join("config.toml"))
}
