//! Configuration for the tidewm core
//!
//! Loads configuration from a TOML file at `~/.config/tidewm/config.toml`.
//! Auto-generates a default config file on first run if missing. The parsed
//! object is handed to [`crate::wm::WindowManager`] at construction; the
//! core never re-reads it at runtime.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of toplevels in a workspace's master list (>= 1).
    pub master_count: usize,

    /// Lower bound for any interactively resized dimension, in pixels.
    pub min_toplevel_size: u32,

    /// Geometry-change animations enabled?
    pub animations: bool,

    /// Duration of a geometry-change animation, in milliseconds.
    pub animation_duration_ms: u32,

    /// Opacity applied to the focused toplevel, unless a rule overrides it.
    pub active_opacity: f32,

    /// Opacity applied to unfocused toplevels, unless a rule overrides it.
    pub inactive_opacity: f32,

    /// Number of workspaces created per output.
    pub workspaces_per_output: u32,

    /// Window rules, evaluated first-match-wins.
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_count: 1,
            min_toplevel_size: 10,
            animations: false,
            animation_duration_ms: 300,
            active_opacity: 1.0,
            inactive_opacity: 1.0,
            workspaces_per_output: 4,
            rules: RulesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if the file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);

        Ok(config.sanitized())
    }

    /// Clamp nonsensical values rather than failing startup.
    pub fn sanitized(mut self) -> Self {
        if self.master_count == 0 {
            warn!("master_count must be >= 1, clamping");
            self.master_count = 1;
        }
        self.active_opacity = self.active_opacity.clamp(0.0, 1.0);
        self.inactive_opacity = self.inactive_opacity.clamp(0.0, 1.0);
        if self.workspaces_per_output == 0 {
            self.workspaces_per_output = 1;
        }
        for rule in &mut self.rules.size {
            if rule.relative_width && rule.width > 100 {
                warn!("relative rule width {}% clamped to 100%", rule.width);
                rule.width = 100;
            }
            if rule.relative_height && rule.height > 100 {
                warn!("relative rule height {}% clamped to 100%", rule.height);
                rule.height = 100;
            }
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("tidewm");

        Ok(config_dir.join("config.toml"))
    }

    fn save_default(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let default_config = Self::default();
        let toml_string = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Ordered window-rule lists. Each rule carries optional app-id and title
/// patterns; absent patterns match everything, present patterns are ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub float: Vec<RuleCondition>,
    pub size: Vec<SizeRuleConfig>,
    pub opacity: Vec<OpacityRuleConfig>,
}

/// Matching half of a window rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleCondition {
    pub app_id: Option<String>,
    pub title: Option<String>,
}

/// Fixed-size rule. Each dimension is either absolute pixels or a
/// percentage of the output's usable area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeRuleConfig {
    #[serde(flatten)]
    pub condition: RuleCondition,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub relative_width: bool,
    #[serde(default)]
    pub relative_height: bool,
}

/// Opacity-pair rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpacityRuleConfig {
    #[serde(flatten)]
    pub condition: RuleCondition,
    pub active: f32,
    pub inactive: f32,
}
