//! Configuration file support for the knobs explorer
//!
//! Loads configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.knobsrc.json` in the working directory
//! 3. `knobs.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::compare::DEFAULT_DIVERGENCE_THRESHOLD;
use crate::knob::Knob;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Content directory used when none is configured
pub const DEFAULT_DATA_DIR: &str = "data";

const RC_FILE: &str = ".knobsrc.json";
const CONFIG_FILE: &str = "knobs.config.json";

/// Largest possible effect level difference
const MAX_DIVERGENCE_THRESHOLD: u32 = 4;

/// Output format names accepted in config files
const FORMATS: &[&str] = &["text", "json", "html"];

/// Knobs configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnobsConfig {
    /// Directory holding the content documents (default: `data`)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Effect level difference that marks a compared metric as divergent (default: 2)
    #[serde(default)]
    pub divergence_threshold: Option<u32>,

    /// Output format when --format is not given (default: text)
    #[serde(default)]
    pub default_format: Option<String>,

    /// Include the empirical evidence section (default: true)
    #[serde(default)]
    pub show_literature: Option<bool>,

    /// Knob keys hidden from the overview
    #[serde(default)]
    pub exclude_knobs: Vec<String>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub divergence_threshold: u32,
    pub default_format: String,
    pub show_literature: bool,
    pub exclude_knobs: Vec<Knob>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl KnobsConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.divergence_threshold {
            if threshold == 0 || threshold > MAX_DIVERGENCE_THRESHOLD {
                anyhow::bail!(
                    "divergence_threshold must be between 1 and {} (got {})",
                    MAX_DIVERGENCE_THRESHOLD,
                    threshold
                );
            }
        }

        if let Some(ref format) = self.default_format {
            if !FORMATS.contains(&format.as_str()) {
                anyhow::bail!(
                    "default_format must be one of {} (got {})",
                    FORMATS.join(", "),
                    format
                );
            }
        }

        if let Some(ref dir) = self.data_dir {
            if dir.as_os_str().is_empty() {
                anyhow::bail!("data_dir must not be empty");
            }
        }

        for key in &self.exclude_knobs {
            key.parse::<Knob>()
                .with_context(|| format!("invalid exclude_knobs entry: {}", key))?;
        }

        Ok(())
    }

    /// Resolve config into the form used by the explorer
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let exclude_knobs = self
            .exclude_knobs
            .iter()
            .map(|k| k.parse::<Knob>())
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedConfig {
            data_dir: self
                .data_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            divergence_threshold: self
                .divergence_threshold
                .unwrap_or(DEFAULT_DIVERGENCE_THRESHOLD),
            default_format: self
                .default_format
                .clone()
                .unwrap_or_else(|| "text".to_string()),
            show_literature: self.show_literature.unwrap_or(true),
            exclude_knobs,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        KnobsConfig::default().resolve()
    }

    /// Knobs shown on the overview, in framework order
    pub fn visible_knobs(&self) -> Vec<Knob> {
        Knob::ALL
            .into_iter()
            .filter(|k| !self.exclude_knobs.contains(k))
            .collect()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.knobsrc.json`
/// 2. `knobs.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(KnobsConfig, PathBuf)>> {
    for name in [RC_FILE, CONFIG_FILE] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<KnobsConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: KnobsConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found. A relative `data_dir` from a
/// config file is taken relative to that file's directory.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (KnobsConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    if let Some(ref path) = source_path {
        if config.data_dir.is_some() && resolved.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                resolved.data_dir = parent.join(&resolved.data_dir);
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
    }
    resolved.config_path = source_path;
    Ok(resolved)
}
