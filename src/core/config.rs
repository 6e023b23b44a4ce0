//! Layered configuration: built-in defaults, an optional JSON file and environment overrides.
//!
//! [`Config`] is constructed once by the binary and passed by reference to every component
//! that needs it. All sections use `#[serde(default)]`, so a partial file only overrides
//! the keys it names.

use crate::core::category::{default_category_patterns, Category, CategoryPattern};
use crate::core::dirs::get_config_directory;
use crate::core::error::{LatentCatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix shared by every recognised environment override
pub const ENV_PREFIX: &str = "LATENT_RESOLUTIONS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionLimits {
    pub min: u32,
    pub max: u32,
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self { min: 64, max: 8192 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            default: 1,
            min: 1,
            max: 64,
        }
    }
}

impl BatchSettings {
    pub fn contains(&self, batch_size: u32) -> bool {
        (self.min..=self.max).contains(&batch_size)
    }

    /// Clamp into bounds, tolerating a misconfigured `min > max`
    pub fn clamp(&self, batch_size: u32) -> u32 {
        batch_size.max(self.min).min(self.max.max(self.min)).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatentSettings {
    pub channels: u32,
    pub scale_factor: u32,
    pub fallback_resolution: u32,
}

impl Default for LatentSettings {
    fn default() -> Self {
        Self {
            channels: 4,
            scale_factor: 8,
            fallback_resolution: 1024,
        }
    }
}

/// Symbols appended to display keys for each usage mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageMarkSymbols {
    pub favorite: String,
    pub frequent: String,
    pub recent: String,
}

impl Default for UsageMarkSymbols {
    fn default() -> Self {
        Self {
            favorite: "★".to_string(),
            frequent: "🔥".to_string(),
            recent: "🕒".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub aspect_ratio_precision: usize,
    pub show_usage_marks: bool,
    pub show_category_prefix: bool,
    pub frequent_threshold: u32,
    pub recent_limit: usize,
    pub usage_marks: UsageMarkSymbols,
    pub category_order: Vec<Category>,
    pub category_patterns: Vec<CategoryPattern>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            aspect_ratio_precision: 2,
            show_usage_marks: true,
            show_category_prefix: false,
            frequent_threshold: 3,
            recent_limit: 5,
            usage_marks: UsageMarkSymbols::default(),
            category_order: Category::ALL.to_vec(),
            category_patterns: default_category_patterns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageSettings {
    pub stats_file: String,
    pub recent_capacity: usize,
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self {
            stats_file: "usage_stats.json".to_string(),
            recent_capacity: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory holding the preset files; defaults to `<config dir>/resolutions`
    pub directory: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            directory: None,
            extensions: vec!["json".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolution_limits: ResolutionLimits,
    pub batch_settings: BatchSettings,
    pub latent_settings: LatentSettings,
    pub display_settings: DisplaySettings,
    pub usage_settings: UsageSettings,
    pub catalog_settings: CatalogSettings,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join("config.json"))
    }

    /// Read a config file, merging its sections over the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LatentCatalogError::config_read_failed(path, e))?;
        serde_json::from_str(&content).map_err(|e| LatentCatalogError::config_parse_failed(path, e))
    }

    /// Build the effective configuration.
    ///
    /// A missing file is not an error. An unreadable or malformed file is logged and the
    /// defaults are used instead. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().ok(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => match Self::from_file(p) {
                Ok(config) => {
                    log::debug!("Loaded configuration from {}", p.display());
                    config
                }
                Err(e) => {
                    log::warn!("{e}; using default configuration");
                    Self::default()
                }
            },
            Some(ref p) => {
                log::debug!("No config file at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(std::env::vars());
        config
    }

    /// Apply `LATENT_RESOLUTIONS_*` overrides from the given variables.
    ///
    /// Takes the variables explicitly so callers and tests control the source.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let applied = match key {
                "MIN_RESOLUTION" => set_parsed(&mut self.resolution_limits.min, &value),
                "MAX_RESOLUTION" => set_parsed(&mut self.resolution_limits.max, &value),
                "DEFAULT_BATCH" => set_parsed(&mut self.batch_settings.default, &value),
                "MIN_BATCH" => set_parsed(&mut self.batch_settings.min, &value),
                "MAX_BATCH" => set_parsed(&mut self.batch_settings.max, &value),
                "CHANNELS" => set_parsed(&mut self.latent_settings.channels, &value),
                "SCALE_FACTOR" => set_parsed(&mut self.latent_settings.scale_factor, &value),
                "FALLBACK_RESOLUTION" => {
                    set_parsed(&mut self.latent_settings.fallback_resolution, &value)
                }
                "ASPECT_RATIO_PRECISION" => {
                    set_parsed(&mut self.display_settings.aspect_ratio_precision, &value)
                }
                "SHOW_USAGE_MARKS" => set_flag(&mut self.display_settings.show_usage_marks, &value),
                "SHOW_CATEGORY_PREFIX" => {
                    set_flag(&mut self.display_settings.show_category_prefix, &value)
                }
                "FREQUENT_THRESHOLD" => {
                    set_parsed(&mut self.display_settings.frequent_threshold, &value)
                }
                "RECENT_LIMIT" => set_parsed(&mut self.display_settings.recent_limit, &value),
                "CATALOG_DIR" => {
                    self.catalog_settings.directory = Some(PathBuf::from(&value));
                    true
                }
                _ => {
                    log::debug!("Ignoring unknown override {name}");
                    continue;
                }
            };

            if applied {
                log::debug!("Applied environment override {name}={value}");
            } else {
                log::warn!("Ignoring invalid value for {name}: '{value}'");
            }
        }
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.resolution_limits;
        if limits.min == 0 || limits.min > limits.max {
            return Err(LatentCatalogError::invalid_config(format!(
                "resolution_limits must satisfy 0 < min <= max (min={}, max={})",
                limits.min, limits.max
            )));
        }

        let batch = &self.batch_settings;
        if batch.min == 0 || batch.min > batch.max || !batch.contains(batch.default) {
            return Err(LatentCatalogError::invalid_config(format!(
                "batch_settings must satisfy 0 < min <= default <= max (min={}, default={}, max={})",
                batch.min, batch.default, batch.max
            )));
        }

        let latent = &self.latent_settings;
        if latent.channels == 0 || latent.scale_factor == 0 {
            return Err(LatentCatalogError::invalid_config(
                "latent_settings.channels and latent_settings.scale_factor must be positive",
            ));
        }
        if latent.fallback_resolution < latent.scale_factor {
            return Err(LatentCatalogError::invalid_config(format!(
                "latent_settings.fallback_resolution ({}) is smaller than the scale factor ({})",
                latent.fallback_resolution, latent.scale_factor
            )));
        }

        Ok(())
    }

    /// Directory scanned for preset files
    pub fn catalog_directory(&self) -> Result<PathBuf> {
        match &self.catalog_settings.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_config_directory()?.join("resolutions")),
        }
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, value: &str) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

fn set_flag(slot: &mut bool, value: &str) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *slot = true,
        "0" | "false" | "no" | "off" => *slot = false,
        _ => return false,
    }
    true
}
