use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::audience::AggregationConfig;
use crate::error::{PricingError, Result};
use crate::pricing::{
    CalculatorConfig, ConfidenceConfig, ConversionConfig, EngagementConfig, FollowerConfig,
    RangeConfig, SegmentConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_limit: 50,
        }
    }
}

impl StorageConfig {
    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("accounts.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub log_level: String,
    pub aggregation: AggregationConfig,
    pub followers: FollowerConfig,
    pub engagement: EngagementConfig,
    pub range: RangeConfig,
    pub conversion: ConversionConfig,
    pub confidence: ConfidenceConfig,
    pub segments: SegmentConfig,
    pub storage: StorageConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            aggregation: AggregationConfig::default(),
            followers: FollowerConfig::default(),
            engagement: EngagementConfig::default(),
            range: RangeConfig::default(),
            conversion: ConversionConfig::default(),
            confidence: ConfidenceConfig::default(),
            segments: SegmentConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl PricingConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path).map_err(|err| {
                    PricingError::Config(format!("failed to read config: {}", err))
                })?;
                Self::from_toml(&contents)?
            } else {
                PricingConfig::default()
            }
        } else {
            PricingConfig::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|err| PricingError::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    PricingError::Config(format!("failed to create config dir: {}", err))
                })?;
            }
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| PricingError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| PricingError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    pub fn calculator(&self) -> CalculatorConfig {
        CalculatorConfig {
            followers: self.followers.clone(),
            engagement: self.engagement.clone(),
            range: self.range.clone(),
            conversion: self.conversion.clone(),
            confidence: self.confidence.clone(),
        }
    }

    /// Applies `SOCIOPRICE_*` overrides. `lookup` is injected so tests do not
    /// touch the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |key: &str| lookup(key).and_then(|value| parse_bool(&value));
        if let Some(value) = flag("SOCIOPRICE_WEIGHT_BY_FOLLOWERS") {
            self.aggregation.weight_by_followers = value;
        }
        if let Some(value) = flag("SOCIOPRICE_REJECT_ZERO_FOLLOWERS") {
            self.followers.reject_zero = value;
        }
        if let Some(dir) = lookup("SOCIOPRICE_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.storage.data_dir = PathBuf::from(dir);
            }
        }
        if let Some(limit) = lookup("SOCIOPRICE_HISTORY_LIMIT") {
            if let Ok(value) = limit.parse::<usize>() {
                self.storage.history_limit = value;
            }
        }
        if let Some(level) = lookup("SOCIOPRICE_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = level;
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("SOCIOPRICE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/pricing.toml")))
}
