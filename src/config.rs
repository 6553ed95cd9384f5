//! Calculator configuration loaded from YAML.
//!
//! Every section is optional; anything left out falls back to the built-in
//! score model and the stock dashboard inputs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{DamageInputs, Role, SharedStats, Weapon, WeaponOption};
use crate::optimizer::SearchRequest;
use crate::score::ScoreModel;
use crate::validate::MAX_DAYS;

pub const CONFIG_ENV_VAR: &str = "DOLLCALC_CONFIG";
/// Ceiling on `base + flat m(k) + every milestone` for a configured model.
pub const MAX_MODEL_SCORE: u64 = 1_000_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid score model: {0}")]
    InvalidModel(String),
}

/// Starting values for each command when a flag is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub damage: DamageInputs,
    pub shared: SharedStats,
    pub role: Role,
    pub weapon_a: Weapon,
    pub weapon_b: Weapon,
    pub search: SearchDefaults,
}

/// Search inputs a config may preset. Days always come from the score model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchDefaults {
    pub target: u64,
    pub k_min: u64,
    pub k_max: u64,
    pub k_step: u64,
    pub top: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        let request = SearchRequest::default();
        Self {
            target: request.target,
            k_min: request.k_min,
            k_max: request.k_max,
            k_step: request.k_step,
            top: request.top,
        }
    }
}

impl SearchDefaults {
    pub fn request(&self, days: u32) -> SearchRequest {
        SearchRequest {
            target: self.target,
            k_min: self.k_min,
            k_max: self.k_max,
            k_step: self.k_step,
            days,
            top: self.top,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            damage: DamageInputs::default(),
            shared: SharedStats::default(),
            role: Role::default(),
            weapon_a: Weapon::default(),
            weapon_b: Weapon {
                option: WeaponOption::CritDamage,
                ..Weapon::default()
            },
            search: SearchDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub score_model: ScoreModel,
    pub defaults: Defaults,
}

impl AppConfig {
    pub fn from_yaml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        check_score_model(&config.score_model)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

pub fn check_score_model(model: &ScoreModel) -> Result<(), ConfigError> {
    if model.days == 0 || model.days > MAX_DAYS {
        return Err(ConfigError::InvalidModel(format!(
            "days must be between 1 and {MAX_DAYS}, got {}",
            model.days
        )));
    }
    let sessions = model.sessions_per_day;
    if sessions.min == 0 || sessions.max < sessions.min {
        return Err(ConfigError::InvalidModel(format!(
            "sessions_per_day must satisfy 1 <= min <= max, got {}..={}",
            sessions.min, sessions.max
        )));
    }
    let bonus = model.session_bonus;
    if bonus.step == 0 {
        return Err(ConfigError::InvalidModel("session_bonus.step must be at least 1".into()));
    }
    if bonus.ceiling < bonus.floor {
        return Err(ConfigError::InvalidModel(format!(
            "session_bonus.ceiling ({}) is below floor ({})",
            bonus.ceiling, bonus.floor
        )));
    }
    for (i, tier) in model.milestones.iter().enumerate() {
        if tier.thresholds.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::InvalidModel(format!(
                "milestones[{i}].thresholds must be ascending"
            )));
        }
    }
    let ceiling = model
        .base_score
        .saturating_add(bonus.flat)
        .saturating_add(model.max_milestone_bonus());
    if ceiling > MAX_MODEL_SCORE {
        return Err(ConfigError::InvalidModel(format!(
            "base_score, session_bonus.flat and milestone bonuses add up to {ceiling}, \
             limit is {MAX_MODEL_SCORE}"
        )));
    }
    Ok(())
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = AppConfig::from_yaml_str(&raw, path)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Explicit path first, then `DOLLCALC_CONFIG`, then built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(PathBuf::from(path)),
        _ => Ok(AppConfig::default()),
    }
}
