//! Battle configuration loaded from TOML

use combat_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    #[serde(default = "default_min_participants")]
    pub min_participants: usize,
    #[serde(default)]
    pub experience: ExperienceConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Turns after which the battle is abandoned
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u32,
}

fn default_min_participants() -> usize {
    2
}

fn default_turn_limit() -> u32 {
    500
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            min_participants: default_min_participants(),
            experience: ExperienceConfig::default(),
            timeouts: TimeoutConfig::default(),
            turn_limit: default_turn_limit(),
        }
    }
}

impl BattleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_participants < 2 {
            return Err(ConfigError::ValidationError(format!(
                "min_participants must be at least 2, got {}",
                self.min_participants
            )));
        }
        if self.experience.divisor <= 0.0 {
            return Err(ConfigError::ValidationError(
                "experience.divisor must be positive".to_string(),
            ));
        }
        if self.turn_limit == 0 {
            return Err(ConfigError::ValidationError(
                "turn_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Experience pool contribution on join: `max(xp / divisor, floor)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceConfig {
    #[serde(default = "default_divisor")]
    pub divisor: f64,
    #[serde(default = "default_floor")]
    pub floor: f64,
}

fn default_divisor() -> f64 {
    10.0
}

fn default_floor() -> f64 {
    50.0
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        ExperienceConfig {
            divisor: default_divisor(),
            floor: default_floor(),
        }
    }
}

impl ExperienceConfig {
    pub fn contribution(&self, current_xp: f64) -> f64 {
        (current_xp / self.divisor).max(self.floor)
    }
}

/// What happens to a human who does not answer in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Skip this turn only
    #[default]
    PassTurn,
    /// Leave the battle as if running away
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_action_secs")]
    pub action_secs: u64,
    #[serde(default = "default_target_secs")]
    pub target_secs: u64,
    #[serde(default)]
    pub on_timeout: TimeoutPolicy,
    /// Rejected selections tolerated per turn before the policy applies
    #[serde(default = "default_max_rejections")]
    pub max_rejections: u32,
}

fn default_action_secs() -> u64 {
    60
}

fn default_target_secs() -> u64 {
    30
}

fn default_max_rejections() -> u32 {
    5
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            action_secs: default_action_secs(),
            target_secs: default_target_secs(),
            on_timeout: TimeoutPolicy::default(),
            max_rejections: default_max_rejections(),
        }
    }
}

impl TimeoutConfig {
    pub fn action(&self) -> Duration {
        Duration::from_secs(self.action_secs)
    }

    pub fn target(&self) -> Duration {
        Duration::from_secs(self.target_secs)
    }
}
