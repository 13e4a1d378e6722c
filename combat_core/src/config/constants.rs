//! Tunable combat constants

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use super::ConfigError;

/// Global combat constants instance
static COMBAT_CONSTANTS: OnceLock<CombatConstants> = OnceLock::new();

/// Initialize the global combat constants from a TOML file
///
/// Returns error if already initialized or if loading fails.
pub fn init_constants(path: &Path) -> Result<(), ConfigError> {
    let constants = CombatConstants::load_from_path(path)?;
    COMBAT_CONSTANTS
        .set(constants)
        .map_err(|_| ConfigError::ValidationError("CombatConstants already initialized".to_string()))
}

/// Initialize the global combat constants with default values
pub fn init_constants_default() -> Result<(), ConfigError> {
    COMBAT_CONSTANTS
        .set(CombatConstants::default())
        .map_err(|_| ConfigError::ValidationError("CombatConstants already initialized".to_string()))
}

/// Get a reference to the global combat constants
///
/// Falls back to (and locks in) the defaults when nothing was initialized.
pub fn constants() -> &'static CombatConstants {
    COMBAT_CONSTANTS.get_or_init(CombatConstants::default)
}

/// Check if constants have been initialized
pub fn constants_initialized() -> bool {
    COMBAT_CONSTANTS.get().is_some()
}

/// Ensure constants are initialized with defaults (idempotent, useful for tests)
pub fn ensure_constants_initialized() {
    COMBAT_CONSTANTS.get_or_init(CombatConstants::default);
}

/// Tunable combat constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub status: StatusConstants,
    #[serde(default)]
    pub initiative: InitiativeConstants,
    #[serde(default)]
    pub meditate: MeditateConstants,
}

impl CombatConstants {
    /// Load constants from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let constants: CombatConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse constants from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let constants: CombatConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.status.chance_die == 0 {
            return Err(ConfigError::ValidationError(
                "status.chance_die must be at least 1".to_string(),
            ));
        }
        let divisor = self.status.mana_boost_regen_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "status.mana_boost_regen_divisor must be positive, got {}",
                divisor
            )));
        }
        if self.initiative.die_sides == 0 {
            return Err(ConfigError::ValidationError(
                "initiative.die_sides must be at least 1".to_string(),
            ));
        }
        if self.meditate.min_divisor == 0 {
            return Err(ConfigError::ValidationError(
                "meditate.min_divisor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConstants {
    /// Sides of the application roll; an effect holds when roll < chance
    #[serde(default = "default_chance_die")]
    pub chance_die: u32,
    /// Mana Boost refills current mana by power / divisor
    #[serde(default = "default_mana_boost_regen_divisor")]
    pub mana_boost_regen_divisor: f64,
}

impl Default for StatusConstants {
    fn default() -> Self {
        StatusConstants {
            chance_die: 100,
            mana_boost_regen_divisor: 200.0,
        }
    }
}

fn default_chance_die() -> u32 {
    100
}
fn default_mana_boost_regen_divisor() -> f64 {
    200.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiativeConstants {
    /// Turn order roll: 1..=die_sides plus speed
    #[serde(default = "default_die_sides")]
    pub die_sides: u32,
}

impl Default for InitiativeConstants {
    fn default() -> Self {
        InitiativeConstants { die_sides: 20 }
    }
}

fn default_die_sides() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeditateConstants {
    /// Meditation restores between max_mana / min_divisor and max_mana
    #[serde(default = "default_min_divisor")]
    pub min_divisor: u32,
}

impl Default for MeditateConstants {
    fn default() -> Self {
        MeditateConstants { min_divisor: 3 }
    }
}

fn default_min_divisor() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = CombatConstants::default();
        assert_eq!(constants.status.chance_die, 100);
        assert_eq!(constants.initiative.die_sides, 20);
        assert_eq!(constants.meditate.min_divisor, 3);
        assert!((constants.status.mana_boost_regen_divisor - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_partial_constants() {
        let toml = r#"
[initiative]
die_sides = 12
"#;
        let constants = CombatConstants::parse(toml).unwrap();
        assert_eq!(constants.initiative.die_sides, 12);
        assert_eq!(constants.status.chance_die, 100);
    }

    #[test]
    fn test_rejects_zero_sided_die() {
        let toml = r#"
[status]
chance_die = 0
"#;
        assert!(matches!(
            CombatConstants::parse(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_regen_divisor() {
        for divisor in ["0.0", "-5.0", "nan", "inf"] {
            let toml = format!("[status]\nmana_boost_regen_divisor = {}", divisor);
            assert!(
                matches!(CombatConstants::parse(&toml), Err(ConfigError::ValidationError(_))),
                "divisor {} accepted",
                divisor
            );
        }
    }
}
