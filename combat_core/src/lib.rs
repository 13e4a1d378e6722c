//! combat_core - Turn-based combat simulation primitives
//!
//! This library provides:
//! - Combatant: clamped per-battle vitals and status flags
//! - Roster: the arena every combatant of one battle lives in
//! - StatusEffect: apply / tick / target rewriting for every status kind
//! - Spell: target pools and casting
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use combat_core::prelude::*;
//! use spell_core::{SpellDef, SpellType};
//!
//! let mut roster = Roster::new();
//! let mage = roster.add(CombatantSnapshot::new(1, "Mage", 100.0, 50.0));
//! let goblin = roster.add(CombatantSnapshot::new(2, "Goblin", 30.0, 0.0).autonomous());
//!
//! let bolt = Spell::new(SpellDef::new("Bolt", SpellType::SingleTarget, 12, 10), mage);
//! let targets = bolt.get_targets(&roster, &roster.living_opponents(mage));
//! let outcomes = bolt.cast(&mut roster, goblin, &mut rand::thread_rng());
//! ```

pub mod combatant;
pub mod config;
pub mod prelude;
pub mod roster;
pub mod spell;
pub mod status;

// Core API
pub use combatant::{Combatant, CombatantId, CombatantSnapshot, Control, ItemCharge};
pub use roster::Roster;
pub use spell::{CastOutcome, Spell, Targets};
pub use status::{filter_targets, reduce_statuses, takes_hold, StatusEffect};

// Configuration
pub use config::{constants, init_constants, init_constants_default, CombatConstants, ConfigError};

// Re-export commonly needed spell_core types
pub use spell_core::{Element, SpellDef, SpellType, StatusKind, StatusTemplate};
