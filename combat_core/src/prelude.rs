//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Combatants
pub use crate::combatant::{Combatant, CombatantId, CombatantSnapshot, Control};
pub use crate::roster::Roster;

// Spells and statuses
pub use crate::spell::{CastOutcome, Spell};
pub use crate::status::{filter_targets, reduce_statuses, StatusEffect};

// Config
pub use crate::config::{constants, init_constants, init_constants_default};

// Re-exports from spell_core
pub use spell_core::{Element, SpellDef, SpellType, StatusKind, StatusTemplate};
