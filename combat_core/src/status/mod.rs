//! Status effect engine
//!
//! Every [`StatusKind`] supports three operations, each an exhaustive match:
//! - [`StatusEffect::apply`]: roll against `chance` and attach a fresh copy,
//!   or mutate the target once for instantaneous kinds
//! - [`StatusEffect::reduce`]: once per holder turn, periodic side effect and
//!   duration countdown (see [`reduce_statuses`])
//! - [`StatusEffect::change_targets`]: rewrite the holder's target pool (see
//!   [`filter_targets`])

mod apply;
pub mod targeting;
pub mod tick;

pub use apply::takes_hold;
pub use targeting::filter_targets;
pub use tick::reduce_statuses;

use crate::combatant::CombatantId;
use spell_core::{StatusKind, StatusTemplate};

/// An active (or about to be applied) status effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Non-owning handle to whoever cast the effect
    pub caster: CombatantId,
    pub power: u32,
    /// Probability (0-100) of taking hold
    pub chance: u8,
    /// Turns remaining
    pub duration: u32,
    /// Duration a fresh copy starts with
    pub max_duration: u32,
}

impl StatusEffect {
    /// `chance` is capped at 100
    pub fn new(kind: StatusKind, caster: CombatantId, power: u32, chance: u8, duration: u32) -> Self {
        StatusEffect {
            kind,
            caster,
            power,
            chance: chance.min(100),
            duration,
            max_duration: duration,
        }
    }

    /// Instantiate a spell's status template for a cast
    pub fn from_template(template: &StatusTemplate, caster: CombatantId) -> Self {
        Self::new(
            template.kind,
            caster,
            template.power,
            template.chance,
            template.duration,
        )
    }

    /// A new instance with the same power, chance and duration
    pub fn fresh(&self) -> Self {
        Self::new(self.kind, self.caster, self.power, self.chance, self.duration)
    }

    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }
}
