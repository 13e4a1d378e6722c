//! Status application and the reversible modifications it makes

use super::StatusEffect;
use crate::combatant::{Combatant, CombatantId};
use crate::config::constants;
use crate::roster::Roster;
use rand::Rng;
use spell_core::StatusKind;

/// Whether an application roll takes hold.
///
/// Strictly less than: a roll equal to `chance` is a resist, so a 100% effect
/// still resists on a roll of exactly 100.
pub fn takes_hold(roll: u32, chance: u8) -> bool {
    roll < u32::from(chance)
}

impl StatusEffect {
    /// Apply this effect to `target`, returning the narration.
    ///
    /// Instantaneous kinds mutate the target without rolling. Every other kind
    /// rolls `1..=chance_die`; on success a fresh copy is appended to the
    /// target's status list.
    pub fn apply(&self, roster: &mut Roster, target: CombatantId, rng: &mut impl Rng) -> String {
        if self.kind.is_instant() {
            return self.apply_instant(roster, target);
        }
        let roll = rng.gen_range(1..=constants().status.chance_die);
        self.apply_with_roll(roster, target, roll)
    }

    /// Apply with a predetermined roll
    pub fn apply_with_roll(&self, roster: &mut Roster, target: CombatantId, roll: u32) -> String {
        if self.kind.is_instant() {
            return self.apply_instant(roster, target);
        }
        let Some(holder) = roster.get_mut(target) else {
            return format!("{} fizzles.", self.kind);
        };

        if takes_hold(roll, self.chance) {
            let effect = self.fresh();
            effect.attach_modifier(holder);
            holder.status_effects.push(effect);
            tracing::debug!(combatant = %target, kind = %self.kind, roll, chance = self.chance, "status applied");
            format!("{} is now affected by {}!", holder.name, self.kind)
        } else {
            tracing::debug!(combatant = %target, kind = %self.kind, roll, chance = self.chance, "status resisted");
            format!("{} resisted {}.", holder.name, self.kind)
        }
    }

    fn apply_instant(&self, roster: &mut Roster, target: CombatantId) -> String {
        let Some(holder) = roster.get_mut(target) else {
            return format!("{} fizzles.", self.kind);
        };
        let power = f64::from(self.power);

        match self.kind {
            StatusKind::Blessed => {
                let cleansed = std::mem::take(&mut holder.status_effects);
                for effect in &cleansed {
                    effect.detach_modifier(holder);
                }
                format!("{} is cleansed of all status effects!", holder.name)
            }
            StatusKind::ManaBoost => {
                let regen_divisor = constants().status.mana_boost_regen_divisor;
                holder.scale_mana(1.0 + power / 100.0, 1.0 + power / regen_divisor);
                format!("{}'s max mana increased by {}%!", holder.name, self.power)
            }
            StatusKind::HealthBoost => {
                let boost = 1.0 + power / 100.0;
                holder.scale_health(boost, boost);
                format!("{}'s max health increased by {}%!", holder.name, self.power)
            }
            StatusKind::ExtremeSpeed => {
                holder.speed = holder.speed.saturating_add(self.power_i32());
                format!("{} moves at extreme speed!", holder.name)
            }
            StatusKind::Armor => {
                holder.defense *= 1.0 + power / 100.0;
                format!("{} gains {}% extra defense!", holder.name, self.power)
            }
            StatusKind::FireWeakness
            | StatusKind::WaterWeakness
            | StatusKind::EarthWeakness
            | StatusKind::AirWeakness => match self.kind.weakness_element() {
                Some(element) => {
                    if !holder.weaknesses.contains(&element) {
                        holder.weaknesses.push(element);
                    }
                    format!("{} is now weak to {}!", holder.name, element)
                }
                None => format!("{} fizzles.", self.kind),
            },
            StatusKind::Paralyze
            | StatusKind::Frozen
            | StatusKind::Burning
            | StatusKind::Poisoned
            | StatusKind::Charmed
            | StatusKind::Confusion
            | StatusKind::Taunt
            | StatusKind::Leech
            | StatusKind::Regenerating => format!("{} fizzles.", self.kind),
        }
    }

    /// Stat change made when the effect attaches
    pub(crate) fn attach_modifier(&self, holder: &mut Combatant) {
        match self.kind {
            StatusKind::Paralyze => holder.can_move = false,
            StatusKind::Frozen => holder.speed = holder.speed.saturating_sub(self.power_i32()),
            StatusKind::Charmed => holder.cannot_attack_caster = true,
            StatusKind::Confusion => holder.mana_hidden = true,
            _ => {}
        }
    }

    /// Undo [`Self::attach_modifier`] once the effect has left `holder`.
    ///
    /// Flags are only cleared when no other effect of the same kind remains.
    pub(crate) fn detach_modifier(&self, holder: &mut Combatant) {
        let still_held = holder.has_status(self.kind);
        match self.kind {
            StatusKind::Paralyze if !still_held => holder.can_move = true,
            StatusKind::Frozen => holder.speed = holder.speed.saturating_add(self.power_i32()),
            StatusKind::Charmed if !still_held => holder.cannot_attack_caster = false,
            StatusKind::Confusion if !still_held => holder.mana_hidden = false,
            _ => {}
        }
    }

    fn power_i32(&self) -> i32 {
        i32::try_from(self.power).unwrap_or(i32::MAX)
    }
}
