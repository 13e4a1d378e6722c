//! Per-turn status resolution

use super::StatusEffect;
use crate::combatant::CombatantId;
use crate::roster::Roster;
use spell_core::StatusKind;

/// Tick every effect on `holder` once, in application order.
///
/// Called at the start of the holder's own turn. Expired effects are removed
/// and their stat changes undone. Returns one narration line per effect.
pub fn reduce_statuses(roster: &mut Roster, holder: CombatantId) -> Vec<String> {
    let effects = match roster.get_mut(holder) {
        Some(combatant) => std::mem::take(&mut combatant.status_effects),
        None => return Vec::new(),
    };

    let mut narration = Vec::with_capacity(effects.len());
    let mut survivors = Vec::with_capacity(effects.len());
    let mut expired = Vec::new();

    for mut effect in effects {
        narration.push(effect.reduce(roster, holder));
        if effect.is_expired() {
            expired.push(effect);
        } else {
            survivors.push(effect);
        }
    }

    if let Some(combatant) = roster.get_mut(holder) {
        combatant.status_effects = survivors;
        for effect in &mut expired {
            effect.detach_modifier(combatant);
            effect.duration = effect.max_duration;
        }
    }

    narration
}

impl StatusEffect {
    /// One tick: periodic side effect, then the duration countdown.
    ///
    /// The caller owns list removal; see [`reduce_statuses`].
    pub fn reduce(&mut self, roster: &mut Roster, holder: CombatantId) -> String {
        let periodic = self.periodic(roster, holder);

        if self.duration > 0 {
            self.duration -= 1;
        }

        let name = roster.name(holder);
        let countdown = if self.is_expired() {
            format!("{} effect on {} has worn off.", self.kind, name)
        } else {
            format!("Duration {} turns on {}", self.duration, self.kind)
        };

        tracing::debug!(combatant = %holder, kind = %self.kind, duration = self.duration, "status ticked");

        match periodic {
            Some(line) => format!("{}\n{}", line, countdown),
            None => countdown,
        }
    }

    /// Damage/heal over time, computed before the countdown
    fn periodic(&self, roster: &mut Roster, holder: CombatantId) -> Option<String> {
        let power = f64::from(self.power);

        match self.kind {
            StatusKind::Burning => {
                // grows as the remaining duration shrinks
                let damage = power / f64::from(self.duration.max(1));
                let target = roster.get_mut(holder)?;
                target.take_damage(damage);
                Some(format!("{} takes {:.1} burn damage!", target.name, damage))
            }
            StatusKind::Poisoned => {
                let target = roster.get_mut(holder)?;
                let damage = target.health() * power / 100.0;
                target.take_damage(damage);
                Some(format!("{} suffers {:.1} poison damage!", target.name, damage))
            }
            StatusKind::Regenerating => {
                let target = roster.get_mut(holder)?;
                let heal = target.max_health() * power / 100.0;
                target.restore_health(heal);
                Some(format!("{} regenerates {:.1} HP!", target.name, heal))
            }
            StatusKind::Leech => {
                let target = roster.get_mut(holder)?;
                let damage = target.max_health() * power / 100.0;
                target.take_damage(damage);
                let line = format!("{} loses {:.1} HP due to leech!", target.name, damage);
                if roster.is_present(self.caster) {
                    if let Some(caster) = roster.get_mut(self.caster) {
                        caster.restore_health(damage);
                    }
                }
                Some(line)
            }
            StatusKind::Paralyze
            | StatusKind::Frozen
            | StatusKind::Charmed
            | StatusKind::Confusion
            | StatusKind::Taunt
            | StatusKind::Blessed
            | StatusKind::ManaBoost
            | StatusKind::HealthBoost
            | StatusKind::ExtremeSpeed
            | StatusKind::Armor
            | StatusKind::FireWeakness
            | StatusKind::WaterWeakness
            | StatusKind::EarthWeakness
            | StatusKind::AirWeakness => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantSnapshot;

    fn setup() -> (Roster, CombatantId, CombatantId) {
        let mut roster = Roster::new();
        let caster = roster.add(CombatantSnapshot::new(1, "Caster", 100.0, 100.0));
        let holder = roster.add(CombatantSnapshot::new(2, "Holder", 100.0, 100.0).with_speed(10));
        (roster, caster, holder)
    }

    fn attach(roster: &mut Roster, holder: CombatantId, effect: StatusEffect) {
        effect.apply_with_roll(roster, holder, 1);
    }

    #[test]
    fn test_burning_first_tick() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Burning, caster, 30, 100, 3));

        let lines = reduce_statuses(&mut roster, holder);
        assert_eq!(lines, vec!["Holder takes 10.0 burn damage!\nDuration 2 turns on Burning".to_string()]);

        let h = roster.get(holder).unwrap();
        assert!((h.health() - 90.0).abs() < 1e-9);
        assert_eq!(h.status_effects.len(), 1);
        assert_eq!(h.status_effects[0].duration, 2);
    }

    #[test]
    fn test_burning_scales_up_then_expires() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Burning, caster, 30, 100, 3));

        reduce_statuses(&mut roster, holder); // 30/3
        reduce_statuses(&mut roster, holder); // 30/2
        let lines = reduce_statuses(&mut roster, holder); // 30/1

        let h = roster.get(holder).unwrap();
        assert!((h.health() - 45.0).abs() < 1e-9);
        assert!(h.status_effects.is_empty());
        assert!(lines[0].ends_with("Burning effect on Holder has worn off."));
    }

    #[test]
    fn test_duration_strictly_decreases_until_removed() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Taunt, caster, 0, 100, 4));

        let mut last = 4;
        loop {
            reduce_statuses(&mut roster, holder);
            let h = roster.get(holder).unwrap();
            match h.status_effects.first() {
                Some(effect) => {
                    assert_eq!(effect.duration, last - 1);
                    last = effect.duration;
                }
                None => break,
            }
        }
        assert_eq!(last, 1);
    }

    #[test]
    fn test_poison_uses_current_health() {
        let (mut roster, caster, holder) = setup();
        roster.get_mut(holder).unwrap().take_damage(50.0);
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Poisoned, caster, 10, 100, 2));

        let lines = reduce_statuses(&mut roster, holder);
        assert!(lines[0].starts_with("Holder suffers 5.0 poison damage!"));
        assert!((roster.get(holder).unwrap().health() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_regeneration_clamps_to_max() {
        let (mut roster, caster, holder) = setup();
        roster.get_mut(holder).unwrap().take_damage(3.0);
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Regenerating, caster, 5, 100, 2));

        reduce_statuses(&mut roster, holder);
        assert!((roster.get(holder).unwrap().health() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_leech_transfers_to_caster() {
        let (mut roster, caster, holder) = setup();
        roster.get_mut(caster).unwrap().take_damage(20.0);
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Leech, caster, 4, 100, 3));

        reduce_statuses(&mut roster, holder);
        assert!((roster.get(holder).unwrap().health() - 96.0).abs() < 1e-9);
        assert!((roster.get(caster).unwrap().health() - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_leech_skips_departed_caster() {
        let (mut roster, caster, holder) = setup();
        roster.get_mut(caster).unwrap().take_damage(20.0);
        roster.get_mut(caster).unwrap().fled = true;
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Leech, caster, 4, 100, 3));

        reduce_statuses(&mut roster, holder);
        assert!((roster.get(holder).unwrap().health() - 96.0).abs() < 1e-9);
        assert!((roster.get(caster).unwrap().health() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_expiry_reverts_modifiers() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Frozen, caster, 4, 100, 1));
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Paralyze, caster, 0, 100, 1));
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Confusion, caster, 0, 100, 2));
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Charmed, caster, 0, 100, 1));
        assert_eq!(roster.get(holder).unwrap().speed, 6);

        let lines = reduce_statuses(&mut roster, holder);
        assert_eq!(lines.len(), 4);

        let h = roster.get(holder).unwrap();
        assert_eq!(h.speed, 10);
        assert!(h.can_move);
        assert!(!h.cannot_attack_caster);
        // confusion still has a turn left
        assert!(h.mana_hidden);
        assert_eq!(h.status_names(), vec!["Confusion".to_string()]);

        reduce_statuses(&mut roster, holder);
        assert!(!roster.get(holder).unwrap().mana_hidden);
    }

    #[test]
    fn test_overlapping_paralyze_keeps_flag_until_last() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Paralyze, caster, 0, 100, 1));
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Paralyze, caster, 0, 100, 2));

        reduce_statuses(&mut roster, holder);
        assert!(!roster.get(holder).unwrap().can_move);
        reduce_statuses(&mut roster, holder);
        assert!(roster.get(holder).unwrap().can_move);
    }

    #[test]
    fn test_zero_duration_effect_expires_on_first_tick() {
        let (mut roster, caster, holder) = setup();
        attach(&mut roster, holder, StatusEffect::new(StatusKind::Burning, caster, 12, 100, 0));

        reduce_statuses(&mut roster, holder);
        let h = roster.get(holder).unwrap();
        assert!(h.status_effects.is_empty());
        assert!((h.health() - 88.0).abs() < 1e-9);
    }
}
