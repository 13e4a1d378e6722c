//! Target pool rewriting by active effects

use super::StatusEffect;
use crate::combatant::CombatantId;
use crate::roster::Roster;
use spell_core::StatusKind;

/// Thread `pool` through every effect on `caster`, in list order.
///
/// Each effect sees the pool as rewritten by the effects before it.
pub fn filter_targets(roster: &Roster, caster: CombatantId, pool: Vec<CombatantId>) -> Vec<CombatantId> {
    let Some(holder) = roster.get(caster) else {
        return pool;
    };
    holder
        .status_effects
        .iter()
        .fold(pool, |pool, effect| effect.change_targets(roster, pool))
}

impl StatusEffect {
    /// Rewrite the target pool of whoever holds this effect
    pub fn change_targets(&self, roster: &Roster, pool: Vec<CombatantId>) -> Vec<CombatantId> {
        match self.kind {
            StatusKind::Paralyze => Vec::new(),
            StatusKind::Charmed => pool.into_iter().filter(|&id| id != self.caster).collect(),
            StatusKind::Taunt => {
                if roster.is_active(self.caster) {
                    vec![self.caster]
                } else {
                    pool
                }
            }
            StatusKind::Frozen
            | StatusKind::Burning
            | StatusKind::Poisoned
            | StatusKind::Regenerating
            | StatusKind::Blessed
            | StatusKind::Confusion
            | StatusKind::ManaBoost
            | StatusKind::HealthBoost
            | StatusKind::ExtremeSpeed
            | StatusKind::Armor
            | StatusKind::Leech
            | StatusKind::FireWeakness
            | StatusKind::WaterWeakness
            | StatusKind::EarthWeakness
            | StatusKind::AirWeakness => pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantSnapshot;

    fn setup() -> (Roster, [CombatantId; 3]) {
        let mut roster = Roster::new();
        let a = roster.add(CombatantSnapshot::new(1, "A", 50.0, 50.0));
        let b = roster.add(CombatantSnapshot::new(2, "B", 50.0, 50.0));
        let c = roster.add(CombatantSnapshot::new(3, "C", 50.0, 50.0));
        (roster, [a, b, c])
    }

    fn afflict(roster: &mut Roster, holder: CombatantId, kind: StatusKind, caster: CombatantId) {
        let effect = StatusEffect::new(kind, caster, 0, 100, 3);
        roster.get_mut(holder).unwrap().status_effects.push(effect);
    }

    #[test]
    fn test_no_effects_is_identity() {
        let (roster, [a, b, c]) = setup();
        assert_eq!(filter_targets(&roster, a, vec![a, b, c]), vec![a, b, c]);
    }

    #[test]
    fn test_paralyze_empties_pool() {
        let (mut roster, [a, b, c]) = setup();
        afflict(&mut roster, a, StatusKind::Paralyze, b);
        assert!(filter_targets(&roster, a, vec![a, b, c]).is_empty());
    }

    #[test]
    fn test_charm_removes_charmer() {
        let (mut roster, [a, b, c]) = setup();
        afflict(&mut roster, a, StatusKind::Charmed, b);
        assert_eq!(filter_targets(&roster, a, vec![a, b, c]), vec![a, c]);
    }

    #[test]
    fn test_taunt_collapses_to_taunter() {
        let (mut roster, [a, b, c]) = setup();
        afflict(&mut roster, a, StatusKind::Taunt, c);
        assert_eq!(filter_targets(&roster, a, vec![a, b, c]), vec![c]);
    }

    #[test]
    fn test_taunt_from_departed_caster_is_ignored() {
        let (mut roster, [a, b, c]) = setup();
        afflict(&mut roster, a, StatusKind::Taunt, c);
        roster.get_mut(c).unwrap().fled = true;
        assert_eq!(filter_targets(&roster, a, vec![a, b]), vec![a, b]);
    }

    #[test]
    fn test_effects_chain_in_list_order() {
        let (mut roster, [a, b, c]) = setup();
        // taunted by b, then charmed by b: nothing left to hit
        afflict(&mut roster, a, StatusKind::Taunt, b);
        afflict(&mut roster, a, StatusKind::Charmed, b);
        assert!(filter_targets(&roster, a, vec![a, b, c]).is_empty());

        // charmed by b, then taunted by c
        let (mut roster, [a, b, c]) = setup();
        afflict(&mut roster, a, StatusKind::Charmed, b);
        afflict(&mut roster, a, StatusKind::Taunt, c);
        assert_eq!(filter_targets(&roster, a, vec![a, b, c]), vec![c]);
    }
}
