//! Spell resolver - target pools and casting

use crate::combatant::{Combatant, CombatantId};
use crate::roster::Roster;
use crate::status::{filter_targets, StatusEffect};
use rand::Rng;
use spell_core::{SpellDef, SpellType};

/// A spell bound to the combatant who knows it
#[derive(Debug, Clone)]
pub struct Spell {
    def: SpellDef,
    caster: CombatantId,
}

/// One or more targets for [`Spell::cast`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets(pub Vec<CombatantId>);

impl From<CombatantId> for Targets {
    fn from(id: CombatantId) -> Self {
        Targets(vec![id])
    }
}

impl From<Vec<CombatantId>> for Targets {
    fn from(ids: Vec<CombatantId>) -> Self {
        Targets(ids)
    }
}

/// Result of a cast against one target, positionally aligned with the targets
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// The spell carried a status; narration of the application
    Status { target: CombatantId, narration: String },
    /// Direct damage
    Damage {
        target: CombatantId,
        amount: f64,
        fainted: bool,
    },
}

impl CastOutcome {
    pub fn target(&self) -> CombatantId {
        match self {
            CastOutcome::Status { target, .. } | CastOutcome::Damage { target, .. } => *target,
        }
    }

    pub fn fainted(&self) -> bool {
        matches!(self, CastOutcome::Damage { fainted: true, .. })
    }

    /// Human-readable line for the battle log
    pub fn narrate(&self, roster: &Roster) -> String {
        match self {
            CastOutcome::Status { narration, .. } => narration.clone(),
            CastOutcome::Damage {
                target,
                amount,
                fainted,
            } => {
                let name = roster.name(*target);
                if *fainted {
                    format!("{} takes {:.1} damage and faints!", name, amount)
                } else {
                    format!("{} takes {:.1} damage!", name, amount)
                }
            }
        }
    }
}

impl Spell {
    pub fn new(def: SpellDef, caster: CombatantId) -> Self {
        Spell { def, caster }
    }

    pub fn def(&self) -> &SpellDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn caster(&self) -> CombatantId {
        self.caster
    }

    pub fn mana_cost(&self) -> f64 {
        f64::from(self.def.mana_cost)
    }

    pub fn spell_type(&self) -> SpellType {
        self.def.spell_type
    }

    /// Cost shown in the action menu; hidden while the viewer is confused
    pub fn cost_label(&self, viewer: &Combatant) -> String {
        if viewer.mana_hidden {
            "???".to_string()
        } else {
            self.def.mana_cost.to_string()
        }
    }

    /// Candidate targets for this spell.
    ///
    /// The base pool follows the spell type, then every effect on the caster
    /// rewrites it in list order.
    pub fn get_targets(&self, roster: &Roster, living_opponents: &[CombatantId]) -> Vec<CombatantId> {
        let pool = match self.def.spell_type {
            SpellType::SingleTarget => std::iter::once(self.caster)
                .chain(living_opponents.iter().copied())
                .collect(),
            SpellType::AreaOfEffect => living_opponents.to_vec(),
            SpellType::Passive => vec![self.caster],
        };
        filter_targets(roster, self.caster, pool)
    }

    /// Cast against `targets`, deducting the mana cost once.
    ///
    /// Mana sufficiency is the caller's precondition; mana is clamped at 0.
    pub fn cast(&self, roster: &mut Roster, targets: impl Into<Targets>, rng: &mut impl Rng) -> Vec<CastOutcome> {
        let Targets(targets) = targets.into();

        if let Some(caster) = roster.get_mut(self.caster) {
            caster.spend_mana(self.mana_cost());
        }

        tracing::debug!(
            caster = %self.caster,
            spell = %self.def.name,
            targets = targets.len(),
            "spell cast"
        );

        targets
            .into_iter()
            .map(|target| match &self.def.status {
                Some(template) => {
                    let narration = StatusEffect::from_template(template, self.caster).apply(roster, target, rng);
                    CastOutcome::Status { target, narration }
                }
                None => {
                    let amount = f64::from(self.def.power);
                    let fainted = roster
                        .get_mut(target)
                        .is_some_and(|victim| victim.take_damage(amount));
                    CastOutcome::Damage {
                        target,
                        amount,
                        fainted,
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::CombatantSnapshot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use spell_core::{StatusKind, StatusTemplate};

    fn setup() -> (Roster, CombatantId, Vec<CombatantId>) {
        let mut roster = Roster::new();
        let mut caster = CombatantSnapshot::new(1, "Mage", 100.0, 100.0);
        caster.mana = 50.0;
        let caster = roster.add(caster);
        let opponents = (2..5)
            .map(|uid| roster.add(CombatantSnapshot::new(uid, format!("Foe{}", uid), 40.0, 0.0)))
            .collect();
        (roster, caster, opponents)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_aoe_deducts_mana_once() {
        let (mut roster, caster, opponents) = setup();
        let spell = Spell::new(SpellDef::new("Quake", SpellType::AreaOfEffect, 10, 20), caster);

        let targets = spell.get_targets(&roster, &roster.living_opponents(caster));
        assert_eq!(targets, opponents);

        let outcomes = spell.cast(&mut roster, targets.clone(), &mut rng());
        assert!((roster.get(caster).unwrap().mana() - 30.0).abs() < 1e-9);
        assert_eq!(outcomes.len(), 3);
        for (outcome, target) in outcomes.iter().zip(&targets) {
            assert_eq!(outcome.target(), *target);
            assert!(!outcome.fainted());
            assert!((roster.get(*target).unwrap().health() - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_target_pool_includes_caster() {
        let (roster, caster, opponents) = setup();
        let spell = Spell::new(SpellDef::new("Bolt", SpellType::SingleTarget, 10, 5), caster);
        let targets = spell.get_targets(&roster, &opponents);
        assert_eq!(targets[0], caster);
        assert_eq!(&targets[1..], opponents.as_slice());

        let passive = Spell::new(SpellDef::new("Aura", SpellType::Passive, 0, 1), caster);
        assert_eq!(passive.get_targets(&roster, &opponents), vec![caster]);
    }

    #[test]
    fn test_single_target_auto_wraps() {
        let (mut roster, caster, opponents) = setup();
        let spell = Spell::new(SpellDef::new("Smite", SpellType::SingleTarget, 40, 10), caster);
        let outcomes = spell.cast(&mut roster, opponents[0], &mut rng());
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].fainted());
        assert_eq!(outcomes[0].narrate(&roster), "Foe2 takes 40.0 damage and faints!");
    }

    #[test]
    fn test_paralyzed_caster_has_no_targets() {
        let (mut roster, caster, opponents) = setup();
        roster
            .get_mut(caster)
            .unwrap()
            .status_effects
            .push(StatusEffect::new(StatusKind::Paralyze, opponents[0], 0, 100, 2));

        for spell_type in [SpellType::SingleTarget, SpellType::AreaOfEffect, SpellType::Passive] {
            let spell = Spell::new(SpellDef::new("Any", spell_type, 1, 1), caster);
            assert!(spell.get_targets(&roster, &opponents).is_empty());
        }
    }

    #[test]
    fn test_status_spell_applies_instead_of_damage() {
        let (mut roster, caster, opponents) = setup();
        let def = SpellDef::new("Ward", SpellType::SingleTarget, 25, 10)
            .with_status(StatusTemplate::new(StatusKind::Armor, 25, 100, 0));
        let spell = Spell::new(def, caster);

        let outcomes = spell.cast(&mut roster, caster, &mut rng());
        assert_eq!(
            outcomes,
            vec![CastOutcome::Status {
                target: caster,
                narration: "Mage gains 25% extra defense!".to_string(),
            }]
        );
        let target = roster.get(opponents[0]).unwrap();
        assert!((target.health() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_overspending_clamps_mana() {
        let (mut roster, caster, opponents) = setup();
        let spell = Spell::new(SpellDef::new("Meteor", SpellType::AreaOfEffect, 1, 80), caster);
        spell.cast(&mut roster, opponents, &mut rng());
        assert_eq!(roster.get(caster).unwrap().mana(), 0.0);
    }

    #[test]
    fn test_cost_label_hidden_when_confused() {
        let (mut roster, caster, _) = setup();
        let spell = Spell::new(SpellDef::new("Bolt", SpellType::SingleTarget, 10, 15), caster);
        assert_eq!(spell.cost_label(roster.get(caster).unwrap()), "15");
        roster.get_mut(caster).unwrap().mana_hidden = true;
        assert_eq!(spell.cost_label(roster.get(caster).unwrap()), "???");
    }
}
