//! Combatant - mutable per-battle state of a participant

use crate::spell::Spell;
use crate::status::StatusEffect;
use serde::{Deserialize, Serialize};
use spell_core::{Element, ItemDef, SpellDef, StatusKind};
use std::fmt;

/// Handle of a combatant inside its battle's roster.
///
/// Status effects refer to their caster through this handle, never by
/// ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub usize);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who decides a combatant's actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// A human picks actions through the action menu
    #[default]
    Controlled,
    /// The battle loop picks actions immediately
    Autonomous,
}

/// Read-only snapshot of a participant, provided by the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// External account id (chat user id)
    pub user_id: u64,
    pub name: String,
    #[serde(default)]
    pub control: Control,
    pub max_health: f64,
    pub health: f64,
    pub max_mana: f64,
    pub mana: f64,
    #[serde(default)]
    pub speed: i32,
    #[serde(default = "default_defense")]
    pub defense: f64,
    /// Damage dealt by the basic Attack action
    #[serde(default = "default_attack_power")]
    pub attack_power: f64,
    #[serde(default)]
    pub known_spells: Vec<SpellDef>,
    #[serde(default)]
    pub inventory_charges: Vec<ItemDef>,
}

fn default_defense() -> f64 {
    1.0
}

fn default_attack_power() -> f64 {
    5.0
}

impl CombatantSnapshot {
    /// Snapshot with full health and mana and no spells
    pub fn new(user_id: u64, name: impl Into<String>, max_health: f64, max_mana: f64) -> Self {
        CombatantSnapshot {
            user_id,
            name: name.into(),
            control: Control::Controlled,
            max_health,
            health: max_health,
            max_mana,
            mana: max_mana,
            speed: 0,
            defense: default_defense(),
            attack_power: default_attack_power(),
            known_spells: Vec::new(),
            inventory_charges: Vec::new(),
        }
    }

    /// Builder: mark as autonomous (AI)
    pub fn autonomous(mut self) -> Self {
        self.control = Control::Autonomous;
        self
    }

    /// Builder: set speed
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: set basic attack power
    pub fn with_attack_power(mut self, attack_power: f64) -> Self {
        self.attack_power = attack_power;
        self
    }

    /// Builder: add a known spell
    pub fn with_spell(mut self, spell: SpellDef) -> Self {
        self.known_spells.push(spell);
        self
    }

    /// Builder: add an inventory item
    pub fn with_item(mut self, item: ItemDef) -> Self {
        self.inventory_charges.push(item);
        self
    }
}

/// An enchanted item with its remaining charges for this battle
#[derive(Debug, Clone)]
pub struct ItemCharge {
    pub name: String,
    pub spell: Spell,
    pub charges: u32,
}

impl ItemCharge {
    pub fn is_usable(&self) -> bool {
        self.charges > 0 && !self.spell.spell_type().is_passive()
    }
}

/// A battle participant.
///
/// Health and mana are private so every mutation goes through a clamping
/// method: `0 <= health <= max_health` and `0 <= mana <= max_mana` always hold.
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    pub user_id: u64,
    pub name: String,
    pub control: Control,

    health: f64,
    max_health: f64,
    mana: f64,
    max_mana: f64,

    /// Current speed, lowered by Frozen and raised by Extreme Speed
    pub speed: i32,
    /// Carried for persistence; damage does not consult it
    pub defense: f64,
    pub attack_power: f64,

    /// Hides spell costs in the action menu (Confusion)
    pub mana_hidden: bool,
    /// Cleared while paralyzed
    pub can_move: bool,
    /// Set while charmed
    pub cannot_attack_caster: bool,
    /// Left the battle with the Run action
    pub fled: bool,
    pub weaknesses: Vec<Element>,

    /// Active effects in application order
    pub status_effects: Vec<StatusEffect>,
    pub abilities: Vec<Spell>,
    pub inventory: Vec<ItemCharge>,
}

impl Combatant {
    /// Build a combatant from a persisted snapshot
    pub fn from_snapshot(id: CombatantId, snapshot: CombatantSnapshot) -> Self {
        let max_health = finite_or_zero(snapshot.max_health).max(0.0);
        let max_mana = finite_or_zero(snapshot.max_mana).max(0.0);
        let abilities = snapshot
            .known_spells
            .into_iter()
            .map(|def| Spell::new(def, id))
            .collect();
        let inventory = snapshot
            .inventory_charges
            .into_iter()
            .map(|item| {
                // items are paid for with charges, not mana
                let mut spell = item.spell;
                spell.mana_cost = 0;
                ItemCharge {
                    name: item.name,
                    spell: Spell::new(spell, id),
                    charges: item.charges,
                }
            })
            .collect();

        Combatant {
            id,
            user_id: snapshot.user_id,
            name: snapshot.name,
            control: snapshot.control,
            health: finite_or_zero(snapshot.health).clamp(0.0, max_health),
            max_health,
            mana: finite_or_zero(snapshot.mana).clamp(0.0, max_mana),
            max_mana,
            speed: snapshot.speed,
            defense: snapshot.defense,
            attack_power: snapshot.attack_power.max(0.0),
            mana_hidden: false,
            can_move: true,
            cannot_attack_caster: false,
            fled: false,
            weaknesses: Vec::new(),
            status_effects: Vec::new(),
            abilities,
            inventory,
        }
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn mana(&self) -> f64 {
        self.mana
    }

    pub fn max_mana(&self) -> f64 {
        self.max_mana
    }

    pub fn is_autonomous(&self) -> bool {
        self.control == Control::Autonomous
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_fainted(&self) -> bool {
        !self.is_alive()
    }

    /// Still taking turns: alive and has not fled
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.fled
    }

    /// Subtract health, clamped at 0. Returns whether the combatant fainted.
    ///
    /// Callers reject negative amounts before calling.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.health <= 0.0
    }

    /// Add health, clamped at max
    pub fn restore_health(&mut self, amount: f64) {
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    /// Add mana, clamped at max
    pub fn restore_mana(&mut self, amount: f64) {
        self.mana = (self.mana + amount).clamp(0.0, self.max_mana);
    }

    /// Subtract mana, clamped at 0
    pub fn spend_mana(&mut self, amount: f64) {
        self.mana = (self.mana - amount).clamp(0.0, self.max_mana);
    }

    /// Non-finite input counts as 0
    pub fn set_health(&mut self, health: f64) {
        self.health = finite_or_zero(health).clamp(0.0, self.max_health);
    }

    /// Non-finite input counts as 0
    pub fn set_mana(&mut self, mana: f64) {
        self.mana = finite_or_zero(mana).clamp(0.0, self.max_mana);
    }

    /// Multiply max health by `max_factor` and current health by `current_factor`
    pub fn scale_health(&mut self, max_factor: f64, current_factor: f64) {
        self.max_health = finite_or_zero(self.max_health * max_factor).max(0.0);
        self.set_health(self.health * current_factor);
    }

    /// Multiply max mana by `max_factor` and current mana by `current_factor`
    pub fn scale_mana(&mut self, max_factor: f64, current_factor: f64) {
        self.max_mana = finite_or_zero(self.max_mana * max_factor).max(0.0);
        self.set_mana(self.mana * current_factor);
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status_effects.iter().any(|e| e.kind == kind)
    }

    /// Display names of active statuses, in application order
    pub fn status_names(&self) -> Vec<String> {
        self.status_effects.iter().map(|e| e.kind.to_string()).collect()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_combatant() -> Combatant {
        Combatant::from_snapshot(
            CombatantId(0),
            CombatantSnapshot::new(1, "Aria", 100.0, 50.0),
        )
    }

    #[test]
    fn test_take_damage_reports_faint() {
        let mut c = make_combatant();
        assert!(!c.take_damage(40.0));
        assert!((c.health() - 60.0).abs() < f64::EPSILON);
        assert!(c.take_damage(100.0));
        assert_eq!(c.health(), 0.0);
        assert!(c.is_fainted());
    }

    #[test]
    fn test_restore_clamps_at_max() {
        let mut c = make_combatant();
        c.take_damage(10.0);
        c.restore_health(500.0);
        assert!((c.health() - 100.0).abs() < f64::EPSILON);

        c.spend_mana(80.0);
        assert_eq!(c.mana(), 0.0);
        c.restore_mana(20.0);
        assert!((c.mana() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_is_clamped() {
        let mut snapshot = CombatantSnapshot::new(2, "Bram", 80.0, 30.0);
        snapshot.health = 120.0;
        snapshot.mana = -5.0;
        let c = Combatant::from_snapshot(CombatantId(3), snapshot);
        assert!((c.health() - 80.0).abs() < f64::EPSILON);
        assert_eq!(c.mana(), 0.0);
        assert_eq!(c.id(), CombatantId(3));
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let json = r#"{
            "user_id": 42,
            "name": "Goblin Warrior",
            "control": "autonomous",
            "max_health": 20,
            "health": 20,
            "max_mana": 0,
            "mana": 0
        }"#;
        let snapshot: CombatantSnapshot = serde_json::from_str(json).unwrap();
        let c = Combatant::from_snapshot(CombatantId(0), snapshot);
        assert!(c.is_autonomous());
        assert!((c.attack_power - 5.0).abs() < f64::EPSILON);
        assert!((c.defense - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_vitals_become_zero() {
        let mut c = make_combatant();
        c.set_mana(f64::NAN);
        assert_eq!(c.mana(), 0.0);
        c.restore_mana(10.0);
        // Mana Boost with a runaway regen factor
        c.scale_mana(1.0, f64::INFINITY);
        assert_eq!(c.mana(), 0.0);
        assert!((c.max_mana() - 50.0).abs() < f64::EPSILON);
        c.set_health(f64::NEG_INFINITY);
        assert_eq!(c.health(), 0.0);
        assert!(c.mana() >= 0.0 && c.mana() <= c.max_mana());
    }

    proptest! {
        #[test]
        fn prop_vitals_stay_in_bounds(ops in proptest::collection::vec((0u8..4, 0.0f64..250.0), 0..64)) {
            let mut c = make_combatant();
            for (op, amount) in ops {
                match op {
                    0 => { c.take_damage(amount); }
                    1 => c.restore_health(amount),
                    2 => c.spend_mana(amount),
                    _ => c.restore_mana(amount),
                }
                prop_assert!(c.health() >= 0.0 && c.health() <= c.max_health());
                prop_assert!(c.mana() >= 0.0 && c.mana() <= c.max_mana());
            }
            // clamping is idempotent
            let (h, m) = (c.health(), c.mana());
            c.set_health(h);
            c.set_mana(m);
            prop_assert_eq!(c.health(), h);
            prop_assert_eq!(c.mana(), m);
        }
    }
}
