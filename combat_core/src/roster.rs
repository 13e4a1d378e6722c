//! Roster - arena owning every combatant of one battle

use crate::combatant::{Combatant, CombatantId, CombatantSnapshot};

/// Owns the combatants of a single battle, addressed by [`CombatantId`].
///
/// Entries are never removed: a combatant who runs stays in the arena with
/// `fled` set, so handles held by status effects stay valid but resolve to a
/// departed combatant.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    combatants: Vec<Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combatant from its snapshot, returning its handle
    pub fn add(&mut self, snapshot: CombatantSnapshot) -> CombatantId {
        let id = CombatantId(self.combatants.len());
        self.combatants.push(Combatant::from_snapshot(id, snapshot));
        id
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id.0)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Find a combatant by external user id
    pub fn find_by_user(&self, user_id: u64) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.user_id == user_id)
    }

    /// Whether the handle refers to a combatant still fighting
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(|c| c.is_active())
    }

    /// Whether the handle refers to a combatant who has not left the battle
    pub fn is_present(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(|c| !c.fled)
    }

    /// Every active combatant except `of`, in roster order
    pub fn living_opponents(&self, of: CombatantId) -> Vec<CombatantId> {
        self.combatants
            .iter()
            .filter(|c| c.id() != of && c.is_active())
            .map(|c| c.id())
            .collect()
    }

    /// Display name for narration
    pub fn name(&self, id: CombatantId) -> &str {
        self.get(id).map(|c| c.name.as_str()).unwrap_or("someone")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_living_opponents_skips_self_fainted_and_fled() {
        let mut roster = Roster::new();
        let a = roster.add(CombatantSnapshot::new(1, "A", 10.0, 0.0));
        let b = roster.add(CombatantSnapshot::new(2, "B", 10.0, 0.0));
        let c = roster.add(CombatantSnapshot::new(3, "C", 10.0, 0.0));
        let d = roster.add(CombatantSnapshot::new(4, "D", 10.0, 0.0));

        roster.get_mut(c).unwrap().take_damage(10.0);
        roster.get_mut(d).unwrap().fled = true;

        assert_eq!(roster.living_opponents(a), vec![b]);
        assert!(!roster.is_present(d));
        assert!(roster.is_present(c));
        assert!(!roster.is_active(c));
        assert_eq!(roster.find_by_user(2).map(|c| c.id()), Some(b));
        assert_eq!(roster.name(CombatantId(99)), "someone");
    }
}
