use crate::types::{Element, SpellType, StatusKind};
use serde::{Deserialize, Serialize};

/// Status effect carried by a spell, instantiated fresh on every cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTemplate {
    pub kind: StatusKind,
    /// Effect-specific magnitude
    pub power: u32,
    /// Probability (0-100) of taking hold
    #[serde(default = "default_chance")]
    pub chance: u8,
    /// Turns the effect lasts once attached
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_chance() -> u8 {
    100
}

fn default_duration() -> u32 {
    3
}

impl StatusTemplate {
    pub fn new(kind: StatusKind, power: u32, chance: u8, duration: u32) -> Self {
        StatusTemplate {
            kind,
            power,
            chance,
            duration,
        }
    }
}

/// Immutable spell definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: String,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub mana_cost: u32,
    /// Carried for persistence; the turn loop does not enforce it
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub status: Option<StatusTemplate>,
    pub spell_type: SpellType,
}

impl SpellDef {
    /// Create a damaging spell with no status effect
    pub fn new(name: impl Into<String>, spell_type: SpellType, power: u32, mana_cost: u32) -> Self {
        SpellDef {
            name: name.into(),
            power,
            mana_cost,
            cooldown: 0,
            element: Element::Neutral,
            status: None,
            spell_type,
        }
    }

    /// Builder: set the element
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    /// Builder: attach a status template
    pub fn with_status(mut self, status: StatusTemplate) -> Self {
        self.status = Some(status);
        self
    }

    /// Builder: set the cooldown
    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn is_passive(&self) -> bool {
        self.spell_type.is_passive()
    }
}

/// An inventory item enchanted with a single-use spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    /// Item spells never cost mana; any cost on the definition is ignored
    pub spell: SpellDef,
    pub charges: u32,
}

impl ItemDef {
    pub fn new(name: impl Into<String>, spell: SpellDef, charges: u32) -> Self {
        let mut spell = spell;
        spell.mana_cost = 0;
        ItemDef {
            name: name.into(),
            spell,
            charges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_spells_are_free() {
        let spell = SpellDef::new("Fireball", SpellType::SingleTarget, 12, 30);
        let item = ItemDef::new("Ember Scroll", spell, 2);
        assert_eq!(item.spell.mana_cost, 0);
        assert_eq!(item.spell.power, 12);
        assert_eq!(item.charges, 2);
    }

    #[test]
    fn test_builder() {
        let spell = SpellDef::new("Hex", SpellType::AreaOfEffect, 0, 15)
            .with_element(Element::Dark)
            .with_status(StatusTemplate::new(StatusKind::Poisoned, 10, 80, 3))
            .with_cooldown(2);
        assert_eq!(spell.element, Element::Dark);
        assert_eq!(spell.status.map(|s| s.kind), Some(StatusKind::Poisoned));
        assert_eq!(spell.cooldown, 2);
        assert!(!spell.is_passive());
    }
}
