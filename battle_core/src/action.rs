//! Action menu, target prompts and the selections made on them

use combat_core::CombatantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Basic attack with the actor's attack power
    Attack,
    /// Cast the known spell in this slot
    Spell(usize),
    /// Use the inventory item in this slot
    Item(usize),
    Meditate,
    Run,
    /// End the turn without acting
    Pass,
}

/// Answer to a [`TargetPrompt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetChoice {
    Single(CombatantId),
    /// Every candidate, for area spells
    All,
}

/// A selectable spell or item in the action menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub slot: usize,
    pub name: String,
    /// Mana cost label for spells (`???` while confused), charges for items
    pub detail: String,
}

/// Everything the presentation layer needs to render a human's turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnPrompt {
    pub actor: CombatantId,
    pub user_id: u64,
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    pub mana: f64,
    pub max_mana: f64,
    pub statuses: Vec<String>,
    pub spells: Vec<MenuEntry>,
    pub items: Vec<MenuEntry>,
}

impl TurnPrompt {
    /// Actions currently on the menu
    pub fn available_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::Attack];
        actions.extend(self.spells.iter().map(|s| Action::Spell(s.slot)));
        actions.extend(self.items.iter().map(|i| Action::Item(i.slot)));
        actions.extend([Action::Meditate, Action::Run]);
        actions
    }
}

fn bar(value: f64, max: f64) -> String {
    const LENGTH: usize = 10;
    let filled = if max > 0.0 {
        ((value / max) * LENGTH as f64).floor().clamp(0.0, LENGTH as f64) as usize
    } else {
        0
    };
    format!(
        "[{}{}] {:.2}/{:.2}",
        "#".repeat(filled),
        " ".repeat(LENGTH - filled),
        value,
        max
    )
}

impl fmt::Display for TurnPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}'s Turn", self.name)?;
        writeln!(f, "Health {}", bar(self.health, self.max_health))?;
        writeln!(f, "Mana   {}", bar(self.mana, self.max_mana))?;
        for (i, status) in self.statuses.iter().enumerate() {
            writeln!(f, "Status {}: {}", i + 1, status)?;
        }
        for spell in &self.spells {
            writeln!(f, "  Spell {}: {} ({} mana)", spell.slot, spell.name, spell.detail)?;
        }
        for item in &self.items {
            writeln!(f, "  Item {}: {} ({})", item.slot, item.name, item.detail)?;
        }
        write!(f, "Attack / Spell / Item / Meditate / Run")
    }
}

/// Candidate targets for a chosen action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPrompt {
    pub actor: CombatantId,
    pub action: Action,
    /// Name of the attack, spell or item
    pub label: String,
    /// Candidate handles with display names, in pool order
    pub candidates: Vec<(CombatantId, String)>,
    /// Area spells take every candidate at once
    pub area: bool,
}

impl TargetPrompt {
    pub fn contains(&self, id: CombatantId) -> bool {
        self.candidates.iter().any(|(c, _)| *c == id)
    }

    pub fn candidate_ids(&self) -> Vec<CombatantId> {
        self.candidates.iter().map(|(id, _)| *id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_rendering() {
        assert_eq!(bar(50.0, 100.0), "[#####     ] 50.00/100.00");
        assert_eq!(bar(0.0, 0.0), "[          ] 0.00/0.00");
    }

    #[test]
    fn test_available_actions_follow_menu() {
        let prompt = TurnPrompt {
            actor: CombatantId(0),
            user_id: 1,
            name: "Aria".to_string(),
            health: 10.0,
            max_health: 10.0,
            mana: 5.0,
            max_mana: 10.0,
            statuses: vec!["Burning".to_string()],
            spells: vec![MenuEntry {
                slot: 1,
                name: "Bolt".to_string(),
                detail: "???".to_string(),
            }],
            items: Vec::new(),
        };
        assert_eq!(
            prompt.available_actions(),
            vec![Action::Attack, Action::Spell(1), Action::Meditate, Action::Run]
        );
        let rendered = prompt.to_string();
        assert!(rendered.starts_with("Aria's Turn"));
        assert!(rendered.contains("Status 1: Burning"));
        assert!(rendered.contains("Bolt (??? mana)"));
    }
}
