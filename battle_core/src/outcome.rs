//! Result values handed to persistence and presentation

use combat_core::{Combatant, CombatantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardReason {
    /// Every participant who stayed to the end
    Participation,
    /// Granted to the winner on top of participation
    Victory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAward {
    pub user_id: u64,
    pub amount: f64,
    pub reason: AwardReason,
}

/// Final vitals of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: CombatantId,
    pub user_id: u64,
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    pub mana: f64,
    pub max_mana: f64,
    pub fainted: bool,
    pub fled: bool,
}

impl From<&Combatant> for Standing {
    fn from(c: &Combatant) -> Self {
        Standing {
            id: c.id(),
            user_id: c.user_id,
            name: c.name.clone(),
            health: c.health(),
            max_health: c.max_health(),
            mana: c.mana(),
            max_mana: c.max_mana(),
            fainted: c.is_fainted(),
            fled: c.fled,
        }
    }
}

/// How a battle ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// User id of the sole survivor, if any
    pub winner: Option<u64>,
    pub experience_pool: f64,
    pub awards: Vec<ExperienceAward>,
    pub standings: Vec<Standing>,
    /// Full narration log
    pub narration: Vec<String>,
    /// Set when the battle was cancelled or cut short
    pub abandoned: Option<String>,
}

impl BattleOutcome {
    /// Sum of awards for one user
    pub fn total_award(&self, user_id: u64) -> f64 {
        self.awards
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.amount)
            .sum()
    }
}
