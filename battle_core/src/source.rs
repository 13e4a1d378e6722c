//! Asynchronous abstraction for sourcing human choices.
//!
//! The driver plugs in an [`ActionSource`] so the same battle loop can run
//! against a chat frontend, a terminal, scripted fixtures or a random bot.

use crate::action::{Action, TargetChoice, TargetPrompt, TurnPrompt};
use crate::SourceError;
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

/// The suspension point of a human turn.
///
/// Implementations may take as long as they like; the driver bounds each call
/// with the configured timeout.
#[async_trait]
pub trait ActionSource: Send + Sync {
    /// Pick one entry of the action menu
    async fn await_action(&self, prompt: &TurnPrompt) -> Result<Action, SourceError>;

    /// Pick a target for the chosen action
    async fn await_target(&self, prompt: &TargetPrompt) -> Result<TargetChoice, SourceError>;
}

/// Picks uniformly among the offered actions and targets.
/// Used by the headless simulator.
#[derive(Debug)]
pub struct RandomActionSource {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomActionSource {
    pub fn new(seed: u64) -> Self {
        RandomActionSource {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn pick(&self, len: usize) -> Result<usize, SourceError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SourceError::Other("random source lock poisoned".to_string()))?;
        Ok(rng.gen_range(0..len.max(1)))
    }
}

#[async_trait]
impl ActionSource for RandomActionSource {
    async fn await_action(&self, prompt: &TurnPrompt) -> Result<Action, SourceError> {
        // never run away; it makes for short simulations
        let actions: Vec<Action> = prompt
            .available_actions()
            .into_iter()
            .filter(|a| *a != Action::Run)
            .collect();
        let index = self.pick(actions.len())?;
        Ok(actions.get(index).copied().unwrap_or(Action::Pass))
    }

    async fn await_target(&self, prompt: &TargetPrompt) -> Result<TargetChoice, SourceError> {
        if prompt.area {
            return Ok(TargetChoice::All);
        }
        let index = self.pick(prompt.candidates.len())?;
        prompt
            .candidates
            .get(index)
            .map(|(id, _)| TargetChoice::Single(*id))
            .ok_or_else(|| SourceError::Other("no candidates offered".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::CombatantId;

    fn target_prompt(area: bool) -> TargetPrompt {
        TargetPrompt {
            actor: CombatantId(0),
            action: Action::Attack,
            label: "Attack".to_string(),
            candidates: vec![(CombatantId(1), "B".to_string()), (CombatantId(2), "C".to_string())],
            area,
        }
    }

    #[tokio::test]
    async fn test_random_target_is_a_candidate() {
        let source = RandomActionSource::new(3);
        let prompt = target_prompt(false);
        for _ in 0..20 {
            match source.await_target(&prompt).await.unwrap() {
                TargetChoice::Single(id) => assert!(prompt.contains(id)),
                TargetChoice::All => panic!("single-target prompt answered with All"),
            }
        }
        assert_eq!(source.await_target(&target_prompt(true)).await.unwrap(), TargetChoice::All);
    }
}
