use crate::battle::Battle;
use crate::config::BattleConfig;
use crate::RegistryError;
use combat_core::{CombatantId, CombatantSnapshot};
use std::collections::HashMap;

/// A channel's battle: still gathering players, or handed to a driver
#[derive(Debug)]
enum Slot {
    Forming(Battle),
    /// The driver owns the battle exclusively until it releases the channel
    Running,
}

/// Open battles keyed by channel id.
///
/// Owned by the orchestrating service and passed by reference; at most one
/// battle per channel.
#[derive(Debug, Default)]
pub struct BattleRegistry {
    battles: HashMap<u64, Slot>,
}

impl BattleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a forming battle in `channel`
    pub fn open(&mut self, channel: u64, initiator: u64, config: BattleConfig) -> Result<&mut Battle, RegistryError> {
        self.open_with(channel, Battle::new(initiator, config))
    }

    /// Register an already constructed battle, e.g. one with a fixed seed
    pub fn open_with(&mut self, channel: u64, battle: Battle) -> Result<&mut Battle, RegistryError> {
        if self.battles.contains_key(&channel) {
            return Err(RegistryError::ChannelBusy(channel));
        }
        tracing::info!(channel, initiator = battle.initiator(), "battle opened");
        match self.battles.entry(channel).or_insert(Slot::Forming(battle)) {
            Slot::Forming(battle) => Ok(battle),
            Slot::Running => Err(RegistryError::Running(channel)),
        }
    }

    /// The forming battle in `channel`
    pub fn get_mut(&mut self, channel: u64) -> Result<&mut Battle, RegistryError> {
        match self.battles.get_mut(&channel) {
            Some(Slot::Forming(battle)) => Ok(battle),
            Some(Slot::Running) => Err(RegistryError::Running(channel)),
            None => Err(RegistryError::NoBattle(channel)),
        }
    }

    pub fn join(&mut self, channel: u64, snapshot: CombatantSnapshot, current_xp: f64) -> Result<CombatantId, RegistryError> {
        Ok(self.get_mut(channel)?.join(snapshot, current_xp)?)
    }

    /// Cancel a forming battle and free the channel
    pub fn cancel(&mut self, channel: u64, user_id: u64) -> Result<(), RegistryError> {
        self.get_mut(channel)?.cancel(user_id)?;
        self.battles.remove(&channel);
        Ok(())
    }

    /// Start the battle and hand it to the caller.
    ///
    /// The channel stays busy until [`Self::release`] is called.
    pub fn start(&mut self, channel: u64) -> Result<Battle, RegistryError> {
        self.get_mut(channel)?.start()?;
        match self.battles.insert(channel, Slot::Running) {
            Some(Slot::Forming(battle)) => Ok(battle),
            _ => Err(RegistryError::NoBattle(channel)),
        }
    }

    /// Free a channel whose battle has finished
    pub fn release(&mut self, channel: u64) {
        if self.battles.remove(&channel).is_some() {
            tracing::info!(channel, "channel released");
        }
    }

    pub fn is_busy(&self, channel: u64) -> bool {
        self.battles.contains_key(&channel)
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattlePhase;
    use crate::BattleError;

    fn setup() -> BattleRegistry {
        let mut registry = BattleRegistry::new();
        registry
            .open_with(7, Battle::with_seed(1, BattleConfig::default(), 5))
            .unwrap();
        registry
    }

    #[test]
    fn test_one_battle_per_channel() {
        let mut registry = setup();
        let err = registry.open(7, 2, BattleConfig::default()).unwrap_err();
        assert!(matches!(err, RegistryError::ChannelBusy(7)));
        registry.open(8, 2, BattleConfig::default()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_start_hands_off_and_keeps_channel_busy() {
        let mut registry = setup();
        registry.join(7, CombatantSnapshot::new(1, "Aria", 10.0, 0.0), 0.0).unwrap();
        registry.join(7, CombatantSnapshot::new(2, "Bram", 10.0, 0.0), 0.0).unwrap();

        let battle = registry.start(7).unwrap();
        assert_eq!(battle.phase(), BattlePhase::Active);
        assert!(registry.is_busy(7));
        assert!(matches!(registry.get_mut(7), Err(RegistryError::Running(7))));
        assert!(matches!(
            registry.open(7, 3, BattleConfig::default()),
            Err(RegistryError::ChannelBusy(7))
        ));

        registry.release(7);
        assert!(!registry.is_busy(7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_start_keeps_battle_forming() {
        let mut registry = setup();
        registry.join(7, CombatantSnapshot::new(1, "Aria", 10.0, 0.0), 0.0).unwrap();
        let err = registry.start(7).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Battle(BattleError::NotEnoughParticipants { .. })
        ));
        assert_eq!(registry.get_mut(7).unwrap().phase(), BattlePhase::Forming);
    }

    #[test]
    fn test_cancel_frees_channel() {
        let mut registry = setup();
        let err = registry.cancel(7, 99).unwrap_err();
        assert!(matches!(err, RegistryError::Battle(BattleError::NotInitiator)));
        registry.cancel(7, 1).unwrap();
        assert!(!registry.is_busy(7));
        assert!(matches!(registry.cancel(7, 1), Err(RegistryError::NoBattle(7))));
    }
}
