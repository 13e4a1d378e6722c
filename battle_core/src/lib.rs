//! battle_core - Battle lifecycle, turn loop and input plumbing
//!
//! This library provides:
//! - Battle: the Forming -> Active -> Concluded state machine
//! - ActionSource: the suspension point where human input is awaited
//! - run_battle: async driver applying per-prompt timeouts
//! - BattleRegistry: explicit map of open battles keyed by channel
//! - BattleOutcome: plain result values for persistence and presentation

pub mod action;
pub mod battle;
pub mod config;
pub mod driver;
pub mod outcome;
pub mod registry;
pub mod source;

pub use action::{Action, MenuEntry, TargetChoice, TargetPrompt, TurnPrompt};
pub use battle::{Battle, BattlePhase, TurnStep};
pub use config::{BattleConfig, ExperienceConfig, TimeoutConfig, TimeoutPolicy};
pub use driver::run_battle;
pub use outcome::{AwardReason, BattleOutcome, ExperienceAward, Standing};
pub use registry::BattleRegistry;
pub use source::{ActionSource, RandomActionSource};

use combat_core::CombatantId;
use thiserror::Error;

/// Misuse of the battle lifecycle
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BattleError {
    #[error("The battle has already started")]
    AlreadyStarted,
    #[error("The battle is not in progress")]
    NotActive,
    #[error("User {0} has already joined")]
    AlreadyJoined(u64),
    #[error("Need at least {required} participants to start, have {joined}")]
    NotEnoughParticipants { required: usize, joined: usize },
    #[error("Only the battle initiator can cancel")]
    NotInitiator,
}

/// A rejected action or target selection.
///
/// Rejections never end the turn; the actor is asked again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("It's not your turn!")]
    NotYourTurn,
    #[error("No spell in slot {0}")]
    UnknownSpell(usize),
    #[error("No item in slot {0}")]
    UnknownItem(usize),
    #[error("{0} is passive and cannot be cast")]
    PassiveSpell(String),
    #[error("You don't have enough mana to cast {spell}!")]
    InsufficientMana { spell: String, cost: u32, mana: f64 },
    #[error("{0} has no charges left")]
    NoCharges(String),
    #[error("Invalid target {0}")]
    InvalidTarget(CombatantId),
    #[error("Choose a single target")]
    SingleTargetRequired,
    #[error("Area spells hit every target")]
    AreaTargetRequired,
    #[error("A target is required")]
    MissingTarget,
    #[error("There is nothing you can target")]
    NoValidTargets,
}

/// Error from the battle registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("A battle is already open in channel {0}")]
    ChannelBusy(u64),
    #[error("No battle in channel {0}")]
    NoBattle(u64),
    #[error("The battle in channel {0} is already running")]
    Running(u64),
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// The action source failed to produce input
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Action source disconnected: {0}")]
    Disconnected(String),
    #[error("Action source error: {0}")]
    Other(String),
}
