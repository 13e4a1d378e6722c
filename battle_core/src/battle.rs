//! Battle state machine
//!
//! A [`Battle`] moves through `Forming -> Active -> Concluded`. While active,
//! [`Battle::advance`] runs turns until a human has to choose an action, then
//! returns a [`TurnPrompt`]; [`Battle::submit`] completes that turn.

use crate::action::{Action, MenuEntry, TargetChoice, TargetPrompt, TurnPrompt};
use crate::config::{BattleConfig, TimeoutPolicy};
use crate::outcome::{AwardReason, BattleOutcome, ExperienceAward, Standing};
use crate::{ActionError, BattleError};
use combat_core::config::constants;
use combat_core::{
    filter_targets, reduce_statuses, CastOutcome, Combatant, CombatantId, CombatantSnapshot, Roster, Spell,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use spell_core::SpellType;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    /// Accepting joins
    Forming,
    Active,
    /// Terminal
    Concluded,
}

/// Result of [`Battle::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStep {
    /// A human must pick an action
    AwaitingAction(TurnPrompt),
    Concluded(BattleOutcome),
}

/// One battle in one channel
#[derive(Debug, Clone)]
pub struct Battle {
    config: BattleConfig,
    initiator: u64,
    phase: BattlePhase,
    roster: Roster,
    /// Fixed initiative rotation; only pruned, never re-rolled
    turn_order: VecDeque<CombatantId>,
    /// Human whose action is awaited
    pending: Option<CombatantId>,
    experience_pool: f64,
    narration: Vec<String>,
    drained: usize,
    turns: u32,
    winner: Option<CombatantId>,
    abandoned: Option<String>,
    rng: ChaCha8Rng,
}

impl Battle {
    /// Open a battle in the `Forming` phase
    pub fn new(initiator: u64, config: BattleConfig) -> Self {
        Self::with_rng(initiator, config, ChaCha8Rng::from_entropy())
    }

    /// Open a battle with deterministic rolls
    pub fn with_seed(initiator: u64, config: BattleConfig, seed: u64) -> Self {
        Self::with_rng(initiator, config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(initiator: u64, config: BattleConfig, rng: ChaCha8Rng) -> Self {
        let mut battle = Battle {
            config,
            initiator,
            phase: BattlePhase::Forming,
            roster: Roster::new(),
            turn_order: VecDeque::new(),
            pending: None,
            experience_pool: 0.0,
            narration: Vec::new(),
            drained: 0,
            turns: 0,
            winner: None,
            abandoned: None,
            rng,
        };
        battle.narrate("A battle is starting! Join to enter.");
        battle
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn initiator(&self) -> u64 {
        self.initiator
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Direct access to combatants, for scripted setups
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn turn_order(&self) -> Vec<CombatantId> {
        self.turn_order.iter().copied().collect()
    }

    /// Combatant whose action is awaited, if any
    pub fn pending_turn(&self) -> Option<CombatantId> {
        self.pending
    }

    pub fn experience_pool(&self) -> f64 {
        self.experience_pool
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns
    }

    /// Full narration log
    pub fn narration(&self) -> &[String] {
        &self.narration
    }

    /// Lines narrated since the previous drain
    pub fn drain_narration(&mut self) -> Vec<String> {
        let lines = self.narration[self.drained..].to_vec();
        self.drained = self.narration.len();
        lines
    }

    fn narrate(&mut self, line: impl Into<String>) {
        self.narration.push(line.into());
    }

    // ------------------------------------------------------------------
    // Forming
    // ------------------------------------------------------------------

    /// Add a participant, contributing to the experience pool
    pub fn join(&mut self, snapshot: CombatantSnapshot, current_xp: f64) -> Result<CombatantId, BattleError> {
        if self.phase != BattlePhase::Forming {
            return Err(BattleError::AlreadyStarted);
        }
        if self.roster.find_by_user(snapshot.user_id).is_some() {
            return Err(BattleError::AlreadyJoined(snapshot.user_id));
        }

        let contribution = self.config.experience.contribution(current_xp);
        self.experience_pool += contribution;

        let user_id = snapshot.user_id;
        let name = snapshot.name.clone();
        let id = self.roster.add(snapshot);

        tracing::info!(user_id, combatant = %id, contribution, pool = self.experience_pool, "participant joined");
        let count = self.roster.len();
        self.narrate(format!("{} joined the battle. {} players have joined the battle.", name, count));
        Ok(id)
    }

    /// Abort before the battle starts; only the initiator may do this
    pub fn cancel(&mut self, user_id: u64) -> Result<(), BattleError> {
        if self.phase != BattlePhase::Forming {
            return Err(BattleError::AlreadyStarted);
        }
        if user_id != self.initiator {
            return Err(BattleError::NotInitiator);
        }
        self.phase = BattlePhase::Concluded;
        self.abandoned = Some("Battle canceled.".to_string());
        self.narrate("Battle canceled.");
        tracing::info!(user_id, "battle cancelled");
        Ok(())
    }

    /// Roll initiative once and enter the `Active` phase
    pub fn start(&mut self) -> Result<(), BattleError> {
        if self.phase != BattlePhase::Forming {
            return Err(BattleError::AlreadyStarted);
        }
        let joined = self.roster.len();
        let required = self.config.min_participants;
        if joined < required {
            return Err(BattleError::NotEnoughParticipants { required, joined });
        }

        let sides = constants().initiative.die_sides;
        let rng = &mut self.rng;
        let rolls: Vec<(CombatantId, i64)> = self
            .roster
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.id(), i64::from(rng.gen_range(1..=sides)) + i64::from(c.speed)))
            .collect();

        self.turn_order = initiative_order(rolls);
        self.phase = BattlePhase::Active;

        let order: Vec<&str> = self.turn_order.iter().map(|&id| self.roster.name(id)).collect();
        let line = format!(
            "Battle has begun! {} goes first!\nTurn order: {}",
            order.first().copied().unwrap_or("nobody"),
            order.join(", ")
        );
        tracing::info!(participants = joined, order = ?self.turn_order, "battle started");
        self.narrate(line);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Active
    // ------------------------------------------------------------------

    /// Run turns until a human must act or the battle ends.
    ///
    /// Calling again while an action is pending returns the same prompt.
    pub fn advance(&mut self) -> Result<TurnStep, BattleError> {
        match self.phase {
            BattlePhase::Forming => return Err(BattleError::NotActive),
            BattlePhase::Concluded => return Ok(TurnStep::Concluded(self.outcome())),
            BattlePhase::Active => {}
        }

        if let Some(actor) = self.pending {
            match self.roster.get(actor) {
                Some(c) if c.is_active() => return Ok(TurnStep::AwaitingAction(turn_prompt(c))),
                _ => self.pending = None,
            }
        }

        loop {
            let roster = &self.roster;
            self.turn_order.retain(|&id| roster.is_active(id));

            if self.turn_order.len() <= 1 {
                self.conclude();
                return Ok(TurnStep::Concluded(self.outcome()));
            }
            if self.turns >= self.config.turn_limit {
                let limit = self.config.turn_limit;
                self.abandon(format!("turn limit of {} reached", limit));
                return Ok(TurnStep::Concluded(self.outcome()));
            }

            let Some(actor) = self.turn_order.pop_front() else {
                continue;
            };
            self.turn_order.push_back(actor);
            self.turns += 1;

            if self.begin_turn(actor) {
                if let Some(c) = self.roster.get(actor) {
                    self.pending = Some(actor);
                    return Ok(TurnStep::AwaitingAction(turn_prompt(c)));
                }
            }
        }
    }

    /// Status, passive and automatic phases of a turn.
    ///
    /// Returns true when a human action is needed to finish it.
    fn begin_turn(&mut self, actor: CombatantId) -> bool {
        let name = self.roster.name(actor).to_string();
        tracing::info!(turn = self.turns, combatant = %actor, name = %name, "turn started");
        self.narrate(format!("{}'s turn.", name));

        for line in reduce_statuses(&mut self.roster, actor) {
            self.narrate(line);
        }
        if !self.roster.is_active(actor) {
            self.narrate(format!("{} has fainted!", name));
            return false;
        }

        self.resolve_passives(actor, &name);

        let Some(c) = self.roster.get(actor) else {
            return false;
        };
        if !c.is_active() {
            self.narrate(format!("{} has fainted!", name));
            false
        } else if !c.can_move {
            self.narrate(format!("{} is paralyzed and cannot move!", name));
            false
        } else if c.is_autonomous() {
            self.autonomous_attack(actor);
            false
        } else {
            true
        }
    }

    fn resolve_passives(&mut self, actor: CombatantId, name: &str) {
        let passives: Vec<Spell> = match self.roster.get(actor) {
            Some(c) => c
                .abilities
                .iter()
                .filter(|s| s.spell_type().is_passive())
                .cloned()
                .collect(),
            None => return,
        };

        for spell in passives {
            let mana = self.roster.get(actor).map_or(0.0, Combatant::mana);
            if mana >= spell.mana_cost() {
                let outcomes = spell.cast(&mut self.roster, actor, &mut self.rng);
                let detail = outcomes
                    .first()
                    .map(|o| o.narrate(&self.roster))
                    .unwrap_or_default();
                tracing::debug!(combatant = %actor, spell = %spell.name(), "passive activated");
                self.narrate(format!("{} Passive effect activates {}!\n{}", name, spell.name(), detail));
            } else {
                self.narrate(format!("{} Passive effect {} fails to activate!", name, spell.name()));
            }
        }
    }

    /// AI turn: hit a random human opponent the actor is allowed to target
    fn autonomous_attack(&mut self, actor: CombatantId) {
        let humans: Vec<CombatantId> = self
            .roster
            .living_opponents(actor)
            .into_iter()
            .filter(|&id| self.roster.get(id).is_some_and(|c| !c.is_autonomous()))
            .collect();
        let pool = filter_targets(&self.roster, actor, humans);

        if pool.is_empty() {
            let line = format!("{} has no one to attack.", self.roster.name(actor));
            self.narrate(line);
            return;
        }
        let target = pool[self.rng.gen_range(0..pool.len())];
        self.basic_attack(actor, target);
    }

    fn basic_attack(&mut self, actor: CombatantId, target: CombatantId) {
        let amount = self.roster.get(actor).map_or(0.0, |c| c.attack_power);
        let fainted = self
            .roster
            .get_mut(target)
            .is_some_and(|victim| victim.take_damage(amount));

        let line = format!(
            "{} attacks {} for {:.1} damage!",
            self.roster.name(actor),
            self.roster.name(target),
            amount
        );
        self.narrate(line);
        if fainted {
            let line = format!("{} has fainted!", self.roster.name(target));
            self.narrate(line);
        }
    }

    fn check_turn(&self, actor: CombatantId) -> Result<&Combatant, ActionError> {
        if self.phase != BattlePhase::Active || self.pending != Some(actor) {
            return Err(ActionError::NotYourTurn);
        }
        self.roster.get(actor).ok_or(ActionError::NotYourTurn)
    }

    /// Validate an action and list its candidate targets.
    ///
    /// Returns `None` for actions that take no target.
    pub fn target_prompt(&self, actor: CombatantId, action: Action) -> Result<Option<TargetPrompt>, ActionError> {
        let c = self.check_turn(actor)?;
        let opponents = self.roster.living_opponents(actor);

        let (label, pool, area) = match action {
            Action::Attack => (
                "Attack".to_string(),
                filter_targets(&self.roster, actor, opponents),
                false,
            ),
            Action::Spell(slot) => {
                let spell = c.abilities.get(slot).ok_or(ActionError::UnknownSpell(slot))?;
                if spell.spell_type().is_passive() {
                    return Err(ActionError::PassiveSpell(spell.name().to_string()));
                }
                if c.mana() < spell.mana_cost() {
                    return Err(ActionError::InsufficientMana {
                        spell: spell.name().to_string(),
                        cost: spell.def().mana_cost,
                        mana: c.mana(),
                    });
                }
                (
                    spell.name().to_string(),
                    spell.get_targets(&self.roster, &opponents),
                    spell.spell_type() == SpellType::AreaOfEffect,
                )
            }
            Action::Item(slot) => {
                let item = c.inventory.get(slot).ok_or(ActionError::UnknownItem(slot))?;
                if item.spell.spell_type().is_passive() {
                    return Err(ActionError::PassiveSpell(item.name.clone()));
                }
                if item.charges == 0 {
                    return Err(ActionError::NoCharges(item.name.clone()));
                }
                (
                    item.name.clone(),
                    item.spell.get_targets(&self.roster, &opponents),
                    item.spell.spell_type() == SpellType::AreaOfEffect,
                )
            }
            Action::Meditate | Action::Run | Action::Pass => return Ok(None),
        };

        if pool.is_empty() {
            return Err(ActionError::NoValidTargets);
        }
        let candidates = pool
            .into_iter()
            .map(|id| (id, self.roster.name(id).to_string()))
            .collect();
        Ok(Some(TargetPrompt {
            actor,
            action,
            label,
            candidates,
            area,
        }))
    }

    /// Complete the pending turn with an action and, if it needs one, a target.
    ///
    /// A rejected selection leaves the turn pending.
    pub fn submit(&mut self, actor: CombatantId, action: Action, target: Option<TargetChoice>) -> Result<(), ActionError> {
        let targets = match self.target_prompt(actor, action)? {
            Some(prompt) => resolve_choice(&prompt, target)?,
            None => Vec::new(),
        };

        tracing::debug!(combatant = %actor, ?action, ?targets, "action submitted");
        match action {
            Action::Attack => {
                for target in targets {
                    self.basic_attack(actor, target);
                }
            }
            Action::Spell(slot) => self.cast_spell(actor, slot, targets),
            Action::Item(slot) => self.use_item(actor, slot, targets),
            Action::Meditate => self.meditate(actor),
            Action::Run => self.run_away(actor),
            Action::Pass => {
                let line = format!("{} passes the turn.", self.roster.name(actor));
                self.narrate(line);
            }
        }
        self.pending = None;
        Ok(())
    }

    /// Apply the timeout policy to the pending turn
    pub fn time_out(&mut self, actor: CombatantId, policy: TimeoutPolicy) -> Result<(), ActionError> {
        self.check_turn(actor)?;
        tracing::warn!(combatant = %actor, ?policy, "action timed out");
        let line = format!("{} ran out of time.", self.roster.name(actor));
        self.narrate(line);
        let action = match policy {
            TimeoutPolicy::PassTurn => Action::Pass,
            TimeoutPolicy::Forfeit => Action::Run,
        };
        self.submit(actor, action, None)
    }

    fn cast_spell(&mut self, actor: CombatantId, slot: usize, targets: Vec<CombatantId>) {
        let Some(spell) = self.roster.get(actor).and_then(|c| c.abilities.get(slot)).cloned() else {
            return;
        };
        let header = format!("{} casts {}", self.roster.name(actor), spell.name());
        let outcomes = spell.cast(&mut self.roster, targets, &mut self.rng);
        self.narrate_outcomes(header, spell.spell_type() == SpellType::AreaOfEffect, &outcomes);
    }

    fn use_item(&mut self, actor: CombatantId, slot: usize, targets: Vec<CombatantId>) {
        let Some(item) = self.roster.get_mut(actor).and_then(|c| c.inventory.get_mut(slot)) else {
            return;
        };
        item.charges = item.charges.saturating_sub(1);
        let spell = item.spell.clone();
        let name = item.name.clone();

        let header = format!("{} uses {}", self.roster.name(actor), name);
        let outcomes = spell.cast(&mut self.roster, targets, &mut self.rng);
        self.narrate_outcomes(header, spell.spell_type() == SpellType::AreaOfEffect, &outcomes);
    }

    fn narrate_outcomes(&mut self, header: String, area: bool, outcomes: &[CastOutcome]) {
        let mut lines = Vec::with_capacity(outcomes.len() + 1);
        if area {
            lines.push(format!("{} on everyone!", header));
            for outcome in outcomes {
                lines.push(format!("{}: {}", self.roster.name(outcome.target()), outcome.narrate(&self.roster)));
            }
        } else {
            for outcome in outcomes {
                lines.push(format!("{} on {}!", header, self.roster.name(outcome.target())));
                lines.push(outcome.narrate(&self.roster));
            }
        }
        self.narrate(lines.join("\n"));

        let fainted: Vec<String> = outcomes
            .iter()
            .filter(|o| o.fainted())
            .map(|o| format!("{} has fainted!", self.roster.name(o.target())))
            .collect();
        for line in fainted {
            self.narrate(line);
        }
    }

    fn meditate(&mut self, actor: CombatantId) {
        let divisor = u64::from(constants().meditate.min_divisor.max(1));
        let Some(c) = self.roster.get_mut(actor) else {
            return;
        };
        let max = c.max_mana().floor().max(0.0) as u64;
        let restore = self.rng.gen_range(max / divisor..=max);
        c.restore_mana(restore as f64);

        let line = format!(
            "{} meditates and restores {} mana!\nCurrent Mana {:.1}/{:.1}",
            c.name,
            restore,
            c.mana(),
            c.max_mana()
        );
        self.narrate(line);
    }

    fn run_away(&mut self, actor: CombatantId) {
        if let Some(c) = self.roster.get_mut(actor) {
            c.fled = true;
        }
        self.turn_order.retain(|&id| id != actor);
        tracing::info!(combatant = %actor, "combatant fled");
        let line = format!("{} flees the battle!", self.roster.name(actor));
        self.narrate(line);
    }

    // ------------------------------------------------------------------
    // Concluded
    // ------------------------------------------------------------------

    fn conclude(&mut self) {
        self.phase = BattlePhase::Concluded;
        self.pending = None;
        self.winner = if self.turn_order.len() == 1 {
            self.turn_order.front().copied()
        } else {
            None
        };

        let pool = self.experience_pool;
        let mut lines: Vec<String> = self
            .roster
            .iter()
            .filter(|c| !c.fled)
            .map(|c| format!("{} has received {:.1} experience points!", c.name, pool))
            .collect();
        match self.winner {
            Some(winner) => {
                let name = self.roster.name(winner);
                lines.push(format!("Because they won, {} has received {:.1} experience points!", name, pool));
                lines.push(format!("The battle is over! {} is the winner!", name));
            }
            None => lines.push("The battle has ended with no winner.".to_string()),
        }
        for line in lines {
            self.narrate(line);
        }

        tracing::info!(winner = ?self.winner, pool, turns = self.turns, "battle concluded");
    }

    /// End the battle early with partial results and no awards
    pub fn abandon(&mut self, reason: impl Into<String>) {
        if self.phase == BattlePhase::Concluded {
            return;
        }
        let reason = reason.into();
        tracing::warn!(reason = %reason, turns = self.turns, "battle abandoned");
        self.phase = BattlePhase::Concluded;
        self.pending = None;
        self.narrate(format!("The battle was abandoned: {}", reason));
        self.abandoned = Some(reason);
    }

    /// Result values; awards are only granted on a natural conclusion
    pub fn outcome(&self) -> BattleOutcome {
        let mut awards = Vec::new();
        if self.abandoned.is_none() && self.phase == BattlePhase::Concluded {
            awards.extend(self.roster.iter().filter(|c| !c.fled).map(|c| ExperienceAward {
                user_id: c.user_id,
                amount: self.experience_pool,
                reason: AwardReason::Participation,
            }));
            if let Some(winner) = self.winner.and_then(|id| self.roster.get(id)) {
                awards.push(ExperienceAward {
                    user_id: winner.user_id,
                    amount: self.experience_pool,
                    reason: AwardReason::Victory,
                });
            }
        }

        BattleOutcome {
            winner: self.winner.and_then(|id| self.roster.get(id)).map(|c| c.user_id),
            experience_pool: self.experience_pool,
            awards,
            standings: self.roster.iter().map(Standing::from).collect(),
            narration: self.narration.clone(),
            abandoned: self.abandoned.clone(),
        }
    }
}

fn turn_prompt(c: &Combatant) -> TurnPrompt {
    let spells = c
        .abilities
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.spell_type().is_passive())
        .map(|(slot, s)| MenuEntry {
            slot,
            name: s.name().to_string(),
            detail: s.cost_label(c),
        })
        .collect();
    let items = c
        .inventory
        .iter()
        .enumerate()
        .filter(|(_, i)| i.is_usable())
        .map(|(slot, i)| MenuEntry {
            slot,
            name: i.name.clone(),
            detail: format!("{} charges", i.charges),
        })
        .collect();

    TurnPrompt {
        actor: c.id(),
        user_id: c.user_id,
        name: c.name.clone(),
        health: c.health(),
        max_health: c.max_health(),
        mana: c.mana(),
        max_mana: c.max_mana(),
        statuses: c.status_names(),
        spells,
        items,
    }
}

fn resolve_choice(prompt: &TargetPrompt, choice: Option<TargetChoice>) -> Result<Vec<CombatantId>, ActionError> {
    match (choice, prompt.area) {
        (None, _) => Err(ActionError::MissingTarget),
        (Some(TargetChoice::All), true) => Ok(prompt.candidate_ids()),
        (Some(TargetChoice::All), false) => Err(ActionError::SingleTargetRequired),
        (Some(TargetChoice::Single(_)), true) => Err(ActionError::AreaTargetRequired),
        (Some(TargetChoice::Single(id)), false) if prompt.contains(id) => Ok(vec![id]),
        (Some(TargetChoice::Single(id)), false) => Err(ActionError::InvalidTarget(id)),
    }
}

/// Highest initiative first; ties keep join order
fn initiative_order(mut rolls: Vec<(CombatantId, i64)>) -> VecDeque<CombatantId> {
    rolls.sort_by(|a, b| b.1.cmp(&a.1));
    rolls.into_iter().map(|(id, _)| id).collect()
}
