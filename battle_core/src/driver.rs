//! Async driver: runs a started battle to completion against an action source

use crate::action::{Action, TargetChoice, TurnPrompt};
use crate::battle::{Battle, TurnStep};
use crate::outcome::BattleOutcome;
use crate::source::ActionSource;
use crate::SourceError;
use combat_core::CombatantId;
use std::time::Duration;
use tokio::time::timeout;

/// How one human turn ended
enum TurnEnd {
    Submitted,
    TimedOut,
}

/// Drive `battle` until it concludes.
///
/// Each prompt is bounded by the configured timeout; a timeout, or too many
/// rejected selections, applies the timeout policy to the turn. A failing
/// source abandons the battle with partial results.
pub async fn run_battle<S>(battle: &mut Battle, source: &S) -> BattleOutcome
where
    S: ActionSource + ?Sized,
{
    loop {
        let prompt = match battle.advance() {
            Ok(TurnStep::Concluded(outcome)) => return outcome,
            Ok(TurnStep::AwaitingAction(prompt)) => prompt,
            Err(e) => {
                battle.abandon(e.to_string());
                return battle.outcome();
            }
        };

        match take_turn(battle, source, &prompt).await {
            Ok(TurnEnd::Submitted) => {}
            Ok(TurnEnd::TimedOut) => {
                let policy = battle.config().timeouts.on_timeout;
                if let Err(e) = battle.time_out(prompt.actor, policy) {
                    battle.abandon(e.to_string());
                }
            }
            Err(e) => {
                tracing::error!(combatant = %prompt.actor, error = %e, "action source failed");
                battle.abandon(e.to_string());
            }
        }
    }
}

async fn take_turn<S>(battle: &mut Battle, source: &S, prompt: &TurnPrompt) -> Result<TurnEnd, SourceError>
where
    S: ActionSource + ?Sized,
{
    let timeouts = battle.config().timeouts.clone();
    let actor = prompt.actor;
    let mut rejections = 0;

    while rejections < timeouts.max_rejections {
        let Some(action) = bounded(timeouts.action(), source.await_action(prompt)).await? else {
            return Ok(TurnEnd::TimedOut);
        };

        let target = match battle.target_prompt(actor, action) {
            Ok(Some(target_prompt)) => {
                match bounded(timeouts.target(), source.await_target(&target_prompt)).await? {
                    Some(choice) => Some(choice),
                    None => return Ok(TurnEnd::TimedOut),
                }
            }
            Ok(None) => None,
            Err(e) => {
                reject(actor, action, None, &e);
                rejections += 1;
                continue;
            }
        };

        match battle.submit(actor, action, target) {
            Ok(()) => return Ok(TurnEnd::Submitted),
            Err(e) => {
                reject(actor, action, target, &e);
                rejections += 1;
            }
        }
    }

    tracing::warn!(combatant = %actor, rejections, "too many rejected selections");
    Ok(TurnEnd::TimedOut)
}

/// `Ok(None)` when the deadline passes first
async fn bounded<T, F>(limit: Duration, request: F) -> Result<Option<T>, SourceError>
where
    F: std::future::Future<Output = Result<T, SourceError>>,
{
    match timeout(limit, request).await {
        Ok(answer) => answer.map(Some),
        Err(_) => Ok(None),
    }
}

fn reject(actor: CombatantId, action: Action, target: Option<TargetChoice>, error: &crate::ActionError) {
    tracing::warn!(combatant = %actor, ?action, ?target, error = %error, "selection rejected");
}
