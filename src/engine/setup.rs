//! Building the opening snapshot and running the mulligan.
//!
//! Under the London rule each player, starting player first, either keeps
//! their hand or shuffles it back and draws a fresh one. A player who keeps
//! after `n` mulligans puts `n` cards from hand on the bottom of their
//! library. Turn 1 begins once everybody has kept.

use std::collections::BTreeSet;

use im::Vector;
use tracing::{debug, info};

use super::actions::ActionHandler;
use super::run::{Progress, Run};
use super::{settle, Engine, Transition};
use crate::core::{
    Action, ActionKind, GameConfig, GameEvent, GameState, MulliganRule, MulliganState, PlayerId,
};
use crate::error::{contract_violation, Result, RuleViolation, SetupError};
use crate::turn::machine;
use crate::zones::{ZoneKey, ZonePosition};

/// Decks and rules for a new game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSetup {
    pub config: GameConfig,
    /// Card names, one deck per player in seat order.
    pub decks: Vec<Vec<String>>,
    pub starting_player: PlayerId,
}

impl GameSetup {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            decks: Vec::new(),
            starting_player: PlayerId(0),
        }
    }

    /// Add the next player's deck.
    #[must_use]
    pub fn with_deck<I, S>(mut self, cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decks.push(cards.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    /// Create the game: libraries, shuffles and opening hands, then either
    /// the first mulligan decision or turn 1.
    pub fn build(&self, engine: &Engine) -> std::result::Result<Transition, SetupError> {
        let config = &self.config;
        if self.decks.len() != config.player_count {
            return Err(SetupError::DeckCount {
                expected: config.player_count,
                got: self.decks.len(),
            });
        }
        for (seat, deck) in self.decks.iter().enumerate() {
            if let Some(unknown) = deck.iter().find(|name| engine.catalog().definition_for(name).is_none()) {
                return Err(SetupError::UnknownCard(unknown.clone()));
            }
            if deck.len() < config.starting_hand_size {
                return Err(SetupError::DeckTooSmall {
                    player: PlayerId(seat as u8),
                    size: deck.len(),
                    hand: config.starting_hand_size,
                });
            }
        }

        let mut state = GameState::new(config.clone());
        for (seat, deck) in self.decks.iter().enumerate() {
            let player = PlayerId(seat as u8);
            for name in deck {
                state.create_card(player, name, ZoneKey::library(player));
            }
        }
        let starting = if self.starting_player.index() < config.player_count {
            self.starting_player
        } else {
            PlayerId(0)
        };
        state.turn_mut().active = starting;

        let mut run = Run::new(engine, state);
        let players: Vec<PlayerId> = PlayerId::apnap(starting, config.player_count).collect();
        for &player in &players {
            run.shuffle_library(player);
            run.draw(player, config.starting_hand_size as u32);
        }
        info!(players = config.player_count, starting = %starting, seed = config.seed, "game created");

        match config.mulligan {
            MulliganRule::London => run.state_mut().set_mulligan(Some(MulliganState {
                order: players.into_iter().collect(),
                bottoming: false,
            })),
            MulliganRule::None => {
                let _ = machine::begin_game(&mut run);
            }
        }
        settle(&mut run);

        let (state, events) = run.finish();
        Ok(Transition { state, events })
    }
}

/// Handles `TakeMulligan`, `KeepHand` and `BottomCards`.
pub(crate) struct Mulligan;

impl ActionHandler for Mulligan {
    fn validate(&self, _engine: &Engine, state: &GameState, action: &Action) -> Result<()> {
        let Some(mulligan) = state.mulligan() else {
            return Err(RuleViolation::Mulligan("no mulligan is in progress".into()));
        };
        let player = action.player;
        if mulligan.deciding() != Some(player) {
            return Err(RuleViolation::Mulligan(format!("{} is not deciding", player)));
        }
        let taken = state.player(player).mulligans;
        match &action.kind {
            ActionKind::TakeMulligan | ActionKind::KeepHand if mulligan.bottoming => Err(
                RuleViolation::Mulligan("cards must be put on the bottom first".into()),
            ),
            ActionKind::TakeMulligan => {
                if taken as usize >= state.config().starting_hand_size {
                    return Err(RuleViolation::Mulligan("no cards left to mulligan".into()));
                }
                Ok(())
            }
            ActionKind::KeepHand => Ok(()),
            ActionKind::BottomCards { cards } => {
                if !mulligan.bottoming {
                    return Err(RuleViolation::Mulligan("keep a hand before bottoming".into()));
                }
                if cards.len() != taken as usize {
                    return Err(RuleViolation::Mulligan(format!(
                        "expected {} cards, got {}",
                        taken,
                        cards.len()
                    )));
                }
                let distinct: BTreeSet<_> = cards.iter().collect();
                if distinct.len() != cards.len() {
                    return Err(RuleViolation::Mulligan("a card was named twice".into()));
                }
                if let Some(&card) = cards
                    .iter()
                    .find(|&&c| state.zone_of(c) != Some(ZoneKey::hand(player)))
                {
                    return Err(RuleViolation::NotInHand(card));
                }
                Ok(())
            }
            _ => contract_violation("mulligan handler given another action"),
        }
    }

    fn execute(&self, run: &mut Run<'_>, action: &Action) -> Result<Progress> {
        let player = action.player;
        match &action.kind {
            ActionKind::TakeMulligan => {
                let library = ZoneKey::library(player);
                let hand: Vec<_> = run.state().hand(player).into_iter().collect();
                for card in hand {
                    let _ = run.state_mut().zones_mut().move_to(card, library, ZonePosition::Top);
                }
                run.shuffle_library(player);
                let size = run.state().config().starting_hand_size as u32;
                run.draw(player, size);
                let count = {
                    let mulligans = &mut run.state_mut().player_mut(player).mulligans;
                    *mulligans += 1;
                    *mulligans
                };
                debug!(player = %player, count, "mulligan");
                run.emit(GameEvent::Mulligan { player, count });
                Ok(Progress::Done)
            }
            ActionKind::KeepHand => {
                let mulligans = run.state().player(player).mulligans;
                run.emit(GameEvent::HandKept { player, mulligans });
                if mulligans == 0 {
                    return Ok(next_decider(run));
                }
                if let Some(mut state) = run.state().mulligan().cloned() {
                    state.bottoming = true;
                    run.state_mut().set_mulligan(Some(state));
                }
                Ok(Progress::Done)
            }
            ActionKind::BottomCards { cards } => {
                let library = ZoneKey::library(player);
                for &card in cards {
                    run.move_entity(card, library, ZonePosition::Bottom);
                }
                Ok(next_decider(run))
            }
            _ => contract_violation("mulligan handler given another action"),
        }
    }
}

/// The deciding player is done; move on, or start the game.
fn next_decider(run: &mut Run<'_>) -> Progress {
    let Some(mut mulligan) = run.state().mulligan().cloned() else {
        return Progress::Done;
    };
    let _ = mulligan.order.pop_front();
    mulligan.bottoming = false;
    finish_or_continue(run, mulligan.order)
}

fn finish_or_continue(run: &mut Run<'_>, order: Vector<PlayerId>) -> Progress {
    if order.is_empty() {
        run.state_mut().set_mulligan(None);
        debug!("all opening hands kept");
        return machine::begin_game(run);
    }
    run.state_mut().set_mulligan(Some(MulliganState {
        order,
        bottoming: false,
    }));
    Progress::Done
}

/// A player who leaves during the mulligan no longer decides.
pub(crate) fn drop_from_mulligan(run: &mut Run<'_>, player: PlayerId) -> Progress {
    let Some(mulligan) = run.state().mulligan().cloned() else {
        return Progress::Done;
    };
    if !mulligan.order.contains(&player) {
        return Progress::Done;
    }
    if mulligan.deciding() != Some(player) {
        let order = mulligan.order.into_iter().filter(|&p| p != player).collect();
        run.state_mut().set_mulligan(Some(MulliganState {
            order,
            bottoming: mulligan.bottoming,
        }));
        return Progress::Done;
    }
    next_decider(run)
}
