//! Shared fixtures for the integration tests: a small card pool and a
//! builder for mid-game positions.

#![allow(dead_code)]

use ccg_rules::cards::{
    AbilityCost, ActivatedAbility, CardDefinition, CardRegistry, CardType, Color, Keyword, Mana,
    TriggeredAbility,
};
use ccg_rules::core::{Action, GameConfig, GameState, PlayerId};
use ccg_rules::effects::{Amount, Effect, EffectTarget, TargetFilter, TargetRequirement};
use ccg_rules::engine::{Engine, Transition};
use ccg_rules::triggers::TriggerCondition;
use ccg_rules::turn::Step;
use ccg_rules::zones::ZoneKind;
use ccg_rules::EntityId;

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);
pub const P2: PlayerId = PlayerId::new(2);
pub const P3: PlayerId = PlayerId::new(3);

fn cost(s: &str) -> ccg_rules::cards::ManaCost {
    s.parse().expect("test mana cost")
}

fn any_target() -> EffectTarget {
    EffectTarget::Targeted(0)
}

/// The card pool every integration test draws from.
pub fn catalog() -> CardRegistry {
    CardRegistry::new()
        // Lands
        .with(CardDefinition::land("Forest", Mana::Colored(Color::Green)))
        .with(CardDefinition::land("Mountain", Mana::Colored(Color::Red)))
        .with(CardDefinition::land("Island", Mana::Colored(Color::Blue)))
        .with(CardDefinition::land("Swamp", Mana::Colored(Color::Black)))
        .with(CardDefinition::land("Plains", Mana::Colored(Color::White)))
        // Creatures
        .with(CardDefinition::creature("Grizzly Bears", cost("1G"), 2, 2))
        .with(CardDefinition::creature("Giant Spider", cost("3G"), 2, 4).with_keyword(Keyword::Reach))
        .with(CardDefinition::creature("Wind Drake", cost("2U"), 2, 2).with_keyword(Keyword::Flying))
        .with(
            CardDefinition::creature("Colossal Dreadmaw", cost("4GG"), 6, 6)
                .with_keyword(Keyword::Trample),
        )
        .with(
            CardDefinition::creature("White Knight", cost("WW"), 2, 2)
                .with_keyword(Keyword::FirstStrike),
        )
        .with(
            CardDefinition::creature("Typhoid Rats", cost("B"), 1, 1)
                .with_keyword(Keyword::Deathtouch),
        )
        .with(
            CardDefinition::creature("Llanowar Elves", cost("G"), 1, 1).with_activated(
                ActivatedAbility::new(
                    "T: Add G.",
                    AbilityCost::tap(),
                    Effect::AddMana {
                        mana: Some(Mana::Colored(Color::Green)),
                        amount: 1,
                    },
                ),
            ),
        )
        .with(
            CardDefinition::creature("Prodigal Pyromancer", cost("2R"), 1, 1).with_activated(
                ActivatedAbility::new(
                    "T: Deal 1 damage to any target.",
                    AbilityCost::tap(),
                    Effect::damage(1, any_target()),
                )
                .with_target(TargetRequirement::one(TargetFilter::Any)),
            ),
        )
        .with(
            CardDefinition::creature("Soul Warden", cost("W"), 1, 1).with_triggered(
                TriggeredAbility::new(
                    "Whenever another creature enters, you gain 1 life.",
                    TriggerCondition::AnotherCreatureEnters,
                    Effect::GainLife {
                        amount: Amount::Fixed(1),
                        target: EffectTarget::Controller,
                    },
                ),
            ),
        )
        .with(
            CardDefinition::creature("Blisterstick Shaman", cost("2R"), 2, 1).with_triggered(
                TriggeredAbility::new(
                    "When this enters, it deals 1 damage to any target.",
                    TriggerCondition::EntersBattlefield,
                    Effect::damage(1, any_target()),
                )
                .with_target(TargetRequirement::one(TargetFilter::Any)),
            ),
        )
        .with(
            CardDefinition::creature("Elvish Visionary", cost("1G"), 1, 1).with_triggered(
                TriggeredAbility::new(
                    "When this enters, draw a card.",
                    TriggerCondition::EntersBattlefield,
                    Effect::draw(1),
                ),
            ),
        )
        .with(CardDefinition::creature("Soldier", cost(""), 1, 1).as_token())
        // Other permanents
        .with(
            CardDefinition::new("Phyrexian Arena")
                .with_cost(cost("1BB"))
                .with_type(CardType::Enchantment)
                .with_triggered(TriggeredAbility::new(
                    "At the beginning of your upkeep, you draw a card and you lose 1 life.",
                    TriggerCondition::BeginningOfYourUpkeep,
                    Effect::Composite(vec![
                        Effect::draw(1),
                        Effect::LoseLife {
                            amount: Amount::Fixed(1),
                            target: EffectTarget::Controller,
                        },
                    ]),
                )),
        )
        .with(
            CardDefinition::new("Goblin Bombardment")
                .with_cost(cost("1R"))
                .with_type(CardType::Enchantment)
                .with_activated(
                    ActivatedAbility::new(
                        "Sacrifice a creature: Deal 1 damage to any target.",
                        AbilityCost::default().with_sacrifice(TargetFilter::CreatureYouControl, 1),
                        Effect::damage(1, any_target()),
                    )
                    .with_target(TargetRequirement::one(TargetFilter::Any)),
                ),
        )
        // Instants and sorceries
        .with(
            CardDefinition::instant("Lightning Bolt", cost("R"), Effect::damage(3, any_target()))
                .with_spell_target(TargetRequirement::one(TargetFilter::Any)),
        )
        .with(
            CardDefinition::instant("Shock", cost("R"), Effect::damage(2, any_target()))
                .with_spell_target(TargetRequirement::one(TargetFilter::Any)),
        )
        .with(
            CardDefinition::instant(
                "Giant Growth",
                cost("G"),
                Effect::ModifyPowerToughness {
                    power: 3,
                    toughness: 3,
                    target: any_target(),
                },
            )
            .with_spell_target(TargetRequirement::one(TargetFilter::Creature)),
        )
        .with(
            CardDefinition::instant(
                "Cancel",
                cost("1U"),
                Effect::CounterSpell {
                    target: any_target(),
                },
            )
            .with_spell_target(TargetRequirement::one(TargetFilter::Spell)),
        )
        .with(
            CardDefinition::instant(
                "Raise the Alarm",
                cost("1W"),
                Effect::CreateToken {
                    name: "Soldier".into(),
                    count: Amount::Fixed(2),
                },
            ),
        )
        .with(CardDefinition::sorcery("Divination", cost("2U"), Effect::draw(2)))
        .with(
            CardDefinition::sorcery(
                "Fireball",
                cost("XR"),
                Effect::DealDamage {
                    amount: Amount::X,
                    target: any_target(),
                },
            )
            .with_spell_target(TargetRequirement::one(TargetFilter::Any)),
        )
        .with(CardDefinition::sorcery(
            "Reckless Offering",
            cost("1B"),
            Effect::if_you_do(
                Effect::Sacrifice {
                    filter: TargetFilter::CreatureYouControl,
                    amount: 1,
                    target: EffectTarget::Controller,
                },
                Effect::damage(
                    2,
                    EffectTarget::ChosenOnResolution(TargetRequirement::one(TargetFilter::Any)),
                ),
            ),
        ))
}

pub fn engine() -> Engine {
    Engine::new(catalog())
}

/// A mid-game position built card by card.
///
/// Starts on turn 3 in the active player's first main phase. Every library
/// holds ten Forests so nobody decks out by accident.
pub struct Table {
    state: GameState,
}

impl Table {
    pub fn new(players: usize) -> Self {
        Self::with_config(GameConfig::new(players))
    }

    pub fn with_config(config: GameConfig) -> Self {
        let players = config.player_count;
        let mut table = Self {
            state: GameState::new(config).with_turn(3, P0, Step::Main1),
        };
        for seat in 0..players {
            for _ in 0..10 {
                table.add(PlayerId::new(seat as u8), "Forest", ZoneKind::Library);
            }
        }
        table
    }

    /// Move the game to `step` of the current turn with `active` to act.
    pub fn at(mut self, active: PlayerId, step: Step) -> Self {
        self.state = self.state.with_turn(3, active, step);
        self
    }

    pub fn add(&mut self, owner: PlayerId, name: &str, zone: ZoneKind) -> EntityId {
        let (state, id) = self.state.with_card(owner, name, zone);
        self.state = state;
        id
    }

    pub fn battlefield(&mut self, owner: PlayerId, name: &str) -> EntityId {
        self.add(owner, name, ZoneKind::Battlefield)
    }

    pub fn hand(&mut self, owner: PlayerId, name: &str) -> EntityId {
        self.add(owner, name, ZoneKind::Hand)
    }

    /// Remove every card from `player`'s library.
    pub fn empty_library(&mut self, player: PlayerId) {
        for card in self.state.library(player) {
            self.state = self.state.remove_from_zone(card);
        }
    }

    pub fn state(&self) -> GameState {
        self.state.clone()
    }
}

/// Process an action that must be legal.
pub fn apply(engine: &Engine, state: &GameState, action: Action) -> Transition {
    match engine.process(state, &action) {
        Ok(transition) => transition,
        Err(reason) => panic!("{:?} was rejected: {}", action, reason),
    }
}

/// The player holding priority passes.
pub fn pass(engine: &Engine, state: &GameState) -> GameState {
    let holder = state.priority().expect("somebody holds priority");
    apply(engine, state, Action::pass(holder)).state
}

/// Pass priority around until one full round has passed with the stack as it is.
pub fn pass_round(engine: &Engine, state: &GameState) -> GameState {
    let mut state = state.clone();
    for _ in 0..state.living_players().count() {
        state = pass(engine, &state);
    }
    state
}

/// Keep passing while `keep_going` holds.
pub fn pass_while(engine: &Engine, state: &GameState, keep_going: impl Fn(&GameState) -> bool) -> GameState {
    let mut state = state.clone();
    for _ in 0..500 {
        if !keep_going(&state) {
            return state;
        }
        state = pass(engine, &state);
    }
    panic!("still passing after 500 actions at {:?}", state.step());
}

pub fn player(id: PlayerId) -> EntityId {
    EntityId::player(id)
}
