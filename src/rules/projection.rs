//! Effective characteristics of permanents.
//!
//! Continuous-effect layering is a collaborator: the engine only asks a
//! [`Projector`] for an [`EffectiveView`] of the battlefield and reads power,
//! toughness, types, keywords and control from it. `BaseProjector` applies
//! what the bundled card model knows about: printed values, +1/+1 and -1/-1
//! counters and until-end-of-turn modifiers.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cards::{CardCatalog, CardType, Keyword};
use crate::core::{CounterKind, EntityId, GameState, PlayerId};

/// What a permanent currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Characteristics {
    pub types: SmallVec<[CardType; 2]>,
    pub keywords: SmallVec<[Keyword; 4]>,
    pub power: i32,
    pub toughness: i32,
    pub controller: PlayerId,
}

/// Effective characteristics of every permanent on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct EffectiveView {
    permanents: FxHashMap<EntityId, Characteristics>,
}

impl EffectiveView {
    pub fn insert(&mut self, id: EntityId, characteristics: Characteristics) {
        self.permanents.insert(id, characteristics);
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Characteristics> {
        self.permanents.get(&id)
    }

    #[must_use]
    pub fn has_type(&self, id: EntityId, card_type: CardType) -> bool {
        self.get(id).map_or(false, |c| c.types.contains(&card_type))
    }

    #[must_use]
    pub fn is_creature(&self, id: EntityId) -> bool {
        self.has_type(id, CardType::Creature)
    }

    #[must_use]
    pub fn has_keyword(&self, id: EntityId, keyword: Keyword) -> bool {
        self.get(id).map_or(false, |c| c.keywords.contains(&keyword))
    }

    #[must_use]
    pub fn power(&self, id: EntityId) -> i32 {
        self.get(id).map_or(0, |c| c.power)
    }

    #[must_use]
    pub fn toughness(&self, id: EntityId) -> i32 {
        self.get(id).map_or(0, |c| c.toughness)
    }

    #[must_use]
    pub fn controller(&self, id: EntityId) -> Option<PlayerId> {
        self.get(id).map(|c| c.controller)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Characteristics)> {
        self.permanents.iter().map(|(id, c)| (*id, c))
    }
}

/// Computes the effective view of a state.
pub trait Projector: Send + Sync {
    fn project(&self, state: &GameState, catalog: &dyn CardCatalog) -> EffectiveView;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BaseProjector;

impl Projector for BaseProjector {
    fn project(&self, state: &GameState, catalog: &dyn CardCatalog) -> EffectiveView {
        let mut view = EffectiveView::default();
        for id in state.battlefield() {
            let Some(components) = state.entity(id) else {
                continue;
            };
            let Some(def) = components.card_name().and_then(|n| catalog.definition_for(n)) else {
                continue;
            };
            let Some(controller) = components.controller() else {
                continue;
            };

            let counters =
                components.counters(CounterKind::PlusOne) as i32 - components.counters(CounterKind::MinusOne) as i32;
            let (dp, dt) = components.pt_modifier();

            view.insert(
                id,
                Characteristics {
                    types: def.types.clone(),
                    keywords: def.keywords.clone(),
                    power: def.power.unwrap_or(0) + counters + dp,
                    toughness: def.toughness.unwrap_or(0) + counters + dt,
                    controller,
                },
            );
        }
        view
    }
}
