//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card: cost, types,
//! printed power/toughness, keywords and its scripts. Scripts are plain data
//! ([`Effect`] trees plus target requirements); the engine executes them
//! through the effect registry.
//!
//! Instance data (tapped, damage, counters, zone) lives in the entity's
//! components, never here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::mana::{Mana, ManaCost};
use crate::effects::{Effect, TargetFilter, TargetRequirement};
use crate::triggers::TriggerCondition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Instant,
    Sorcery,
    Artifact,
    Enchantment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Haste,
    FirstStrike,
    DoubleStrike,
    Trample,
    Vigilance,
    Flash,
    Defender,
    Deathtouch,
}

/// What an instant or sorcery does, and what it targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellScript {
    pub targets: Vec<TargetRequirement>,
    pub effect: Effect,
}

/// "Sacrifice N <filter>" as part of a cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SacrificeCost {
    pub filter: TargetFilter,
    pub count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub mana: ManaCost,
    pub tap: bool,
    pub sacrifice: Option<SacrificeCost>,
}

impl AbilityCost {
    #[must_use]
    pub fn tap() -> Self {
        Self {
            tap: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mana(cost: ManaCost) -> Self {
        Self {
            mana: cost,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sacrifice(mut self, filter: TargetFilter, count: u32) -> Self {
        self.sacrifice = Some(SacrificeCost { filter, count });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub text: String,
    pub cost: AbilityCost,
    pub targets: Vec<TargetRequirement>,
    pub effect: Effect,
}

impl ActivatedAbility {
    #[must_use]
    pub fn new(text: impl Into<String>, cost: AbilityCost, effect: Effect) -> Self {
        Self {
            text: text.into(),
            cost,
            targets: Vec::new(),
            effect,
        }
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targets.push(requirement);
        self
    }

    /// Mana abilities resolve immediately instead of using the stack.
    #[must_use]
    pub fn is_mana_ability(&self) -> bool {
        self.targets.is_empty() && matches!(self.effect, Effect::AddMana { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub text: String,
    pub condition: TriggerCondition,
    pub targets: Vec<TargetRequirement>,
    pub effect: Effect,
}

impl TriggeredAbility {
    #[must_use]
    pub fn new(text: impl Into<String>, condition: TriggerCondition, effect: Effect) -> Self {
        Self {
            text: text.into(),
            condition,
            targets: Vec::new(),
            effect,
        }
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targets.push(requirement);
        self
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardType, Keyword};
///
/// let drake = CardDefinition::creature("Wind Drake", "2U".parse().unwrap(), 2, 2)
///     .with_keyword(Keyword::Flying);
///
/// assert!(drake.is_creature());
/// assert!(drake.has_keyword(Keyword::Flying));
/// assert!(!drake.is_instant_speed());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: String,
    pub cost: ManaCost,
    pub types: SmallVec<[CardType; 2]>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: SmallVec<[Keyword; 4]>,
    /// Rules text, for display.
    pub text: String,
    pub spell: Option<SpellScript>,
    pub activated: Vec<ActivatedAbility>,
    pub triggered: Vec<TriggeredAbility>,
    /// Mana made by tapping this permanent.
    pub produces: Option<Mana>,
    pub token: bool,
}

impl CardDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: ManaCost::free(),
            types: SmallVec::new(),
            power: None,
            toughness: None,
            keywords: SmallVec::new(),
            text: String::new(),
            spell: None,
            activated: Vec::new(),
            triggered: Vec::new(),
            produces: None,
            token: false,
        }
    }

    /// A land tapping for one mana.
    #[must_use]
    pub fn land(name: impl Into<String>, produces: Mana) -> Self {
        let mut def = Self::new(name).with_type(CardType::Land);
        def.produces = Some(produces);
        def
    }

    #[must_use]
    pub fn creature(name: impl Into<String>, cost: ManaCost, power: i32, toughness: i32) -> Self {
        Self::new(name)
            .with_cost(cost)
            .with_type(CardType::Creature)
            .with_pt(power, toughness)
    }

    #[must_use]
    pub fn instant(name: impl Into<String>, cost: ManaCost, effect: Effect) -> Self {
        Self::new(name)
            .with_cost(cost)
            .with_type(CardType::Instant)
            .with_spell(Vec::new(), effect)
    }

    #[must_use]
    pub fn sorcery(name: impl Into<String>, cost: ManaCost, effect: Effect) -> Self {
        Self::new(name)
            .with_cost(cost)
            .with_type(CardType::Sorcery)
            .with_spell(Vec::new(), effect)
    }

    #[must_use]
    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.types.contains(&card_type) {
            self.types.push(card_type);
        }
        self
    }

    #[must_use]
    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_spell(mut self, targets: Vec<TargetRequirement>, effect: Effect) -> Self {
        self.spell = Some(SpellScript { targets, effect });
        self
    }

    /// Add a target slot to the spell script.
    #[must_use]
    pub fn with_spell_target(mut self, requirement: TargetRequirement) -> Self {
        if let Some(script) = self.spell.as_mut() {
            script.targets.push(requirement);
        }
        self
    }

    #[must_use]
    pub fn with_activated(mut self, ability: ActivatedAbility) -> Self {
        self.activated.push(ability);
        self
    }

    #[must_use]
    pub fn with_triggered(mut self, ability: TriggeredAbility) -> Self {
        self.triggered.push(ability);
        self
    }

    #[must_use]
    pub fn as_token(mut self) -> Self {
        self.token = true;
        self
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    /// Does this card stay on the battlefield when it resolves?
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.has_type(CardType::Instant) && !self.has_type(CardType::Sorcery)
    }

    /// Can this card be cast whenever its controller has priority?
    #[must_use]
    pub fn is_instant_speed(&self) -> bool {
        self.has_type(CardType::Instant) || self.has_keyword(Keyword::Flash)
    }

    #[must_use]
    pub fn spell_targets(&self) -> &[TargetRequirement] {
        match &self.spell {
            Some(script) => &script.targets,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Color;
    use crate::effects::{Amount, EffectTarget};

    #[test]
    fn test_land() {
        let forest = CardDefinition::land("Forest", Mana::Colored(Color::Green));
        assert!(forest.is_land());
        assert!(forest.is_permanent());
        assert_eq!(forest.produces, Some(Mana::Colored(Color::Green)));
    }

    #[test]
    fn test_instant_with_target() {
        let bolt = CardDefinition::instant(
            "Lightning Bolt",
            "R".parse().unwrap(),
            Effect::DealDamage {
                amount: Amount::Fixed(3),
                target: EffectTarget::Targeted(0),
            },
        )
        .with_spell_target(TargetRequirement::one(TargetFilter::Any));

        assert!(bolt.is_instant_speed());
        assert!(!bolt.is_permanent());
        assert_eq!(bolt.spell_targets().len(), 1);
    }

    #[test]
    fn test_mana_ability_detection() {
        let tap_for_mana = ActivatedAbility::new(
            "T: Add G.",
            AbilityCost::tap(),
            Effect::AddMana {
                mana: Some(Mana::Colored(Color::Green)),
                amount: 1,
            },
        );
        assert!(tap_for_mana.is_mana_ability());

        let pinger = ActivatedAbility::new(
            "T: 1 damage to any target.",
            AbilityCost::tap(),
            Effect::DealDamage {
                amount: Amount::Fixed(1),
                target: EffectTarget::Targeted(0),
            },
        )
        .with_target(TargetRequirement::one(TargetFilter::Any));
        assert!(!pinger.is_mana_ability());
    }

    #[test]
    fn test_definition_serialization() {
        let bears = CardDefinition::creature("Grizzly Bears", "1G".parse().unwrap(), 2, 2);
        let json = serde_json::to_string(&bears).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(bears, back);
    }
}
