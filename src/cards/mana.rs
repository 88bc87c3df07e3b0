//! Mana: colors, costs, pools and the payment solver seam.
//!
//! ## Paying a cost
//!
//! Payment happens in two steps. A [`ManaSolver`] picks which untapped sources
//! to tap; tapping them adds their mana to the player's pool; the cost is then
//! deducted from the pool with [`ManaPool::pay`]. Leftover mana stays in the
//! pool until the step ends.
//!
//! `BasicManaSolver` handles sources that each produce one mana of a single
//! type, which is all the bundled card model describes. A host with a richer
//! card pool plugs in its own solver.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::registry::CardCatalog;
use super::definition::Keyword;
use crate::core::{EntityId, GameState, PlayerId};

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Color> {
        Color::ALL.into_iter().find(|c| c.symbol() == symbol)
    }
}

/// One unit of mana.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mana {
    Colored(Color),
    Colorless,
}

impl Mana {
    const fn slot(self) -> usize {
        match self {
            Mana::Colored(c) => c.index(),
            Mana::Colorless => COLORLESS,
        }
    }
}

const COLORLESS: usize = 5;

/// A mana cost: generic part, colored symbols and X symbols.
///
/// ```
/// use ccg_rules::cards::{Color, ManaCost};
///
/// let fireball: ManaCost = "XR".parse().unwrap();
/// assert_eq!(fireball.x, 1);
/// assert_eq!(fireball.colored_of(Color::Red), 1);
/// assert_eq!(fireball.total(4), 5);
///
/// let giant: ManaCost = "3R".parse().unwrap();
/// assert_eq!(giant.to_string(), "3R");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    pub colored: [u32; 5],
    /// Number of X symbols.
    pub x: u32,
}

impl ManaCost {
    #[must_use]
    pub const fn free() -> Self {
        Self {
            generic: 0,
            colored: [0; 5],
            x: 0,
        }
    }

    #[must_use]
    pub const fn generic(amount: u32) -> Self {
        Self {
            generic: amount,
            colored: [0; 5],
            x: 0,
        }
    }

    #[must_use]
    pub fn with_colored(mut self, color: Color, amount: u32) -> Self {
        self.colored[color.index()] += amount;
        self
    }

    #[must_use]
    pub fn with_x(mut self) -> Self {
        self.x += 1;
        self
    }

    #[must_use]
    pub const fn colored_of(&self, color: Color) -> u32 {
        self.colored[color.index()]
    }

    #[must_use]
    pub const fn has_x(&self) -> bool {
        self.x > 0
    }

    /// Total mana needed for a given value of X.
    #[must_use]
    pub fn total(&self, x_value: u32) -> u32 {
        self.generic + self.colored.iter().sum::<u32>() + self.x * x_value
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.total(0) == 0 && self.x == 0
    }
}

impl FromStr for ManaCost {
    type Err = String;

    /// Parses compact notation: digits for generic, `X`, and `WUBRG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cost = ManaCost::free();
        let mut digits = String::new();
        for ch in s.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            match ch {
                'X' => cost.x += 1,
                _ => match Color::from_symbol(ch) {
                    Some(color) => cost.colored[color.index()] += 1,
                    None => return Err(format!("unknown mana symbol '{}' in '{}'", ch, s)),
                },
            }
        }
        if !digits.is_empty() {
            cost.generic = digits
                .parse()
                .map_err(|e| format!("bad generic amount in '{}': {}", s, e))?;
        }
        Ok(cost)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.x {
            write!(f, "X")?;
        }
        if self.generic > 0 || (self.colored.iter().all(|&c| c == 0) && self.x == 0) {
            write!(f, "{}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored_of(color) {
                write!(f, "{}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// Floating mana of one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    amounts: [u32; 6],
}

impl ManaPool {
    pub fn add(&mut self, mana: Mana, amount: u32) {
        self.amounts[mana.slot()] += amount;
    }

    #[must_use]
    pub fn amount(&self, mana: Mana) -> u32 {
        self.amounts[mana.slot()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.amounts = [0; 6];
    }

    /// Deduct a cost, returning what is left, or `None` if the pool cannot cover it.
    /// Generic mana is taken from colorless first, then colors in WUBRG order.
    #[must_use]
    pub fn pay(&self, cost: &ManaCost, x_value: u32) -> Option<ManaPool> {
        let mut left = *self;
        for color in Color::ALL {
            let need = cost.colored_of(color);
            let slot = &mut left.amounts[color.index()];
            if *slot < need {
                return None;
            }
            *slot -= need;
        }
        let mut generic = cost.generic + cost.x * x_value;
        for slot in [COLORLESS, 0, 1, 2, 3, 4] {
            let take = left.amounts[slot].min(generic);
            left.amounts[slot] -= take;
            generic -= take;
        }
        (generic == 0).then_some(left)
    }
}

/// How a caster wants a cost paid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStrategy {
    /// Let the solver choose sources.
    #[default]
    Auto,
    /// Tap exactly these sources; together with the pool they must cover the cost.
    Sources(Vec<EntityId>),
    /// Pay only from mana already in the pool.
    FromPool,
}

/// Sources a solver picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManaPayment {
    pub sources: Vec<EntityId>,
}

/// The payment solver seam.
pub trait ManaSolver: Send + Sync {
    /// Pick sources to tap so that, with the pool, `cost` is covered.
    fn solve(
        &self,
        state: &GameState,
        catalog: &dyn CardCatalog,
        player: PlayerId,
        cost: &ManaCost,
        x_value: u32,
    ) -> Option<ManaPayment>;

    fn can_pay(
        &self,
        state: &GameState,
        catalog: &dyn CardCatalog,
        player: PlayerId,
        cost: &ManaCost,
        x_value: u32,
    ) -> bool {
        self.solve(state, catalog, player, cost, x_value).is_some()
    }

    /// Largest X the player can currently afford.
    fn max_x(
        &self,
        state: &GameState,
        catalog: &dyn CardCatalog,
        player: PlayerId,
        cost: &ManaCost,
    ) -> u32 {
        if !cost.has_x() {
            return 0;
        }
        let mut x = 0;
        while x < MAX_X && self.can_pay(state, catalog, player, cost, x + 1) {
            x += 1;
        }
        x
    }
}

/// Largest X the engine searches for when sizing an X cost.
pub(crate) const MAX_X: u32 = 99;

/// Untapped permanents a player controls that can tap for mana, with what they make.
#[must_use]
pub fn mana_sources(
    state: &GameState,
    catalog: &dyn CardCatalog,
    player: PlayerId,
) -> Vec<(EntityId, Mana)> {
    state
        .permanents_of(player)
        .filter_map(|id| {
            let components = state.entity(id)?;
            if components.is_tapped() {
                return None;
            }
            let def = catalog.definition_for(components.card_name()?)?;
            let mana = def.produces?;
            if def.is_creature()
                && components.is_summoning_sick()
                && !def.has_keyword(Keyword::Haste)
            {
                return None;
            }
            Some((id, mana))
        })
        .collect()
}

/// Greedy solver for single-mana sources: pool first, then sources of the
/// needed color for colored symbols, then colorless sources for generic.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicManaSolver;

impl ManaSolver for BasicManaSolver {
    fn solve(
        &self,
        state: &GameState,
        catalog: &dyn CardCatalog,
        player: PlayerId,
        cost: &ManaCost,
        x_value: u32,
    ) -> Option<ManaPayment> {
        let mut pool = state.player(player).mana_pool;
        let mut unused = mana_sources(state, catalog, player);
        let mut chosen = Vec::new();

        for color in Color::ALL {
            let mana = Mana::Colored(color);
            let from_pool = pool.amount(mana).min(cost.colored_of(color));
            pool.amounts[mana.slot()] -= from_pool;
            for _ in from_pool..cost.colored_of(color) {
                let pos = unused.iter().position(|&(_, m)| m == mana)?;
                chosen.push(unused.remove(pos).0);
            }
        }

        let generic = (cost.generic + cost.x * x_value).saturating_sub(pool.total()) as usize;
        if unused.len() < generic {
            return None;
        }
        unused.sort_by_key(|&(_, m)| m != Mana::Colorless);
        chosen.extend(unused.into_iter().take(generic).map(|(id, _)| id));

        Some(ManaPayment { sources: chosen })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(entries: &[(Mana, u32)]) -> ManaPool {
        let mut pool = ManaPool::default();
        for &(mana, amount) in entries {
            pool.add(mana, amount);
        }
        pool
    }

    #[test]
    fn test_parse_costs() {
        let cost: ManaCost = "2RR".parse().unwrap();
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.colored_of(Color::Red), 2);
        assert_eq!(cost.total(0), 4);

        let free: ManaCost = "0".parse().unwrap();
        assert!(free.is_free());
        assert!("2Q".parse::<ManaCost>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!("XR".parse::<ManaCost>().unwrap().to_string(), "XR");
        assert_eq!(ManaCost::free().to_string(), "0");
        assert_eq!(ManaCost::generic(1).with_colored(Color::Green, 1).to_string(), "1G");
    }

    #[test]
    fn test_pool_pay_colored_and_generic() {
        let p = pool(&[(Mana::Colored(Color::Red), 2), (Mana::Colorless, 1)]);
        let cost: ManaCost = "1R".parse().unwrap();

        let left = p.pay(&cost, 0).unwrap();
        assert_eq!(left.amount(Mana::Colorless), 0);
        assert_eq!(left.amount(Mana::Colored(Color::Red)), 1);
    }

    #[test]
    fn test_pool_pay_missing_color() {
        let p = pool(&[(Mana::Colored(Color::Green), 3)]);
        assert!(p.pay(&"R".parse().unwrap(), 0).is_none());
    }

    #[test]
    fn test_pool_pay_x() {
        let p = pool(&[(Mana::Colored(Color::Red), 4)]);
        let fireball: ManaCost = "XR".parse().unwrap();
        assert!(p.pay(&fireball, 3).is_some());
        assert!(p.pay(&fireball, 4).is_none());
    }
}
