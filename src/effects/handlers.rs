//! Built-in effect handlers.

use super::effect::{Effect, EffectKind, EffectTarget};
use super::registry::{EffectHandler, EffectRegistry, EffectStep};
use super::targeting::{legal_targets, TargetFilter};
use super::work::{EffectContext, Memo, WorkItem};
use crate::cards::Color;
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionResponse, TargetSlot};
use crate::engine::Run;
use crate::error::contract_violation;
use crate::zones::ZoneKey;

/// The ids an effect target names without asking anyone.
/// `ChosenOnResolution` names nothing here; handlers that support it ask.
#[must_use]
pub fn fixed_targets(state: &GameState, ctx: &EffectContext, target: &EffectTarget) -> Vec<EntityId> {
    match target {
        EffectTarget::Targeted(slot) => ctx.slot(*slot).to_vec(),
        EffectTarget::Controller => vec![EntityId::player(ctx.controller)],
        EffectTarget::Source => ctx.source.into_iter().collect(),
        EffectTarget::EachOpponent => state
            .living_players()
            .filter(|&p| p != ctx.controller)
            .map(EntityId::player)
            .collect(),
        EffectTarget::EachPlayer => state.living_players().map(EntityId::player).collect(),
        EffectTarget::ChosenOnResolution(_) => Vec::new(),
    }
}

fn players_among(state: &GameState, ids: &[EntityId]) -> Vec<PlayerId> {
    ids.iter()
        .filter_map(|id| id.as_player(state.player_count()))
        .collect()
}

fn unexpected(effect: &Effect, response: &DecisionResponse) -> ! {
    contract_violation(format!(
        "{:?} handler resumed with {:?}",
        effect.kind(),
        response
    ))
}

type Apply = fn(&mut Run<'_>, &EffectContext, &Effect, &[EntityId]) -> bool;

/// Handler for effects that do one thing to each of their targets.
/// A `ChosenOnResolution` target is asked for unless the choice is forced.
struct TargetedHandler {
    apply: Apply,
}

impl EffectHandler for TargetedHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Some(target) = effect.target() else {
            return EffectStep::done(false);
        };
        if let EffectTarget::ChosenOnResolution(requirement) = target {
            let view = run.view();
            let legal = legal_targets(run.state(), &view, ctx.controller, requirement, ctx.item);
            if legal.len() < requirement.min {
                return EffectStep::done(false);
            }
            if legal.is_empty() || (requirement.min == requirement.max && legal.len() == requirement.min) {
                return EffectStep::done((self.apply)(run, ctx, effect, &legal));
            }
            return EffectStep::ask(
                ctx.controller,
                "Choose a target",
                DecisionKind::ChooseTargets {
                    slots: vec![TargetSlot {
                        legal,
                        min: requirement.min,
                        max: requirement.max,
                    }],
                },
                Memo::default(),
            );
        }
        let ids = fixed_targets(run.state(), ctx, target);
        EffectStep::done((self.apply)(run, ctx, effect, &ids))
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let DecisionResponse::Targets(slots) = response else {
            unexpected(effect, response)
        };
        let ids = slots.first().cloned().unwrap_or_default();
        EffectStep::done((self.apply)(run, ctx, effect, &ids))
    }
}

fn apply_damage(run: &mut Run<'_>, ctx: &EffectContext, effect: &Effect, ids: &[EntityId]) -> bool {
    let Effect::DealDamage { amount, .. } = effect else {
        return false;
    };
    let amount = amount.resolve(ctx);
    let source = ctx.damage_source();
    let mut dealt = false;
    for &target in ids {
        dealt |= run.deal_damage(source, target, amount, false) > 0;
    }
    dealt
}

fn apply_life(run: &mut Run<'_>, ctx: &EffectContext, effect: &Effect, ids: &[EntityId]) -> bool {
    let (amount, sign) = match effect {
        Effect::GainLife { amount, .. } => (amount.resolve(ctx), 1),
        Effect::LoseLife { amount, .. } => (amount.resolve(ctx), -1),
        _ => return false,
    };
    let players = players_among(run.state(), ids);
    for &player in &players {
        run.change_life(player, sign * i64::from(amount));
    }
    amount > 0 && !players.is_empty()
}

fn apply_draw(run: &mut Run<'_>, ctx: &EffectContext, effect: &Effect, ids: &[EntityId]) -> bool {
    let Effect::DrawCards { amount, .. } = effect else {
        return false;
    };
    let amount = amount.resolve(ctx);
    let mut drew = false;
    for player in players_among(run.state(), ids) {
        drew |= !run.draw(player, amount).is_empty();
    }
    drew
}

fn apply_to_permanents(
    run: &mut Run<'_>,
    ids: &[EntityId],
    f: impl Fn(&mut Run<'_>, EntityId) -> bool,
) -> bool {
    let mut any = false;
    for &id in ids {
        if run.state().is_on_battlefield(id) {
            any |= f(run, id);
        }
    }
    any
}

fn apply_destroy(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    apply_to_permanents(run, ids, |run, id| run.destroy(id))
}

fn apply_exile(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    apply_to_permanents(run, ids, |run, id| run.exile(id))
}

fn apply_bounce(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    apply_to_permanents(run, ids, |run, id| run.return_to_hand(id))
}

fn apply_tap(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    apply_to_permanents(run, ids, |run, id| run.tap(id))
}

fn apply_untap(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    apply_to_permanents(run, ids, |run, id| run.untap(id))
}

fn apply_counters(run: &mut Run<'_>, ctx: &EffectContext, effect: &Effect, ids: &[EntityId]) -> bool {
    match effect {
        Effect::AddCounters { kind, amount, .. } => {
            let (kind, amount) = (*kind, amount.resolve(ctx));
            apply_to_permanents(run, ids, |run, id| run.add_counters(id, kind, amount))
        }
        Effect::RemoveCounters { kind, amount, .. } => {
            let (kind, amount) = (*kind, amount.resolve(ctx));
            apply_to_permanents(run, ids, |run, id| run.remove_counters(id, kind, amount))
        }
        _ => false,
    }
}

fn apply_pump(run: &mut Run<'_>, _ctx: &EffectContext, effect: &Effect, ids: &[EntityId]) -> bool {
    let Effect::ModifyPowerToughness { power, toughness, .. } = effect else {
        return false;
    };
    let (power, toughness) = (*power, *toughness);
    apply_to_permanents(run, ids, |run, id| run.modify_power_toughness(id, power, toughness))
}

fn apply_counterspell(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    let mut any = false;
    for &id in ids {
        any |= run.counter(id);
    }
    any
}

fn apply_shuffle(run: &mut Run<'_>, _ctx: &EffectContext, _effect: &Effect, ids: &[EntityId]) -> bool {
    let players = players_among(run.state(), ids);
    for &player in &players {
        run.shuffle_library(player);
    }
    !players.is_empty()
}

/// Discard and sacrifice: each affected player in turn chooses from their
/// own cards. A forced choice is made without asking.
struct PlayerChoiceHandler;

impl PlayerChoiceHandler {
    fn candidates(run: &Run<'_>, effect: &Effect, player: PlayerId) -> Vec<EntityId> {
        match effect {
            Effect::Discard { .. } => run.state().hand(player).iter().copied().collect(),
            Effect::Sacrifice { filter, .. } => sacrifice_candidates(run, player, filter),
            _ => Vec::new(),
        }
    }

    fn amount(effect: &Effect) -> usize {
        match effect {
            Effect::Discard { amount, .. } | Effect::Sacrifice { amount, .. } => *amount as usize,
            _ => 0,
        }
    }

    fn apply(run: &mut Run<'_>, effect: &Effect, player: PlayerId, chosen: &[EntityId]) {
        match effect {
            Effect::Discard { .. } => run.discard(player, chosen),
            _ => {
                for &id in chosen {
                    run.sacrifice(id);
                }
            }
        }
    }

    fn next(run: &mut Run<'_>, effect: &Effect, mut queue: Vec<EntityId>, mut did: bool) -> EffectStep {
        let amount = Self::amount(effect);
        while !queue.is_empty() {
            let who = queue.remove(0);
            let Some(player) = who.as_player(run.state().player_count()) else {
                continue;
            };
            let candidates = Self::candidates(run, effect, player);
            let n = amount.min(candidates.len());
            if n == 0 {
                continue;
            }
            if n == candidates.len() {
                Self::apply(run, effect, player, &candidates);
                did = true;
                continue;
            }
            let verb = if matches!(effect, Effect::Discard { .. }) {
                "Discard"
            } else {
                "Sacrifice"
            };
            let memo = Memo {
                stage: u32::from(did),
                entities: vec![queue],
                values: vec![i64::from(player.0)],
            };
            return EffectStep::ask(
                player,
                format!("{} {}", verb, n),
                DecisionKind::ChooseCards {
                    legal: candidates,
                    min: n,
                    max: n,
                },
                memo,
            );
        }
        EffectStep::done(did)
    }
}

/// Permanents `player` controls that match `filter` from their point of view.
#[must_use]
pub fn sacrifice_candidates(run: &Run<'_>, player: PlayerId, filter: &TargetFilter) -> Vec<EntityId> {
    let view = run.view();
    let state = run.state();
    state
        .permanents_of(player)
        .filter(|&e| filter.matches(state, &view, player, e))
        .collect()
}

impl EffectHandler for PlayerChoiceHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Some(target) = effect.target() else {
            return EffectStep::done(false);
        };
        let queue = fixed_targets(run.state(), ctx, target);
        Self::next(run, effect, queue, false)
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        _ctx: &mut EffectContext,
        effect: &Effect,
        memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let DecisionResponse::Cards(chosen) = response else {
            unexpected(effect, response)
        };
        let player = memo
            .values
            .first()
            .map(|&p| PlayerId::new(p as u8))
            .unwrap_or_else(|| contract_violation("player choice resumed without its player"));
        Self::apply(run, effect, player, chosen);
        Self::next(run, effect, memo.list(0).to_vec(), true)
    }
}

/// Composite and IfYouDo: control flow only.
struct SequenceHandler;

impl EffectHandler for SequenceHandler {
    fn execute(&self, _run: &mut Run<'_>, _ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        match effect {
            Effect::Composite(children) => {
                EffectStep::Expand(children.iter().cloned().map(WorkItem::Run).collect())
            }
            Effect::IfYouDo { first, then } => EffectStep::Expand(vec![
                WorkItem::Run(first.as_ref().clone()),
                WorkItem::IfDid(then.as_ref().clone()),
            ]),
            _ => EffectStep::done(false),
        }
    }
}

struct MayHandler;

impl EffectHandler for MayHandler {
    fn execute(&self, _run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::May { prompt, .. } = effect else {
            return EffectStep::done(false);
        };
        EffectStep::ask(ctx.controller, prompt.clone(), DecisionKind::YesNo, Memo::default())
    }

    fn resume(
        &self,
        _run: &mut Run<'_>,
        _ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        match (effect, response) {
            (Effect::May { effect: inner, .. }, DecisionResponse::YesNo(true)) => {
                EffectStep::Expand(vec![WorkItem::Run(inner.as_ref().clone())])
            }
            (Effect::May { .. }, DecisionResponse::YesNo(false)) => EffectStep::done(false),
            _ => unexpected(effect, response),
        }
    }
}

struct ModeHandler;

impl EffectHandler for ModeHandler {
    fn execute(&self, _run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::ChooseMode { modes, count } = effect else {
            return EffectStep::done(false);
        };
        if modes.is_empty() || *count == 0 {
            return EffectStep::done(false);
        }
        if *count >= modes.len() {
            return EffectStep::Expand(modes.iter().map(|m| WorkItem::Run(m.effect.clone())).collect());
        }
        EffectStep::ask(
            ctx.controller,
            format!("Choose {}", count),
            DecisionKind::ChooseMode {
                modes: modes.iter().map(|m| m.text.clone()).collect(),
                count: *count,
            },
            Memo::default(),
        )
    }

    fn resume(
        &self,
        _run: &mut Run<'_>,
        _ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let (Effect::ChooseMode { modes, .. }, DecisionResponse::Modes(chosen)) = (effect, response) else {
            unexpected(effect, response)
        };
        let mut chosen = chosen.clone();
        chosen.sort_unstable();
        EffectStep::Expand(
            chosen
                .into_iter()
                .filter_map(|i| modes.get(i))
                .map(|m| WorkItem::Run(m.effect.clone()))
                .collect(),
        )
    }
}

struct NumberHandler;

impl EffectHandler for NumberHandler {
    fn execute(&self, _run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::ChooseNumber { min, max, then } = effect else {
            return EffectStep::done(false);
        };
        if min >= max {
            ctx.chosen_number = Some(*min);
            return EffectStep::Expand(vec![WorkItem::Run(then.as_ref().clone())]);
        }
        EffectStep::ask(
            ctx.controller,
            "Choose a number",
            DecisionKind::ChooseNumber { min: *min, max: *max },
            Memo::default(),
        )
    }

    fn resume(
        &self,
        _run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let (Effect::ChooseNumber { then, .. }, DecisionResponse::Number(n)) = (effect, response) else {
            unexpected(effect, response)
        };
        ctx.chosen_number = Some(*n);
        EffectStep::Expand(vec![WorkItem::Run(then.as_ref().clone())])
    }
}

struct ManaHandler;

impl EffectHandler for ManaHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::AddMana { mana, amount } = effect else {
            return EffectStep::done(false);
        };
        match mana {
            Some(mana) => {
                run.add_mana(ctx.controller, *mana, *amount);
                EffectStep::done(*amount > 0)
            }
            None => EffectStep::ask(
                ctx.controller,
                "Choose a color",
                DecisionKind::ChooseColor {
                    legal: Color::ALL.to_vec(),
                },
                Memo::default(),
            ),
        }
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let (Effect::AddMana { amount, .. }, DecisionResponse::Color(color)) = (effect, response) else {
            unexpected(effect, response)
        };
        run.add_mana(ctx.controller, crate::cards::Mana::Colored(*color), *amount);
        EffectStep::done(*amount > 0)
    }
}

struct DistributeHandler;

impl EffectHandler for DistributeHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::DistributeDamage { amount, target } = effect else {
            return EffectStep::done(false);
        };
        let targets = fixed_targets(run.state(), ctx, target);
        match targets.len() {
            0 => EffectStep::done(false),
            1 => {
                let dealt = run.deal_damage(ctx.damage_source(), targets[0], *amount, false);
                EffectStep::done(dealt > 0)
            }
            _ => {
                let min_each = u32::from(*amount as usize >= targets.len());
                EffectStep::ask(
                    ctx.controller,
                    format!("Divide {} damage", amount),
                    DecisionKind::Distribute {
                        amount: *amount,
                        targets,
                        min_each,
                    },
                    Memo::default(),
                )
            }
        }
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let DecisionResponse::Distribution(split) = response else {
            unexpected(effect, response)
        };
        let source = ctx.damage_source();
        let mut dealt = false;
        for &(target, amount) in split {
            dealt |= run.deal_damage(source, target, amount, false) > 0;
        }
        EffectStep::done(dealt)
    }
}

/// Look at the top N cards and put them back in any order. The response
/// lists them in placement order: the last listed ends on top.
struct ArrangeTopHandler;

impl EffectHandler for ArrangeTopHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::ArrangeTop { count } = effect else {
            return EffectStep::done(false);
        };
        let top = run
            .state()
            .zones()
            .top_n(ZoneKey::library(ctx.controller), *count as usize);
        if top.len() < 2 {
            return EffectStep::done(!top.is_empty());
        }
        EffectStep::ask(
            ctx.controller,
            "Put these cards back in any order",
            DecisionKind::OrderObjects { objects: top },
            Memo::default(),
        )
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        _memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        let DecisionResponse::Order(order) = response else {
            unexpected(effect, response)
        };
        let key = ZoneKey::library(ctx.controller);
        let mut library: Vec<EntityId> = run.state().zone(key).iter().copied().collect();
        library.truncate(library.len().saturating_sub(order.len()));
        library.extend(order.iter().copied());
        run.state_mut().zones_mut().reorder(key, library.into_iter().collect());
        EffectStep::done(true)
    }
}

/// Reveal the top N; the next opponent splits them into two piles; the
/// controller puts one pile into their hand and the other into their graveyard.
struct RevealAndSplitHandler;

const SPLIT: u32 = 1;
const PICK: u32 = 2;

impl EffectHandler for RevealAndSplitHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::RevealAndSplit { count } = effect else {
            return EffectStep::done(false);
        };
        let state = run.state();
        let revealed = state.zones().top_n(ZoneKey::library(ctx.controller), *count as usize);
        if revealed.is_empty() {
            return EffectStep::done(false);
        }
        let splitter = state.next_player(ctx.controller);
        EffectStep::ask(
            splitter,
            "Separate these cards into two piles",
            DecisionKind::SplitPiles { objects: revealed },
            Memo::stage(SPLIT),
        )
    }

    fn resume(
        &self,
        run: &mut Run<'_>,
        ctx: &mut EffectContext,
        effect: &Effect,
        memo: &Memo,
        response: &DecisionResponse,
    ) -> EffectStep {
        match (memo.stage, response) {
            (SPLIT, DecisionResponse::Piles { first, second }) => EffectStep::ask(
                ctx.controller,
                "Choose a pile to put into your hand",
                DecisionKind::ChoosePile {
                    piles: [first.clone(), second.clone()],
                },
                Memo::stage(PICK).with_entities(first.clone()).with_entities(second.clone()),
            ),
            (PICK, DecisionResponse::Pile(index)) => {
                let kept = memo.list(*index).to_vec();
                let binned = memo.list(1 - *index).to_vec();
                for id in kept {
                    run.move_entity(id, ZoneKey::hand(ctx.controller), crate::zones::ZonePosition::Top);
                }
                for id in binned {
                    run.move_entity(id, ZoneKey::graveyard(ctx.controller), crate::zones::ZonePosition::Top);
                }
                EffectStep::done(true)
            }
            _ => unexpected(effect, response),
        }
    }
}

struct TokenHandler;

impl EffectHandler for TokenHandler {
    fn execute(&self, run: &mut Run<'_>, ctx: &mut EffectContext, effect: &Effect) -> EffectStep {
        let Effect::CreateToken { name, count } = effect else {
            return EffectStep::done(false);
        };
        let count = count.resolve(ctx);
        for _ in 0..count {
            run.create_token(ctx.controller, name);
        }
        EffectStep::done(count > 0)
    }
}

pub(super) fn register_builtins(registry: &mut EffectRegistry) {
    let targeted: [(EffectKind, Apply); 14] = [
        (EffectKind::DealDamage, apply_damage),
        (EffectKind::GainLife, apply_life),
        (EffectKind::LoseLife, apply_life),
        (EffectKind::DrawCards, apply_draw),
        (EffectKind::Destroy, apply_destroy),
        (EffectKind::Exile, apply_exile),
        (EffectKind::ReturnToHand, apply_bounce),
        (EffectKind::Tap, apply_tap),
        (EffectKind::Untap, apply_untap),
        (EffectKind::AddCounters, apply_counters),
        (EffectKind::RemoveCounters, apply_counters),
        (EffectKind::ModifyPowerToughness, apply_pump),
        (EffectKind::CounterSpell, apply_counterspell),
        (EffectKind::Shuffle, apply_shuffle),
    ];
    for (kind, apply) in targeted {
        registry.register(kind, Box::new(TargetedHandler { apply }));
    }

    registry.register(EffectKind::Discard, Box::new(PlayerChoiceHandler));
    registry.register(EffectKind::Sacrifice, Box::new(PlayerChoiceHandler));
    registry.register(EffectKind::Composite, Box::new(SequenceHandler));
    registry.register(EffectKind::IfYouDo, Box::new(SequenceHandler));
    registry.register(EffectKind::May, Box::new(MayHandler));
    registry.register(EffectKind::ChooseMode, Box::new(ModeHandler));
    registry.register(EffectKind::ChooseNumber, Box::new(NumberHandler));
    registry.register(EffectKind::AddMana, Box::new(ManaHandler));
    registry.register(EffectKind::DistributeDamage, Box::new(DistributeHandler));
    registry.register(EffectKind::ArrangeTop, Box::new(ArrangeTopHandler));
    registry.register(EffectKind::RevealAndSplit, Box::new(RevealAndSplitHandler));
    registry.register(EffectKind::CreateToken, Box::new(TokenHandler));
}
