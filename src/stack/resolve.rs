//! Resolving the top of the stack.

use tracing::{debug, trace};

use super::item::{StackItem, StackItemKind};
use crate::cards::CardDefinition;
use crate::core::{Components, EntityId, GameEvent};
use crate::decision::Completion;
use crate::effects::{resolver, still_legal, Effect, EffectContext, EffectWork, TargetRequirement};
use crate::engine::{Progress, Run};
use crate::error::contract_violation;
use crate::zones::{ZoneKey, ZonePosition};

/// Target requirements and effect of a stack item, from its definition.
fn script_of<'e>(
    def: Option<&'e CardDefinition>,
    item: &StackItem,
) -> (&'e [TargetRequirement], Option<&'e Effect>) {
    let Some(def) = def else {
        return (&[], None);
    };
    match item.kind {
        StackItemKind::Spell => match &def.spell {
            Some(script) => (&script.targets, Some(&script.effect)),
            None => (&[], None),
        },
        StackItemKind::ActivatedAbility { index, .. } => match def.activated.get(index) {
            Some(ability) => (&ability.targets, Some(&ability.effect)),
            None => (&[], None),
        },
        StackItemKind::TriggeredAbility { index, .. } => match def.triggered.get(index) {
            Some(ability) => (&ability.targets, Some(&ability.effect)),
            None => (&[], None),
        },
    }
}

fn stack_item_of(run: &Run<'_>, id: EntityId) -> StackItem {
    run.state()
        .entity(id)
        .and_then(Components::stack_item)
        .cloned()
        .unwrap_or_else(|| contract_violation(format!("{} is on the stack without a stack item", id)))
}

/// Resolve the top stack item. Targets are rechecked first; if every
/// chosen target has become illegal the item fizzles instead.
pub(crate) fn resolve_top(run: &mut Run<'_>) -> Progress {
    let Some(id) = run.state().stack_top() else {
        return Progress::Done;
    };
    let item = stack_item_of(run, id);
    let (requirements, effect) = script_of(run.definition_of(id), &item);

    let targets = if requirements.is_empty() {
        item.targets.clone()
    } else {
        let view = run.view();
        let legal = still_legal(run.state(), &view, item.controller, requirements, &item.targets);
        let chose_any = item.targets.iter().any(|slot| !slot.is_empty());
        if chose_any && legal.iter().all(Vec::is_empty) {
            fizzle(run, id, &item);
            return Progress::Done;
        }
        legal
    };

    if item.is_spell() {
        run.emit(GameEvent::SpellResolved { spell: id });
    } else {
        run.emit(GameEvent::AbilityResolved { ability: id });
    }
    debug!(item = %id, controller = %item.controller, "resolving");

    let Some(effect) = effect else {
        complete(run, Completion::StackItem(id));
        return Progress::Done;
    };
    let source = item.ability_source().or(Some(id));
    let ctx = EffectContext::new(item.controller, source)
        .with_item(id)
        .with_targets(targets)
        .with_x(item.x);
    resolver::execute(run, EffectWork::new(ctx, effect.clone()), Completion::StackItem(id))
}

fn fizzle(run: &mut Run<'_>, id: EntityId, item: &StackItem) {
    debug!(item = %id, "fizzled");
    if item.is_spell() {
        run.emit(GameEvent::SpellFizzled { spell: id });
        leave_stack(run, id, false);
    } else {
        run.emit(GameEvent::AbilityFizzled { ability: id });
        run.state_mut().forget_entity(id);
    }
    after_resolution(run);
}

/// Take a resolved spell off the stack: permanents enter the battlefield
/// under the spell's controller, everything else goes to its owner's graveyard.
fn leave_stack(run: &mut Run<'_>, id: EntityId, resolved: bool) {
    let definition = run.definition_of(id);
    let permanent = resolved && definition.map_or(false, CardDefinition::is_permanent);
    if permanent {
        let controller = stack_item_of(run, id).controller;
        run.put_onto_battlefield(id, controller);
    } else if let Some(owner) = run.state().owner_of(id) {
        run.move_entity(id, ZoneKey::graveyard(owner), ZonePosition::Top);
    }
}

/// Finish whatever an effect script was run for.
pub(crate) fn complete(run: &mut Run<'_>, completion: Completion) {
    let Completion::StackItem(id) = completion else {
        return;
    };
    if run.state().zone_of(id) == Some(ZoneKey::stack()) {
        if stack_item_of(run, id).is_spell() {
            leave_stack(run, id, true);
        } else {
            run.state_mut().forget_entity(id);
        }
    }
    trace!(item = %id, "resolution finished");
    after_resolution(run);
}

/// After a resolution the active player (or the next one still in the game)
/// receives priority and nobody has passed.
fn after_resolution(run: &mut Run<'_>) {
    let holder = run.state().first_priority();
    run.clear_passed();
    run.give_priority(Some(holder));
}
