//! Decision responses and their validation.
//!
//! A response is checked against the exact bounds stored in the pending
//! decision before anything resumes. An invalid response is a normal
//! rejection: the decision stays pending and the state is unchanged.

use serde::{Deserialize, Serialize};

use super::pending::{DamageSlot, DecisionKind};
use crate::cards::Color;
use crate::core::EntityId;
use crate::error::RuleViolation;

/// One response variant per decision kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionResponse {
    Targets(Vec<Vec<EntityId>>),
    Cards(Vec<EntityId>),
    YesNo(bool),
    Modes(Vec<usize>),
    Color(Color),
    Number(u32),
    Distribution(Vec<(EntityId, u32)>),
    Order(Vec<EntityId>),
    Piles {
        first: Vec<EntityId>,
        second: Vec<EntityId>,
    },
    Pile(usize),
    DamageAssignment(Vec<(EntityId, u32)>),
}

fn invalid(msg: impl Into<String>) -> RuleViolation {
    RuleViolation::InvalidResponse(msg.into())
}

fn check_distinct(ids: &[EntityId]) -> Result<(), RuleViolation> {
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(invalid(format!("{} chosen more than once", id)));
        }
    }
    Ok(())
}

fn check_subset(ids: &[EntityId], legal: &[EntityId]) -> Result<(), RuleViolation> {
    match ids.iter().find(|id| !legal.contains(id)) {
        Some(id) => Err(invalid(format!("{} is not a legal choice", id))),
        None => Ok(()),
    }
}

fn check_count(len: usize, min: usize, max: usize) -> Result<(), RuleViolation> {
    if len < min || len > max {
        return Err(invalid(format!("expected {}..={} choices, got {}", min, max, len)));
    }
    Ok(())
}

fn is_permutation(order: &[EntityId], objects: &[EntityId]) -> bool {
    let mut a = order.to_vec();
    let mut b = objects.to_vec();
    a.sort();
    b.sort();
    a == b
}

fn check_damage_assignment(
    assignment: &[(EntityId, u32)],
    amount: u32,
    blockers: &[DamageSlot],
    trample_to: Option<EntityId>,
) -> Result<(), RuleViolation> {
    let ids: Vec<EntityId> = assignment.iter().map(|&(id, _)| id).collect();
    check_distinct(&ids)?;
    for &id in &ids {
        if !blockers.iter().any(|b| b.blocker == id) && Some(id) != trample_to {
            return Err(invalid(format!("{} cannot be assigned this damage", id)));
        }
    }
    let total: u32 = assignment.iter().map(|&(_, n)| n).sum();
    if total != amount {
        return Err(invalid(format!("assigned {} damage, must assign {}", total, amount)));
    }

    let assigned_to = |id: EntityId| {
        assignment
            .iter()
            .find(|&&(t, _)| t == id)
            .map_or(0, |&(_, n)| n)
    };
    let mut all_lethal_so_far = true;
    for slot in blockers {
        let got = assigned_to(slot.blocker);
        if got > 0 && !all_lethal_so_far {
            return Err(invalid(format!(
                "{} cannot be assigned damage before earlier blockers have lethal damage",
                slot.blocker
            )));
        }
        all_lethal_so_far &= got >= slot.lethal;
    }
    if let Some(player) = trample_to {
        if assigned_to(player) > 0 && !all_lethal_so_far {
            return Err(invalid(
                "trample damage requires lethal damage on every blocker",
            ));
        }
    }
    Ok(())
}

impl DecisionResponse {
    /// Check this response against the decision it answers.
    pub fn validate(&self, kind: &DecisionKind) -> Result<(), RuleViolation> {
        match (kind, self) {
            (DecisionKind::ChooseTargets { slots }, DecisionResponse::Targets(chosen)) => {
                if chosen.len() != slots.len() {
                    return Err(invalid(format!(
                        "expected {} target slots, got {}",
                        slots.len(),
                        chosen.len()
                    )));
                }
                for (slot, targets) in slots.iter().zip(chosen) {
                    check_count(targets.len(), slot.min, slot.max)?;
                    check_distinct(targets)?;
                    check_subset(targets, &slot.legal)?;
                }
                Ok(())
            }
            (DecisionKind::ChooseCards { legal, min, max }, DecisionResponse::Cards(cards)) => {
                check_count(cards.len(), *min, *max)?;
                check_distinct(cards)?;
                check_subset(cards, legal)
            }
            (DecisionKind::YesNo, DecisionResponse::YesNo(_)) => Ok(()),
            (DecisionKind::ChooseMode { modes, count }, DecisionResponse::Modes(chosen)) => {
                if chosen.len() != *count {
                    return Err(invalid(format!("choose exactly {} modes", count)));
                }
                for (i, mode) in chosen.iter().enumerate() {
                    if *mode >= modes.len() {
                        return Err(invalid(format!("there is no mode {}", mode)));
                    }
                    if chosen[..i].contains(mode) {
                        return Err(invalid(format!("mode {} chosen twice", mode)));
                    }
                }
                Ok(())
            }
            (DecisionKind::ChooseColor { legal }, DecisionResponse::Color(color)) => {
                if legal.contains(color) {
                    Ok(())
                } else {
                    Err(invalid(format!("{:?} is not an option", color)))
                }
            }
            (DecisionKind::ChooseNumber { min, max }, DecisionResponse::Number(n)) => {
                if n < min || n > max {
                    Err(invalid(format!("{} is outside {}..={}", n, min, max)))
                } else {
                    Ok(())
                }
            }
            (
                DecisionKind::Distribute {
                    amount,
                    targets,
                    min_each,
                },
                DecisionResponse::Distribution(split),
            ) => {
                let ids: Vec<EntityId> = split.iter().map(|&(id, _)| id).collect();
                check_distinct(&ids)?;
                check_subset(&ids, targets)?;
                if ids.len() != targets.len() {
                    return Err(invalid("every target must receive a share"));
                }
                if split.iter().any(|&(_, n)| n < *min_each) {
                    return Err(invalid(format!("each target must receive at least {}", min_each)));
                }
                let total: u32 = split.iter().map(|&(_, n)| n).sum();
                if total != *amount {
                    return Err(invalid(format!("distributed {}, must distribute {}", total, amount)));
                }
                Ok(())
            }
            (DecisionKind::OrderObjects { objects }, DecisionResponse::Order(order)) => {
                if is_permutation(order, objects) {
                    Ok(())
                } else {
                    Err(invalid("order must list each object exactly once"))
                }
            }
            (DecisionKind::SplitPiles { objects }, DecisionResponse::Piles { first, second }) => {
                let all: Vec<EntityId> = first.iter().chain(second).copied().collect();
                if is_permutation(&all, objects) {
                    Ok(())
                } else {
                    Err(invalid("piles must partition the revealed cards"))
                }
            }
            (DecisionKind::ChoosePile { .. }, DecisionResponse::Pile(index)) => {
                if *index < 2 {
                    Ok(())
                } else {
                    Err(invalid("choose pile 0 or 1"))
                }
            }
            (
                DecisionKind::AssignCombatDamage {
                    amount,
                    blockers,
                    trample_to,
                    ..
                },
                DecisionResponse::DamageAssignment(assignment),
            ) => check_damage_assignment(assignment, *amount, blockers, *trample_to),
            (kind, _) => Err(invalid(format!("expected a {} response", kind.name()))),
        }
    }
}

impl DecisionKind {
    /// A few responses that are valid for this decision. Hosts driving
    /// automated play and tests use these; they are not a full enumeration.
    #[must_use]
    pub fn sample_responses(&self) -> Vec<DecisionResponse> {
        match self {
            DecisionKind::ChooseTargets { slots } => {
                let pick = slots
                    .iter()
                    .map(|s| {
                        let n = s.min.max(1).min(s.max).min(s.legal.len());
                        s.legal[..n].to_vec()
                    })
                    .collect();
                vec![DecisionResponse::Targets(pick)]
            }
            DecisionKind::ChooseCards { legal, min, max } => {
                let lower = (*min).min(legal.len());
                let mut out = vec![DecisionResponse::Cards(legal[..lower].to_vec())];
                let upper = (*max).min(legal.len());
                if upper > *min {
                    out.push(DecisionResponse::Cards(legal[..upper].to_vec()));
                }
                out
            }
            DecisionKind::YesNo => vec![DecisionResponse::YesNo(true), DecisionResponse::YesNo(false)],
            DecisionKind::ChooseMode { modes, count } => {
                if *count == 1 {
                    (0..modes.len()).map(|m| DecisionResponse::Modes(vec![m])).collect()
                } else {
                    vec![DecisionResponse::Modes((0..*count).collect())]
                }
            }
            DecisionKind::ChooseColor { legal } => {
                legal.iter().map(|&c| DecisionResponse::Color(c)).collect()
            }
            DecisionKind::ChooseNumber { min, max } => {
                let mut out = vec![DecisionResponse::Number(*min)];
                if max > min {
                    out.push(DecisionResponse::Number(*max));
                }
                out
            }
            DecisionKind::Distribute {
                amount,
                targets,
                min_each,
            } => {
                let base = min_each * targets.len() as u32;
                let split = targets
                    .iter()
                    .enumerate()
                    .map(|(i, &t)| {
                        let extra = if i == 0 { amount.saturating_sub(base) } else { 0 };
                        (t, min_each + extra)
                    })
                    .collect();
                vec![DecisionResponse::Distribution(split)]
            }
            DecisionKind::OrderObjects { objects } => {
                let mut out = vec![DecisionResponse::Order(objects.clone())];
                if objects.len() > 1 {
                    out.push(DecisionResponse::Order(objects.iter().rev().copied().collect()));
                }
                out
            }
            DecisionKind::SplitPiles { objects } => {
                let mut out = vec![DecisionResponse::Piles {
                    first: objects.clone(),
                    second: Vec::new(),
                }];
                if let Some((head, rest)) = objects.split_first() {
                    out.push(DecisionResponse::Piles {
                        first: vec![*head],
                        second: rest.to_vec(),
                    });
                }
                out
            }
            DecisionKind::ChoosePile { .. } => vec![DecisionResponse::Pile(0), DecisionResponse::Pile(1)],
            DecisionKind::AssignCombatDamage {
                amount,
                blockers,
                trample_to,
                ..
            } => {
                let mut remaining = *amount;
                let mut assignment: Vec<(EntityId, u32)> = Vec::new();
                for slot in blockers {
                    let n = slot.lethal.min(remaining);
                    remaining -= n;
                    assignment.push((slot.blocker, n));
                }
                if remaining > 0 {
                    if let Some(player) = trample_to {
                        assignment.push((*player, remaining));
                    } else if let Some(last) = assignment.last_mut() {
                        last.1 += remaining;
                    }
                }
                assignment.retain(|&(_, n)| n > 0);
                vec![DecisionResponse::DamageAssignment(assignment)]
            }
        }
    }
}
