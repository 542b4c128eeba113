//! Combat resolution rules.
//!
//! The engine turns "actor uses skill on target" into a validated,
//! resource-checked, randomized sequence of state changes. Activation is
//! two-phase: `use_skill` checks cooldown, target, and mana and commits the
//! resources; `execute_skill` then runs the pipeline to completion,
//! including team fan-out and any chained reaction attacks (counters,
//! reflection).
//!
//! Every step appends a narration line to the world's log and records the
//! `Effect` it applied, so a resolution leaves both a human-readable and a
//! structured trace.

use crate::skills::{
    AttackSpec, ChanceKind, DamageFormula, PostEffect, SkillKind, SpecialAction, TargetKind,
    TargetRef,
};
use crate::world::{Archetype, Character, CharacterId, DamageType, StatusEffect, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Flat per-turn poison damage.
const POISON_TICK: i32 = 5;
/// Flat per-turn bleed damage.
const BLEED_TICK: i32 = 3;
/// Burn deals a random amount in this range each turn.
const BURN_TICK_MIN: i32 = 1;
const BURN_TICK_MAX: i32 = 15;
/// Chance for a burn to gutter out before its timer runs down.
const BURN_EARLY_EXPIRY_CHANCE: i32 = 25;
/// Regeneration heals this percent of max health per turn.
const REGEN_PERCENT: i32 = 5;
/// Chance for a duelist to riposte a damaging hit.
const RIPOSTE_CHANCE: i32 = 15;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a `use_skill` attempt.
///
/// Cooldown and targeting failures leave the turn unspent so the actor may
/// retry; a failed resource attempt costs the turn anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseOutcome {
    /// The actor's turn is spent, whether or not the skill fired.
    pub turn_consumed: bool,
    /// Resources are committed; the caller must now call `execute_skill`.
    pub ready: bool,
}

impl UseOutcome {
    /// Rejected without consequence: the actor may pick again.
    const RETRY: UseOutcome = UseOutcome {
        turn_consumed: false,
        ready: false,
    };
    /// The attempt failed but still cost the turn.
    const SPENT: UseOutcome = UseOutcome {
        turn_consumed: true,
        ready: false,
    };
    /// Committed; execution must follow.
    const COMMITTED: UseOutcome = UseOutcome {
        turn_consumed: true,
        ready: true,
    };
}

/// How one attack resolved against one defender. Built fresh for every
/// execution; team attacks produce one outcome per member struck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Settled damage after every mitigation step.
    pub damage: i32,
    pub dodged: bool,
    pub resisted: bool,
    pub blocked: bool,
}

// ============================================================================
// Effects
// ============================================================================

/// A state change (or observable marker) produced by resolution. Applying
/// one to the world is a single `apply_effect` dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Damage applied to a character's health.
    DamageTaken {
        target: CharacterId,
        amount: i32,
        fatal: bool,
    },
    /// Health restored.
    Healed { target: CharacterId, amount: i32 },
    /// A fallen character came back with this much health.
    Revived { target: CharacterId, health: i32 },
    /// A status effect was applied, extending any active instance.
    EffectApplied {
        target: CharacterId,
        effect: StatusEffect,
        turns: u32,
    },
    /// A status effect dealt its per-turn damage.
    EffectTicked {
        target: CharacterId,
        effect: StatusEffect,
        amount: i32,
    },
    /// A status effect ran out (or burned out early).
    EffectExpired {
        target: CharacterId,
        effect: StatusEffect,
    },
    /// Mana seared away by an attack rider.
    ManaBurned { target: CharacterId, amount: i32 },
    /// Mana restored by a special ability.
    ManaRestored { target: CharacterId, amount: i32 },
    /// A defensive chance was permanently raised.
    ChanceRaised {
        target: CharacterId,
        chance: ChanceKind,
        amount: i32,
    },
    /// A ward went up.
    WardRaised { target: CharacterId },
    /// A ward absorbed a hit and faded.
    WardSpent { target: CharacterId },
    /// A mirror shield went up.
    MirrorRaised { target: CharacterId },
    /// A mirror shield threw an attack back and faded.
    MirrorSpent { target: CharacterId },

    // Informational markers; applying them changes nothing.
    AttackDodged { target: CharacterId },
    SpellResisted { target: CharacterId },
    AttackBlocked { target: CharacterId },
    AttackReflected {
        attacker: CharacterId,
        target: CharacterId,
    },
    CounterLaunched {
        attacker: CharacterId,
        target: CharacterId,
    },
}

/// Apply a single effect to the world.
pub fn apply_effect(world: &mut World, effect: &Effect) {
    match effect {
        Effect::DamageTaken { target, amount, .. } => {
            if let Some(character) = world.character_mut(*target) {
                character.health.subtract(*amount);
            }
        }
        Effect::Healed { target, amount } => {
            if let Some(character) = world.character_mut(*target) {
                character.heal(*amount);
            }
        }
        Effect::Revived { target, health } => {
            if let Some(character) = world.character_mut(*target) {
                character.health.add(*health);
            }
        }
        Effect::EffectApplied {
            target,
            effect,
            turns,
        } => {
            if let Some(character) = world.character_mut(*target) {
                character.add_effect(*effect, *turns);
            }
        }
        Effect::EffectTicked { target, amount, .. } => {
            if let Some(character) = world.character_mut(*target) {
                character.health.subtract(*amount);
            }
        }
        Effect::EffectExpired { target, effect } => {
            if let Some(character) = world.character_mut(*target) {
                character.effects.retain(|a| a.effect != *effect);
            }
        }
        Effect::ManaBurned { target, amount } => {
            if let Some(pool) = world.character_mut(*target).and_then(|c| c.mana.as_mut()) {
                pool.subtract(*amount);
            }
        }
        Effect::ManaRestored { target, amount } => {
            if let Some(pool) = world.character_mut(*target).and_then(|c| c.mana.as_mut()) {
                pool.add(*amount);
            }
        }
        Effect::ChanceRaised {
            target,
            chance,
            amount,
        } => {
            if let Some(character) = world.character_mut(*target) {
                let stat = match chance {
                    ChanceKind::Dodge => &mut character.dodge_chance,
                    ChanceKind::Parry => &mut character.parry_chance,
                    ChanceKind::SpellResistance => &mut character.spell_resistance,
                };
                stat.add(*amount);
            }
        }
        Effect::WardRaised { target } => {
            if let Some(character) = world.character_mut(*target) {
                character.ward_active = true;
            }
        }
        Effect::WardSpent { target } => {
            if let Some(character) = world.character_mut(*target) {
                character.ward_active = false;
            }
        }
        Effect::MirrorRaised { target } => {
            if let Some(character) = world.character_mut(*target) {
                character.mirror_ready = true;
            }
        }
        Effect::MirrorSpent { target } => {
            if let Some(character) = world.character_mut(*target) {
                character.mirror_ready = false;
            }
        }
        Effect::AttackDodged { .. }
        | Effect::SpellResisted { .. }
        | Effect::AttackBlocked { .. }
        | Effect::AttackReflected { .. }
        | Effect::CounterLaunched { .. } => {}
    }
}

/// Ordered trace of one skill execution. Every recorded effect has already
/// been applied: chained reactions must observe settled state, so there is
/// no deferred-application phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub effects: Vec<Effect>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect to the world and append it to the trace.
    pub fn record(&mut self, world: &mut World, effect: Effect) {
        apply_effect(world, &effect);
        self.effects.push(effect);
    }
}

// ============================================================================
// Defense Pipeline
// ============================================================================

/// Percentage roll: true with probability `chance`/100.
fn roll<R: Rng>(rng: &mut R, chance: i32) -> bool {
    chance > 0 && rng.gen_range(0..100) < chance
}

/// The canonical mitigation pipeline. Order is fixed: dodge, spell
/// resistance, parry, base damage, block halving, armor. Archetype policy
/// hooks (mirror, ward, counters) wrap around this function in the
/// executor; they never reorder it.
pub(crate) fn resolve_defense<R: Rng>(
    rng: &mut R,
    attack_stat: i32,
    spec: &AttackSpec,
    defender: &Character,
) -> AttackOutcome {
    let mut outcome = AttackOutcome::default();

    // Dodge: physical attacks only. Zeroes the hit outright.
    if spec.damage_type == DamageType::Physical && roll(rng, defender.dodge_chance.current()) {
        outcome.dodged = true;
        return outcome;
    }

    // Spell resistance: magical attacks only. Also zeroes the hit.
    if spec.damage_type == DamageType::Magical && roll(rng, defender.spell_resistance.current()) {
        outcome.resisted = true;
        return outcome;
    }

    // Parry: physical attacks only. The hit lands at half strength.
    if spec.damage_type == DamageType::Physical && roll(rng, defender.parry_chance.current()) {
        outcome.blocked = true;
    }

    let mut damage = spec.formula.damage(attack_stat, defender) as f32;
    if outcome.blocked {
        damage *= 0.5;
    }
    damage *= 1.0 - defender.armor.mitigation(spec.damage_type);

    outcome.damage = (damage.round() as i32).max(0);
    outcome
}

/// A one-shot reaction attack: free, instant, and never part of the
/// defender's skill list.
struct CounterAttack {
    name: &'static str,
    spec: AttackSpec,
}

/// Defender-side reaction policy, keyed by archetype. Consulted only after
/// a damaging hit, and only for primary attacks; reaction attacks
/// themselves can never provoke it.
fn counter_reaction(
    world: &World,
    defender: CharacterId,
    outcome: &AttackOutcome,
) -> Option<CounterAttack> {
    let defender_ref = world.character(defender)?;
    if !defender_ref.can_act() || outcome.damage <= 0 {
        return None;
    }
    match defender_ref.archetype {
        // A cornered knight strikes back while below half health.
        Archetype::Knight if defender_ref.health.ratio() < 0.5 => Some(CounterAttack {
            name: "Counterblow",
            spec: AttackSpec {
                damage_type: DamageType::Physical,
                formula: DamageFormula::StatPlus { bonus: 0 },
                post_effects: vec![],
            },
        }),
        // Duelists riposte on instinct.
        Archetype::Duelist if roll(&mut rand::thread_rng(), RIPOSTE_CHANCE) => {
            Some(CounterAttack {
                name: "Riposte",
                spec: AttackSpec {
                    damage_type: DamageType::Physical,
                    formula: DamageFormula::StatPlus { bonus: -4 },
                    post_effects: vec![],
                },
            })
        }
        _ => None,
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The combat rules engine. Stateless: all match state lives in the
/// `World` it is handed.
#[derive(Debug, Clone, Copy)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Engine
    }

    /// Attempt to activate a skill: cooldown gate, target binding and
    /// validation, then the mana commitment. On success the reload counter
    /// is set and the caller must follow with [`Engine::execute_skill`];
    /// from that point the execution is not cancellable.
    pub fn use_skill(
        &self,
        world: &mut World,
        actor: CharacterId,
        skill_index: usize,
        target: Option<TargetRef>,
    ) -> UseOutcome {
        let Some(actor_ref) = world.character(actor) else {
            world.narrate("Nobody answers that call.");
            return UseOutcome::RETRY;
        };
        let actor_name = actor_ref.name.clone();
        let Some(skill) = actor_ref.skills.get(skill_index) else {
            world.narrate(format!("{actor_name} fumbles for a skill they do not know."));
            return UseOutcome::RETRY;
        };
        let skill_name = skill.name.clone();
        let target_kind = skill.target_kind;
        let mana_cost = skill.mana_cost;
        let reload_left = skill.reload.current();
        let previously_bound = skill.bound_target;
        let has_pool = actor_ref.mana.is_some();
        let can_afford = actor_ref.can_afford(mana_cost);

        if reload_left > 0 {
            world.narrate(format!(
                "{skill_name} is still reloading ({reload_left} turns left)."
            ));
            return UseOutcome::RETRY;
        }

        // Bind the target: explicit argument, previously stored target, or
        // the owner itself for self-only skills.
        let bound = target.or(previously_bound).or_else(|| {
            matches!(target_kind, TargetKind::SelfOnly).then_some(TargetRef::Character(actor))
        });
        let Some(bound) = bound else {
            world.narrate(format!("{actor_name} has no target for {skill_name}."));
            return UseOutcome::RETRY;
        };
        if let Err(err) = target_kind.validate(world, actor, &bound) {
            world.narrate(format!(
                "{actor_name} cannot aim {skill_name} there: {err}."
            ));
            return UseOutcome::RETRY;
        }

        // A failed resource attempt still costs the turn.
        if mana_cost > 0 && !can_afford {
            if has_pool {
                world.narrate(format!("{actor_name} lacks the mana for {skill_name}."));
            } else {
                world.narrate(format!(
                    "{actor_name} has no mana to channel {skill_name}."
                ));
            }
            return UseOutcome::SPENT;
        }

        let Some(actor_mut) = world.character_mut(actor) else {
            return UseOutcome::RETRY;
        };
        actor_mut.spend_mana(mana_cost);
        if let Some(skill) = actor_mut.skills.get_mut(skill_index) {
            skill.bound_target = Some(bound);
            skill.start_cooldown();
        }
        UseOutcome::COMMITTED
    }

    /// Run a committed skill to completion: single-target or team fan-out
    /// for attacks, recipient iteration for specials, then clear the
    /// binding. Returns the applied effect trace.
    pub fn execute_skill(
        &self,
        world: &mut World,
        actor: CharacterId,
        skill_index: usize,
    ) -> Resolution {
        let mut resolution = Resolution::new();

        let Some(actor_ref) = world.character(actor) else {
            return resolution;
        };
        let actor_name = actor_ref.name.clone();
        let Some(skill) = actor_ref.skills.get(skill_index) else {
            return resolution;
        };
        let skill_name = skill.name.clone();
        let target_kind = skill.target_kind;
        let kind = skill.kind.clone();
        let Some(target) = skill.bound_target else {
            world.narrate(format!("{skill_name} fizzles: no target was bound."));
            return resolution;
        };

        // A mis-bound kind/ref pair is a configuration mistake, not a game
        // event: report it and stand down.
        let shape_ok = match target {
            TargetRef::Character(_) => !target_kind.is_team_kind(),
            TargetRef::Team(_) => target_kind.is_team_kind(),
        };
        if !shape_ok {
            world.narrate(format!(
                "{skill_name} fizzles: its target does not match {target_kind}."
            ));
            self.clear_binding(world, actor, skill_index);
            return resolution;
        }

        match (kind, target) {
            (SkillKind::Attack(spec), TargetRef::Character(defender)) => {
                self.execute_attack(
                    world,
                    &mut resolution,
                    actor,
                    &skill_name,
                    &spec,
                    defender,
                    true,
                );
            }
            (SkillKind::Attack(spec), TargetRef::Team(team)) => {
                // Fan out over a snapshot of the living members; every
                // member rolls its own defense. The dead receive nothing.
                let members: Vec<CharacterId> = world
                    .team(team)
                    .map(|t| t.living().map(|c| c.id).collect())
                    .unwrap_or_default();
                if members.is_empty() {
                    world.narrate(format!(
                        "{actor_name}'s {skill_name} sweeps a field with no one left standing."
                    ));
                }
                for member in members {
                    self.execute_attack(
                        world,
                        &mut resolution,
                        actor,
                        &skill_name,
                        &spec,
                        member,
                        true,
                    );
                }
            }
            (SkillKind::Special(action), target) => {
                self.execute_special(world, &mut resolution, actor, &skill_name, &action, target);
            }
        }

        self.clear_binding(world, actor, skill_index);
        resolution
    }

    fn clear_binding(&self, world: &mut World, actor: CharacterId, skill_index: usize) {
        if let Some(actor_mut) = world.character_mut(actor) {
            if let Some(skill) = actor_mut.skills.get_mut(skill_index) {
                skill.bound_target = None;
            }
        }
    }

    /// Resolve one attack against one defender, then run riders and
    /// reactions. `allow_reactions` is false for reaction attacks
    /// themselves, which keeps every chain a single hop.
    #[allow(clippy::too_many_arguments)]
    fn execute_attack(
        &self,
        world: &mut World,
        resolution: &mut Resolution,
        attacker: CharacterId,
        skill_name: &str,
        spec: &AttackSpec,
        defender: CharacterId,
        allow_reactions: bool,
    ) {
        let Some(defender_ref) = world.character(defender) else {
            return;
        };
        let defender_name = defender_ref.name.clone();
        if !defender_ref.is_alive() {
            world.narrate(format!("{defender_name} is already down."));
            return;
        }
        let mirror_ready = defender_ref.mirror_ready;
        let ward_active = defender_ref.ward_active;
        let defender_health = defender_ref.health.current();
        let health_floor = defender_ref.health.min();
        let Some(attacker_ref) = world.character(attacker) else {
            return;
        };
        let attacker_name = attacker_ref.name.clone();
        let attack_stat = attacker_ref.attack_stat(spec.damage_type);

        world.narrate(format!("{attacker_name} uses {skill_name} on {defender_name}!"));

        // Pre-roll policy: a raised mirror throws the whole attack back.
        // The mirrored attack runs with reactions disabled, so it can never
        // bounce a second time in the same chain.
        if allow_reactions && mirror_ready {
            resolution.record(world, Effect::MirrorSpent { target: defender });
            resolution.record(
                world,
                Effect::AttackReflected {
                    attacker,
                    target: defender,
                },
            );
            world.narrate(format!(
                "{defender_name}'s mirror shield hurls the blow back at {attacker_name}!"
            ));
            self.execute_attack(world, resolution, defender, skill_name, spec, attacker, false);
            return;
        }

        let mut outcome = {
            let Some(defender_ref) = world.character(defender) else {
                return;
            };
            resolve_defense(&mut rand::thread_rng(), attack_stat, spec, defender_ref)
        };

        if outcome.dodged {
            resolution.record(world, Effect::AttackDodged { target: defender });
            world.narrate(format!("{defender_name} dodges the blow!"));
            return;
        }
        if outcome.resisted {
            resolution.record(world, Effect::SpellResisted { target: defender });
            world.narrate(format!("{defender_name} shrugs the spell off!"));
            return;
        }
        if outcome.blocked {
            resolution.record(world, Effect::AttackBlocked { target: defender });
            world.narrate(format!(
                "{defender_name} parries and takes only part of the hit."
            ));
        }

        // Post-damage policy: an active ward soaks half of a damaging hit.
        if ward_active && outcome.damage > 0 {
            outcome.damage /= 2;
            resolution.record(world, Effect::WardSpent { target: defender });
            world.narrate(format!("{defender_name}'s ward soaks half the impact."));
        }

        let fatal = outcome.damage > 0 && outcome.damage >= defender_health - health_floor;
        resolution.record(
            world,
            Effect::DamageTaken {
                target: defender,
                amount: outcome.damage,
                fatal,
            },
        );
        world.narrate(format!("{defender_name} takes {} damage.", outcome.damage));
        if fatal {
            world.narrate(format!("{defender_name} falls!"));
        }

        // Riders fire only when the hit connected and left the defender
        // standing; a landed hit that armor ground down to zero still
        // carries them.
        if !fatal {
            for rider in &spec.post_effects {
                match rider {
                    PostEffect::Inflict { effect, turns } => {
                        let total = world
                            .character(defender)
                            .and_then(|c| {
                                c.effects
                                    .iter()
                                    .find(|a| a.effect == *effect)
                                    .map(|a| a.remaining_turns)
                            })
                            .unwrap_or(0)
                            + turns;
                        resolution.record(
                            world,
                            Effect::EffectApplied {
                                target: defender,
                                effect: *effect,
                                turns: *turns,
                            },
                        );
                        world.narrate(format!(
                            "{defender_name} is afflicted with {effect} for {total} turns."
                        ));
                    }
                    PostEffect::ManaBurn(amount) => {
                        let burned = world
                            .character(defender)
                            .and_then(|c| c.mana.as_ref())
                            .map_or(0, |pool| pool.current().min(*amount));
                        if burned > 0 {
                            resolution.record(
                                world,
                                Effect::ManaBurned {
                                    target: defender,
                                    amount: burned,
                                },
                            );
                            world.narrate(format!(
                                "{burned} mana is seared out of {defender_name}."
                            ));
                        }
                    }
                }
            }
        }

        // Reactions run after the primary hit fully resolves, with
        // reactions disabled for the nested attack (strict single hop).
        if allow_reactions {
            if let Some(counter) = counter_reaction(world, defender, &outcome) {
                resolution.record(
                    world,
                    Effect::CounterLaunched {
                        attacker: defender,
                        target: attacker,
                    },
                );
                world.narrate(format!("{defender_name} answers with {}!", counter.name));
                self.execute_attack(
                    world,
                    resolution,
                    defender,
                    counter.name,
                    &counter.spec,
                    attacker,
                    false,
                );
            }
        }
    }

    /// Resolve a non-damage special against its recipient(s).
    fn execute_special(
        &self,
        world: &mut World,
        resolution: &mut Resolution,
        actor: CharacterId,
        skill_name: &str,
        action: &SpecialAction,
        target: TargetRef,
    ) {
        let actor_name = world
            .character(actor)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        // One character, or every living member of a team target.
        let recipients: Vec<CharacterId> = match target {
            TargetRef::Character(id) => vec![id],
            TargetRef::Team(id) => world
                .team(id)
                .map(|t| t.living().map(|c| c.id).collect())
                .unwrap_or_default(),
        };

        for recipient in recipients {
            let Some(target_ref) = world.character(recipient) else {
                continue;
            };
            let target_name = target_ref.name.clone();

            if !target_ref.is_alive() && !matches!(action, SpecialAction::Revive { .. }) {
                world.narrate(format!("{target_name} is beyond help."));
                continue;
            }

            match action {
                SpecialAction::Heal { amount } => {
                    let healed = (target_ref.health.max() - target_ref.health.current())
                        .min(*amount)
                        .max(0);
                    resolution.record(
                        world,
                        Effect::Healed {
                            target: recipient,
                            amount: healed,
                        },
                    );
                    world.narrate(format!(
                        "{actor_name}'s {skill_name} mends {target_name} for {healed} health."
                    ));
                }
                SpecialAction::Revive { health_percent } => {
                    if target_ref.is_alive() {
                        world.narrate(format!(
                            "{target_name} is still standing; {skill_name} is wasted."
                        ));
                        continue;
                    }
                    let restored =
                        (target_ref.health.max() * (*health_percent as i32) / 100).max(1);
                    resolution.record(
                        world,
                        Effect::Revived {
                            target: recipient,
                            health: restored,
                        },
                    );
                    world.narrate(format!(
                        "{target_name} returns to the fight with {restored} health!"
                    ));
                }
                SpecialAction::Grant { effect, turns } => {
                    let total = target_ref
                        .effects
                        .iter()
                        .find(|a| a.effect == *effect)
                        .map_or(0, |a| a.remaining_turns)
                        + turns;
                    resolution.record(
                        world,
                        Effect::EffectApplied {
                            target: recipient,
                            effect: *effect,
                            turns: *turns,
                        },
                    );
                    world.narrate(format!("{target_name} gains {effect} for {total} turns."));
                }
                SpecialAction::RaiseChance { chance, amount } => {
                    let stat = match chance {
                        ChanceKind::Dodge => &target_ref.dodge_chance,
                        ChanceKind::Parry => &target_ref.parry_chance,
                        ChanceKind::SpellResistance => &target_ref.spell_resistance,
                    };
                    let applied = (stat.max() - stat.current()).min(*amount).max(0);
                    resolution.record(
                        world,
                        Effect::ChanceRaised {
                            target: recipient,
                            chance: *chance,
                            amount: applied,
                        },
                    );
                    world.narrate(format!(
                        "{target_name}'s {} chance rises by {applied}%.",
                        chance.name()
                    ));
                }
                SpecialAction::RestoreMana { amount } => {
                    let Some(pool) = target_ref.mana.as_ref() else {
                        world.narrate(format!("{target_name} has no mana pool to fill."));
                        continue;
                    };
                    let restored = (pool.max() - pool.current()).min(*amount).max(0);
                    resolution.record(
                        world,
                        Effect::ManaRestored {
                            target: recipient,
                            amount: restored,
                        },
                    );
                    world.narrate(format!("{target_name} regains {restored} mana."));
                }
                SpecialAction::Ward => {
                    resolution.record(world, Effect::WardRaised { target: recipient });
                    world.narrate(format!("{target_name} raises a shimmering ward."));
                }
                SpecialAction::MirrorShield => {
                    resolution.record(world, Effect::MirrorRaised { target: recipient });
                    world.narrate(format!("{target_name} conjures a mirror shield."));
                }
            }
        }
    }

    /// End-of-turn bookkeeping for one character: cooldowns tick down and
    /// status effects deal their impact, then expire. The external driver
    /// calls this once per completed turn.
    pub fn end_turn(&self, world: &mut World, actor: CharacterId) -> Resolution {
        let mut resolution = Resolution::new();

        let Some(actor_mut) = world.character_mut(actor) else {
            return resolution;
        };
        for skill in &mut actor_mut.skills {
            skill.tick_cooldown();
        }
        if !actor_mut.is_alive() {
            return resolution;
        }
        let actor_name = actor_mut.name.clone();
        let max_health = actor_mut.health.max();
        let active: Vec<StatusEffect> = actor_mut.effects.iter().map(|a| a.effect).collect();

        for effect in active {
            // A previous tick may already have finished them off.
            if !world.character(actor).is_some_and(|c| c.is_alive()) {
                break;
            }

            match effect {
                StatusEffect::Poison => {
                    self.tick_damage(world, &mut resolution, actor, &actor_name, effect, POISON_TICK);
                }
                StatusEffect::Bleed => {
                    self.tick_damage(world, &mut resolution, actor, &actor_name, effect, BLEED_TICK);
                }
                StatusEffect::Burn => {
                    let amount = rand::thread_rng().gen_range(BURN_TICK_MIN..=BURN_TICK_MAX);
                    self.tick_damage(world, &mut resolution, actor, &actor_name, effect, amount);
                }
                StatusEffect::Regeneration => {
                    let amount = (max_health * REGEN_PERCENT / 100).max(1);
                    let healed = world
                        .character(actor)
                        .map_or(0, |c| (c.health.max() - c.health.current()).min(amount));
                    resolution.record(
                        world,
                        Effect::Healed {
                            target: actor,
                            amount: healed,
                        },
                    );
                    world.narrate(format!("{actor_name} regenerates {healed} health."));
                }
                // Lockout only; no tick impact.
                StatusEffect::Stun => {}
            }

            // Decrement and expire. Burn can also gutter out early.
            let expired = match world.character_mut(actor) {
                Some(character) => match character.effects.iter_mut().find(|a| a.effect == effect)
                {
                    Some(active) => {
                        active.remaining_turns = active.remaining_turns.saturating_sub(1);
                        active.remaining_turns == 0
                    }
                    None => false,
                },
                None => break,
            };
            let early = effect == StatusEffect::Burn
                && !expired
                && roll(&mut rand::thread_rng(), BURN_EARLY_EXPIRY_CHANCE);
            if expired || early {
                resolution.record(
                    world,
                    Effect::EffectExpired {
                        target: actor,
                        effect,
                    },
                );
                if early {
                    world.narrate(format!("The flames on {actor_name} gutter out."));
                } else {
                    world.narrate(format!("{actor_name}'s {effect} wears off."));
                }
            }
        }

        resolution
    }

    fn tick_damage(
        &self,
        world: &mut World,
        resolution: &mut Resolution,
        actor: CharacterId,
        actor_name: &str,
        effect: StatusEffect,
        amount: i32,
    ) {
        let fatal = world
            .character(actor)
            .is_some_and(|c| amount >= c.health.current() - c.health.min());
        resolution.record(
            world,
            Effect::EffectTicked {
                target: actor,
                effect,
                amount,
            },
        );
        world.narrate(format!(
            "{actor_name} suffers {amount} {} damage.",
            effect.name().to_lowercase()
        ));
        if fatal {
            world.narrate(format!("{actor_name} succumbs!"));
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
