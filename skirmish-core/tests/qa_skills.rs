//! QA tests for skill activation: cooldowns, mana, targeting, and the
//! special-ability repertoire, driven through the public API.

use skirmish_core::testing::{cast, duel_between, dummy};
use skirmish_core::{
    get_skill, recruit, Archetype, Engine, StatusEffect, TargetRef, Team, World,
};

fn becalm(world: &mut World) {
    for team in &mut world.teams {
        for member in &mut team.members {
            member.dodge_chance.set(0);
            member.parry_chance.set(0);
            member.spell_resistance.set(0);
        }
    }
}

// =============================================================================
// Activation Rules
// =============================================================================

#[test]
fn test_cooldown_gate_and_recovery() {
    let engine = Engine::new();
    let knight = recruit(Archetype::Knight, "Bors").unwrap();
    let (mut world, a, b) = duel_between(knight, dummy("Rook"));
    becalm(&mut world);

    // Shield Bash reloads for two turns.
    let first = engine.use_skill(&mut world, a, 1, Some(TargetRef::Character(b)));
    assert!(first.ready);
    engine.execute_skill(&mut world, a, 1);

    let blocked = engine.use_skill(&mut world, a, 1, Some(TargetRef::Character(b)));
    assert!(!blocked.turn_consumed && !blocked.ready);
    assert!(world.log.iter().any(|l| l.contains("still reloading")));

    engine.end_turn(&mut world, a);
    let still_blocked = engine.use_skill(&mut world, a, 1, Some(TargetRef::Character(b)));
    assert!(!still_blocked.ready);

    engine.end_turn(&mut world, a);
    let recovered = engine.use_skill(&mut world, a, 1, Some(TargetRef::Character(b)));
    assert!(recovered.ready);
}

#[test]
fn test_rejected_use_leaves_the_actor_free_to_retry() {
    let engine = Engine::new();
    let knight = recruit(Archetype::Knight, "Bors").unwrap();
    let (mut world, a, b) = duel_between(knight, dummy("Rook"));
    becalm(&mut world);

    // Aiming Slash at the owner is a target mismatch: turn not consumed.
    let bounced = engine.use_skill(&mut world, a, 0, Some(TargetRef::Character(a)));
    assert!(!bounced.turn_consumed);

    // The actor retries at the real enemy in the same turn.
    let retried = engine.use_skill(&mut world, a, 0, Some(TargetRef::Character(b)));
    assert!(retried.ready);
    engine.execute_skill(&mut world, a, 0);
    assert_eq!(world.character(b).unwrap().health.current(), 82);
}

#[test]
fn test_self_only_skills_bind_implicitly() {
    let engine = Engine::new();
    let knight = recruit(Archetype::Knight, "Bors").unwrap();
    let (mut world, a, _b) = duel_between(knight, dummy("Rook"));
    world.character_mut(a).unwrap().health.set(90);

    // Second Breath with no explicit target heals the owner.
    let outcome = engine.use_skill(&mut world, a, 2, None);
    assert!(outcome.ready);
    engine.execute_skill(&mut world, a, 2);
    assert_eq!(world.character(a).unwrap().health.current(), 110);
}

#[test]
fn test_insufficient_mana_spends_the_turn_only() {
    let engine = Engine::new();
    let sorcerer = recruit(Archetype::Sorcerer, "Vex").unwrap();
    let (mut world, a, b) = duel_between(sorcerer, dummy("Rook"));
    becalm(&mut world);
    world
        .character_mut(a)
        .unwrap()
        .mana
        .as_mut()
        .unwrap()
        .set(5);

    // Fireball costs 10.
    let outcome = engine.use_skill(&mut world, a, 0, Some(TargetRef::Character(b)));
    assert!(outcome.turn_consumed && !outcome.ready);
    assert_eq!(
        world.character(a).unwrap().mana.as_ref().unwrap().current(),
        5
    );
    assert!(world.character(b).unwrap().health.is_full());
}

#[test]
fn test_execution_clears_the_binding() {
    let engine = Engine::new();
    let knight = recruit(Archetype::Knight, "Bors").unwrap();
    let (mut world, a, b) = duel_between(knight, dummy("Rook"));
    becalm(&mut world);

    cast(&engine, &mut world, a, 0, Some(TargetRef::Character(b)));
    assert!(world.character(a).unwrap().skills[0].bound_target.is_none());
}

// =============================================================================
// Special Abilities
// =============================================================================

#[test]
fn test_mending_heals_a_teammate_but_never_the_caster() {
    let engine = Engine::new();
    let mut dawn = Team::new("Dawn");
    let cleric = dawn.add(recruit(Archetype::Cleric, "Liora").unwrap());
    let knight = dawn.add(recruit(Archetype::Knight, "Bors").unwrap());
    let mut dusk = Team::new("Dusk");
    dusk.add(dummy("Rook"));
    let mut world = World::new(vec![dawn, dusk]);
    world.character_mut(knight).unwrap().health.set(100);

    // Mending refuses the caster itself.
    let selfish = engine.use_skill(&mut world, cleric, 1, Some(TargetRef::Character(cleric)));
    assert!(!selfish.turn_consumed && !selfish.ready);

    let outcome = engine.use_skill(&mut world, cleric, 1, Some(TargetRef::Character(knight)));
    assert!(outcome.ready);
    engine.execute_skill(&mut world, cleric, 1);
    assert_eq!(world.character(knight).unwrap().health.current(), 120);
    assert!(world.log.iter().any(|l| l.contains("mends Bors for 20")));
}

#[test]
fn test_soothing_chant_grants_regeneration() {
    let engine = Engine::new();
    let mut dawn = Team::new("Dawn");
    let cleric = dawn.add(recruit(Archetype::Cleric, "Liora").unwrap());
    let knight = dawn.add(recruit(Archetype::Knight, "Bors").unwrap());
    let mut dusk = Team::new("Dusk");
    dusk.add(dummy("Rook"));
    let mut world = World::new(vec![dawn, dusk]);
    world.character_mut(knight).unwrap().health.set(60);

    cast(
        &engine,
        &mut world,
        cleric,
        2,
        Some(TargetRef::Character(knight)),
    );
    assert!(world
        .character(knight)
        .unwrap()
        .has_effect(StatusEffect::Regeneration));

    // 5% of 120 max health per tick.
    engine.end_turn(&mut world, knight);
    assert_eq!(world.character(knight).unwrap().health.current(), 66);
}

#[test]
fn test_rallying_cry_raises_the_whole_team() {
    let engine = Engine::new();
    let mut dawn = Team::new("Dawn");
    let knight = dawn.add(recruit(Archetype::Knight, "Bors").unwrap());
    let duelist = dawn.add(recruit(Archetype::Duelist, "Sable").unwrap());
    let own_team = dawn.id;
    let mut dusk = Team::new("Dusk");
    dusk.add(dummy("Rook"));
    let mut world = World::new(vec![dawn, dusk]);

    let before_knight = world.character(knight).unwrap().parry_chance.current();
    let before_duelist = world.character(duelist).unwrap().parry_chance.current();

    cast(&engine, &mut world, knight, 3, Some(TargetRef::Team(own_team)));

    assert_eq!(
        world.character(knight).unwrap().parry_chance.current(),
        before_knight + 5
    );
    assert_eq!(
        world.character(duelist).unwrap().parry_chance.current(),
        before_duelist + 5
    );
}

#[test]
fn test_raised_chances_saturate_at_the_cap() {
    let engine = Engine::new();
    let duelist = recruit(Archetype::Duelist, "Sable").unwrap();
    let (mut world, a, _b) = duel_between(duelist, dummy("Rook"));
    let cap = world.character(a).unwrap().dodge_chance.max();

    // Battle Focus over and over: +5 dodge per cast, three-turn reload.
    for _ in 0..20 {
        cast(&engine, &mut world, a, 3, None);
        for _ in 0..3 {
            engine.end_turn(&mut world, a);
        }
    }
    assert_eq!(world.character(a).unwrap().dodge_chance.current(), cap);
}

#[test]
fn test_mana_gift_refills_a_teammates_pool() {
    let engine = Engine::new();
    let mut dawn = Team::new("Dawn");
    let cleric = dawn.add(recruit(Archetype::Cleric, "Liora").unwrap());
    let sorcerer = dawn.add(recruit(Archetype::Sorcerer, "Vex").unwrap());
    let mut dusk = Team::new("Dusk");
    dusk.add(dummy("Rook"));
    let mut world = World::new(vec![dawn, dusk]);
    world
        .character_mut(sorcerer)
        .unwrap()
        .mana
        .as_mut()
        .unwrap()
        .set(20);

    cast(
        &engine,
        &mut world,
        cleric,
        4,
        Some(TargetRef::Character(sorcerer)),
    );
    assert_eq!(
        world
            .character(sorcerer)
            .unwrap()
            .mana
            .as_ref()
            .unwrap()
            .current(),
        35
    );
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_loadout_descriptions_render_from_stats() {
    for archetype in Archetype::all() {
        let character = recruit(*archetype, "Probe").unwrap();
        for skill in &character.skills {
            let text = skill.describe(&character);
            assert!(text.starts_with(&skill.name), "{text}");
            assert!(text.len() > skill.name.len());
        }
    }
}

#[test]
fn test_catalog_mints_independent_instances() {
    let mut first = get_skill("Volley").unwrap();
    let second = get_skill("Volley").unwrap();
    first.start_cooldown();
    assert!(first.on_cooldown());
    assert!(!second.on_cooldown());
}
