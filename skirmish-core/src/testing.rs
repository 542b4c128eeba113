//! Deterministic test support.
//!
//! Real skirmishes are random. The helpers here build combatants with every
//! chance stat zeroed so resolution follows the arithmetic alone; forcing a
//! chance to 100 instead makes the corresponding roll certain. Tests capture
//! `world.log` as an ordered sequence rather than parsing console output.

use crate::bounded::BoundedValue;
use crate::rules::{Engine, Resolution};
use crate::skills::{AttackSpec, DamageFormula, Skill, SkillKind, TargetKind, TargetRef};
use crate::world::{
    Archetype, ArmorKind, Character, CharacterId, DamageType, Team, TeamId, World,
};

/// A defensive chance seeded at `percent`. Capped at 100 rather than the
/// content cap so tests can force a roll to certainty.
pub fn chance(percent: i32) -> BoundedValue {
    BoundedValue::new(0, 100, percent).expect("static range")
}

/// A plain combatant with no randomness: zeroed chances, textile armor,
/// no mana pool, no skills, and an archetype with no reaction policy.
pub fn dummy(name: &str) -> Character {
    Character {
        id: CharacterId::new(),
        name: name.to_string(),
        team: TeamId::new(),
        archetype: Archetype::Ranger,
        health: BoundedValue::full(100).expect("static range"),
        mana: None,
        speed: 10,
        physical_attack: 20,
        magical_attack: 20,
        distance_attack: 20,
        armor: ArmorKind::Textile,
        dodge_chance: chance(0),
        parry_chance: chance(0),
        spell_resistance: chance(0),
        effects: Vec::new(),
        skills: Vec::new(),
        mirror_ready: false,
        ward_active: false,
    }
}

/// A free, instant, single-target physical strike dealing flat damage.
pub fn strike(damage: i32) -> Skill {
    Skill::new(
        "Strike",
        TargetKind::Enemy,
        0,
        0,
        SkillKind::Attack(AttackSpec {
            damage_type: DamageType::Physical,
            formula: DamageFormula::Flat(damage),
            post_effects: vec![],
        }),
    )
    .expect("static range")
}

/// Two dummies on opposing teams "Blue" and "Red".
pub fn duel() -> (World, CharacterId, CharacterId) {
    duel_between(dummy("Edda"), dummy("Rook"))
}

/// Two specific combatants on opposing teams "Blue" and "Red".
pub fn duel_between(a: Character, b: Character) -> (World, CharacterId, CharacterId) {
    let mut blue = Team::new("Blue");
    let a_id = blue.add(a);
    let mut red = Team::new("Red");
    let b_id = red.add(b);
    (World::new(vec![blue, red]), a_id, b_id)
}

/// One attacker against a whole defending team. Returns the world, the
/// attacker, the defending team's id, and the defenders' ids in order.
pub fn raid(
    attacker: Character,
    defenders: Vec<Character>,
) -> (World, CharacterId, TeamId, Vec<CharacterId>) {
    let mut blue = Team::new("Blue");
    let attacker_id = blue.add(attacker);
    let mut red = Team::new("Red");
    let defender_ids: Vec<CharacterId> = defenders.into_iter().map(|d| red.add(d)).collect();
    let red_id = red.id;
    (World::new(vec![blue, red]), attacker_id, red_id, defender_ids)
}

/// Use and, once committed, immediately execute a skill, the way the
/// driver does. Returns an empty resolution when the use bounced.
pub fn cast(
    engine: &Engine,
    world: &mut World,
    actor: CharacterId,
    skill_index: usize,
    target: Option<TargetRef>,
) -> Resolution {
    let outcome = engine.use_skill(world, actor, skill_index, target);
    if outcome.ready {
        engine.execute_skill(world, actor, skill_index)
    } else {
        Resolution::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_is_deterministic() {
        let d = dummy("Edda");
        assert_eq!(d.dodge_chance.current(), 0);
        assert_eq!(d.parry_chance.current(), 0);
        assert_eq!(d.spell_resistance.current(), 0);
        assert!(d.mana.is_none());
    }

    #[test]
    fn test_duel_puts_fighters_on_opposing_teams() {
        let (world, a, b) = duel();
        let a_team = world.character(a).unwrap().team;
        let b_team = world.character(b).unwrap().team;
        assert_ne!(a_team, b_team);
    }
}
