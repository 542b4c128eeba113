//! Archetype stat blocks and the skill catalog.
//!
//! Content is data: each archetype has a static stat block and a loadout of
//! catalog skills. The catalog mints a fresh `Skill` per lookup so every
//! character tracks its own cooldowns.

use crate::bounded::{BoundedError, BoundedValue};
use crate::skills::{
    AttackSpec, ChanceKind, DamageFormula, PostEffect, Skill, SkillKind, SpecialAction,
    TargetKind,
};
use crate::world::{Archetype, ArmorKind, Character, CharacterId, DamageType, StatusEffect, TeamId};

/// Ceiling for every defensive chance stat; upgrades saturate here.
pub const CHANCE_CAP: i32 = 75;

// ============================================================================
// Archetype Data
// ============================================================================

/// Static stat block and loadout for an archetype.
pub struct ArchetypeData {
    pub health: i32,
    pub mana: Option<i32>,
    pub speed: i32,
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub distance_attack: i32,
    pub armor: ArmorKind,
    pub dodge: i32,
    pub parry: i32,
    pub spell_resistance: i32,
    pub loadout: &'static [&'static str],
}

pub fn archetype_data(archetype: Archetype) -> ArchetypeData {
    match archetype {
        Archetype::Knight => ArchetypeData {
            health: 120,
            mana: None,
            speed: 6,
            physical_attack: 18,
            magical_attack: 0,
            distance_attack: 5,
            armor: ArmorKind::Plates,
            dodge: 5,
            parry: 20,
            spell_resistance: 5,
            loadout: &["Slash", "Shield Bash", "Second Breath", "Rallying Cry"],
        },
        Archetype::Duelist => ArchetypeData {
            health: 90,
            mana: None,
            speed: 12,
            physical_attack: 16,
            magical_attack: 0,
            distance_attack: 8,
            armor: ArmorKind::Leather,
            dodge: 25,
            parry: 15,
            spell_resistance: 5,
            loadout: &["Slash", "Crippling Cut", "Executioner's Lunge", "Battle Focus"],
        },
        Archetype::Ranger => ArchetypeData {
            health: 85,
            mana: None,
            speed: 14,
            physical_attack: 10,
            magical_attack: 0,
            distance_attack: 17,
            armor: ArmorKind::Leather,
            dodge: 20,
            parry: 5,
            spell_resistance: 10,
            loadout: &["Piercing Shot", "Venom Dart", "Volley"],
        },
        Archetype::Sorcerer => ArchetypeData {
            health: 70,
            mana: Some(60),
            speed: 9,
            physical_attack: 5,
            magical_attack: 20,
            distance_attack: 5,
            armor: ArmorKind::Textile,
            dodge: 10,
            parry: 0,
            spell_resistance: 25,
            loadout: &["Fireball", "Flame Wave", "Mana Rend", "Arcane Ward", "Mirror Shield"],
        },
        Archetype::Cleric => ArchetypeData {
            health: 95,
            mana: Some(70),
            speed: 8,
            physical_attack: 10,
            magical_attack: 14,
            distance_attack: 5,
            armor: ArmorKind::Mesh,
            dodge: 5,
            parry: 10,
            spell_resistance: 20,
            loadout: &["Smite", "Mending", "Soothing Chant", "Revival Prayer", "Mana Gift"],
        },
    }
}

// ============================================================================
// Skill Catalog
// ============================================================================

/// A skill the catalog knows how to teach.
pub struct SkillTemplate {
    pub name: &'static str,
    pub target_kind: TargetKind,
    pub mana_cost: i32,
    pub reload_time: i32,
    pub kind: SkillKind,
}

fn attack(damage_type: DamageType, formula: DamageFormula) -> SkillKind {
    SkillKind::Attack(AttackSpec {
        damage_type,
        formula,
        post_effects: vec![],
    })
}

fn attack_with(
    damage_type: DamageType,
    formula: DamageFormula,
    post_effects: Vec<PostEffect>,
) -> SkillKind {
    SkillKind::Attack(AttackSpec {
        damage_type,
        formula,
        post_effects,
    })
}

lazy_static::lazy_static! {
    /// Every skill the content set can teach.
    pub static ref SKILL_BOOK: Vec<SkillTemplate> = vec![
        // Martial
        SkillTemplate {
            name: "Slash",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 0,
            kind: attack(DamageType::Physical, DamageFormula::StatPlus { bonus: 0 }),
        },
        SkillTemplate {
            name: "Shield Bash",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 2,
            kind: attack_with(
                DamageType::Physical,
                DamageFormula::StatPlus { bonus: 5 },
                vec![PostEffect::Inflict { effect: StatusEffect::Stun, turns: 1 }],
            ),
        },
        SkillTemplate {
            name: "Second Breath",
            target_kind: TargetKind::SelfOnly,
            mana_cost: 0,
            reload_time: 3,
            kind: SkillKind::Special(SpecialAction::Heal { amount: 20 }),
        },
        SkillTemplate {
            name: "Rallying Cry",
            target_kind: TargetKind::TeamAllied,
            mana_cost: 0,
            reload_time: 4,
            kind: SkillKind::Special(SpecialAction::RaiseChance {
                chance: ChanceKind::Parry,
                amount: 5,
            }),
        },
        SkillTemplate {
            name: "Crippling Cut",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 1,
            kind: attack_with(
                DamageType::Physical,
                DamageFormula::StatPlus { bonus: 2 },
                vec![PostEffect::Inflict { effect: StatusEffect::Bleed, turns: 2 }],
            ),
        },
        SkillTemplate {
            name: "Executioner's Lunge",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 2,
            kind: attack(DamageType::Physical, DamageFormula::Executioner { bonus: 15 }),
        },
        SkillTemplate {
            name: "Battle Focus",
            target_kind: TargetKind::SelfOnly,
            mana_cost: 0,
            reload_time: 3,
            kind: SkillKind::Special(SpecialAction::RaiseChance {
                chance: ChanceKind::Dodge,
                amount: 5,
            }),
        },
        // Ranged
        SkillTemplate {
            name: "Piercing Shot",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 1,
            kind: attack(DamageType::Distance, DamageFormula::StatPlus { bonus: 3 }),
        },
        SkillTemplate {
            name: "Venom Dart",
            target_kind: TargetKind::Enemy,
            mana_cost: 0,
            reload_time: 1,
            kind: attack_with(
                DamageType::Distance,
                DamageFormula::Flat(6),
                vec![PostEffect::Inflict { effect: StatusEffect::Poison, turns: 3 }],
            ),
        },
        SkillTemplate {
            name: "Volley",
            target_kind: TargetKind::TeamEnemy,
            mana_cost: 0,
            reload_time: 3,
            kind: attack(DamageType::Distance, DamageFormula::Flat(12)),
        },
        // Arcane
        SkillTemplate {
            name: "Fireball",
            target_kind: TargetKind::Enemy,
            mana_cost: 10,
            reload_time: 1,
            kind: attack_with(
                DamageType::Magical,
                DamageFormula::StatPlus { bonus: 8 },
                vec![PostEffect::Inflict { effect: StatusEffect::Burn, turns: 2 }],
            ),
        },
        SkillTemplate {
            name: "Flame Wave",
            target_kind: TargetKind::TeamEnemy,
            mana_cost: 18,
            reload_time: 3,
            kind: attack_with(
                DamageType::Magical,
                DamageFormula::StatPlus { bonus: 0 },
                vec![PostEffect::Inflict { effect: StatusEffect::Burn, turns: 1 }],
            ),
        },
        SkillTemplate {
            name: "Mana Rend",
            target_kind: TargetKind::Enemy,
            mana_cost: 6,
            reload_time: 1,
            kind: attack_with(
                DamageType::Magical,
                DamageFormula::StatPlus { bonus: 0 },
                vec![PostEffect::ManaBurn(10)],
            ),
        },
        SkillTemplate {
            name: "Arcane Ward",
            target_kind: TargetKind::SelfOnly,
            mana_cost: 8,
            reload_time: 2,
            kind: SkillKind::Special(SpecialAction::Ward),
        },
        SkillTemplate {
            name: "Mirror Shield",
            target_kind: TargetKind::SelfOnly,
            mana_cost: 12,
            reload_time: 4,
            kind: SkillKind::Special(SpecialAction::MirrorShield),
        },
        // Devotion
        SkillTemplate {
            name: "Smite",
            target_kind: TargetKind::Enemy,
            mana_cost: 6,
            reload_time: 0,
            kind: attack(DamageType::Magical, DamageFormula::StatPlus { bonus: 4 }),
        },
        SkillTemplate {
            name: "Mending",
            target_kind: TargetKind::Teammate,
            mana_cost: 8,
            reload_time: 0,
            kind: SkillKind::Special(SpecialAction::Heal { amount: 25 }),
        },
        SkillTemplate {
            name: "Soothing Chant",
            target_kind: TargetKind::Teammate,
            mana_cost: 10,
            reload_time: 2,
            kind: SkillKind::Special(SpecialAction::Grant {
                effect: StatusEffect::Regeneration,
                turns: 3,
            }),
        },
        SkillTemplate {
            name: "Revival Prayer",
            target_kind: TargetKind::TeammateDead,
            mana_cost: 20,
            reload_time: 5,
            kind: SkillKind::Special(SpecialAction::Revive { health_percent: 50 }),
        },
        SkillTemplate {
            name: "Mana Gift",
            target_kind: TargetKind::Teammate,
            mana_cost: 0,
            reload_time: 3,
            kind: SkillKind::Special(SpecialAction::RestoreMana { amount: 15 }),
        },
    ];
}

/// Look up a catalog skill by name (case-insensitive) and mint a fresh
/// instance.
pub fn get_skill(name: &str) -> Option<Skill> {
    let template = SKILL_BOOK
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))?;
    Skill::new(
        template.name,
        template.target_kind,
        template.mana_cost,
        template.reload_time,
        template.kind.clone(),
    )
    .ok()
}

/// Build a fully equipped character of an archetype. The character joins a
/// team via [`crate::world::Team::add`], which fixes up the back-reference.
pub fn recruit(archetype: Archetype, name: impl Into<String>) -> Result<Character, BoundedError> {
    let data = archetype_data(archetype);
    let skills = data.loadout.iter().filter_map(|n| get_skill(n)).collect();

    Ok(Character {
        id: CharacterId::new(),
        name: name.into(),
        team: TeamId::new(),
        archetype,
        health: BoundedValue::full(data.health)?,
        mana: data.mana.map(BoundedValue::full).transpose()?,
        speed: data.speed,
        physical_attack: data.physical_attack,
        magical_attack: data.magical_attack,
        distance_attack: data.distance_attack,
        armor: data.armor,
        dodge_chance: BoundedValue::new(0, CHANCE_CAP, data.dodge)?,
        parry_chance: BoundedValue::new(0, CHANCE_CAP, data.parry)?,
        spell_resistance: BoundedValue::new(0, CHANCE_CAP, data.spell_resistance)?,
        effects: Vec::new(),
        skills,
        mirror_ready: false,
        ward_active: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_skill_is_case_insensitive() {
        assert!(get_skill("fireball").is_some());
        assert!(get_skill("FIREBALL").is_some());
        assert!(get_skill("Fireball").is_some());
        assert!(get_skill("Meteor Swarm").is_none());
    }

    #[test]
    fn test_every_loadout_entry_resolves() {
        for archetype in Archetype::all() {
            let data = archetype_data(*archetype);
            for name in data.loadout {
                assert!(
                    get_skill(name).is_some(),
                    "{archetype} loadout references unknown skill {name}"
                );
            }
        }
    }

    #[test]
    fn test_recruit_equips_the_loadout() {
        let sorcerer = recruit(Archetype::Sorcerer, "Vex").unwrap();
        assert_eq!(sorcerer.skills.len(), 5);
        assert!(sorcerer.mana.is_some());
        assert_eq!(sorcerer.armor, ArmorKind::Textile);

        let knight = recruit(Archetype::Knight, "Bors").unwrap();
        assert!(knight.mana.is_none());
        assert_eq!(knight.armor, ArmorKind::Plates);
        assert!(knight.health.is_full());
    }

    #[test]
    fn test_minted_skills_are_independent() {
        let mut first = get_skill("Shield Bash").unwrap();
        let second = get_skill("Shield Bash").unwrap();
        first.start_cooldown();
        assert!(first.on_cooldown());
        assert!(!second.on_cooldown());
    }

    #[test]
    fn test_chances_respect_the_cap() {
        for archetype in Archetype::all() {
            let character = recruit(*archetype, "Probe").unwrap();
            assert!(character.dodge_chance.max() == CHANCE_CAP);
            assert!(character.dodge_chance.current() <= CHANCE_CAP);
        }
    }
}
