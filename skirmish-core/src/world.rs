//! Match state: characters, teams, and the world they fight in.
//!
//! Contains the taxonomies every skill resolution consults (damage types,
//! armor kinds, status effects) and the `World` that owns all mutable match
//! state. The world's narration log is the engine's observable output: every
//! resolution step appends a human-readable line to it.

use crate::bounded::BoundedValue;
use crate::skills::Skill;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub Uuid);

impl TeamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Damage and Armor
// ============================================================================

/// The three damage channels, each mitigated by a different defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
    Distance,
}

impl DamageType {
    pub fn name(&self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Magical => "magical",
            DamageType::Distance => "distance",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Armor categories, from robes to full plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorKind {
    Textile,
    Leather,
    Mesh,
    Plates,
}

impl ArmorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArmorKind::Textile => "textile",
            ArmorKind::Leather => "leather",
            ArmorKind::Mesh => "mesh",
            ArmorKind::Plates => "plates",
        }
    }

    /// Fraction of incoming damage absorbed, keyed by damage type.
    ///
    /// Heavier armor absorbs more physical damage but channels magic;
    /// distance attacks ignore armor entirely.
    pub fn mitigation(&self, damage_type: DamageType) -> f32 {
        match damage_type {
            DamageType::Physical => match self {
                ArmorKind::Textile => 0.0,
                ArmorKind::Leather => 0.15,
                ArmorKind::Mesh => 0.30,
                ArmorKind::Plates => 0.44,
            },
            DamageType::Magical => match self {
                ArmorKind::Textile => 0.30,
                ArmorKind::Leather => 0.20,
                ArmorKind::Mesh => 0.10,
                ArmorKind::Plates => 0.0,
            },
            DamageType::Distance => 0.0,
        }
    }
}

impl fmt::Display for ArmorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Status Effects
// ============================================================================

/// Timed per-character conditions, ticked once per turn boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    Poison,
    Bleed,
    Burn,
    Regeneration,
    Stun,
}

impl StatusEffect {
    pub fn name(&self) -> &'static str {
        match self {
            StatusEffect::Poison => "Poison",
            StatusEffect::Bleed => "Bleed",
            StatusEffect::Burn => "Burn",
            StatusEffect::Regeneration => "Regeneration",
            StatusEffect::Stun => "Stun",
        }
    }

    /// Whether the effect prevents its bearer from acting.
    pub fn is_incapacitating(&self) -> bool {
        matches!(self, StatusEffect::Stun)
    }
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A status effect applied to a character with its remaining duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect: StatusEffect,
    pub remaining_turns: u32,
}

impl ActiveEffect {
    pub fn new(effect: StatusEffect, remaining_turns: u32) -> Self {
        Self {
            effect,
            remaining_turns,
        }
    }
}

// ============================================================================
// Archetypes
// ============================================================================

/// Combat archetypes. Stat blocks and loadouts live in [`crate::content`];
/// defensive reaction policies are consulted by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Knight,
    Duelist,
    Ranger,
    Sorcerer,
    Cleric,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Knight => "Knight",
            Archetype::Duelist => "Duelist",
            Archetype::Ranger => "Ranger",
            Archetype::Sorcerer => "Sorcerer",
            Archetype::Cleric => "Cleric",
        }
    }

    pub fn all() -> &'static [Archetype] {
        &[
            Archetype::Knight,
            Archetype::Duelist,
            Archetype::Ranger,
            Archetype::Sorcerer,
            Archetype::Cleric,
        ]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Character
// ============================================================================

/// A combatant. Created at team-build time and never destroyed: a fallen
/// character stays in the roster so revival skills can target it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Back-reference to the owning team; set when the team adds the member.
    pub team: TeamId,
    pub archetype: Archetype,

    // Stat block
    pub health: BoundedValue,
    /// Mana is a capability, not a universal stat; martial archetypes have
    /// no pool at all.
    pub mana: Option<BoundedValue>,
    pub speed: i32,
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub distance_attack: i32,
    pub armor: ArmorKind,

    // Defensive chances, in percent. Bounded so upgrades saturate at a cap.
    pub dodge_chance: BoundedValue,
    pub parry_chance: BoundedValue,
    pub spell_resistance: BoundedValue,

    pub effects: Vec<ActiveEffect>,
    pub skills: Vec<Skill>,

    /// The next incoming attack is thrown back at its originator.
    pub mirror_ready: bool,
    /// The next damaging hit is halved.
    pub ward_active: bool,
}

impl Character {
    pub fn is_alive(&self) -> bool {
        self.health.current() > 0
    }

    /// Alive and not locked down by an incapacitating effect.
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.effects.iter().any(|a| a.effect.is_incapacitating())
    }

    /// The attack stat feeding a given damage channel.
    pub fn attack_stat(&self, damage_type: DamageType) -> i32 {
        match damage_type {
            DamageType::Physical => self.physical_attack,
            DamageType::Magical => self.magical_attack,
            DamageType::Distance => self.distance_attack,
        }
    }

    /// Heal up to `amount`. Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.health.add(amount)
    }

    pub fn has_effect(&self, effect: StatusEffect) -> bool {
        self.effects.iter().any(|a| a.effect == effect)
    }

    /// Apply a status effect. Re-applying an active kind extends its
    /// duration rather than stacking a second instance. Returns the total
    /// turns now remaining.
    pub fn add_effect(&mut self, effect: StatusEffect, turns: u32) -> u32 {
        if let Some(active) = self.effects.iter_mut().find(|a| a.effect == effect) {
            active.remaining_turns += turns;
            active.remaining_turns
        } else {
            self.effects.push(ActiveEffect::new(effect, turns));
            turns
        }
    }

    /// Whether the character can pay a mana cost right now.
    pub fn can_afford(&self, cost: i32) -> bool {
        cost <= 0 || self.mana.as_ref().is_some_and(|pool| pool.current() >= cost)
    }

    /// Spend mana. Returns false (without spending) when the pool is missing
    /// or short.
    pub fn spend_mana(&mut self, cost: i32) -> bool {
        if cost <= 0 {
            return true;
        }
        match self.mana.as_mut() {
            Some(pool) if pool.current() >= cost => {
                pool.subtract(cost);
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Team
// ============================================================================

/// A named group of characters. Membership is exclusive: a character joins
/// exactly one team for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Character>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member, fixing up its team back-reference. Returns the member's
    /// id for later addressing.
    pub fn add(&mut self, mut character: Character) -> CharacterId {
        character.team = self.id;
        let id = character.id;
        self.members.push(character);
        id
    }

    pub fn any_alive(&self) -> bool {
        self.members.iter().any(Character::is_alive)
    }

    pub fn is_defeated(&self) -> bool {
        !self.any_alive()
    }

    /// Living members, in roster order.
    pub fn living(&self) -> impl Iterator<Item = &Character> {
        self.members.iter().filter(|c| c.is_alive())
    }

    /// Restore the team between encounters: health and mana refilled,
    /// effects, defensive flags, and cooldowns cleared. Fallen members
    /// respawn at full health.
    pub fn reset(&mut self) {
        for member in &mut self.members {
            member.health.fill();
            if let Some(pool) = member.mana.as_mut() {
                pool.fill();
            }
            member.effects.clear();
            member.mirror_ready = false;
            member.ward_active = false;
            for skill in &mut member.skills {
                skill.reload.drain();
                skill.bound_target = None;
            }
        }
    }
}

// ============================================================================
// World
// ============================================================================

/// All mutable state of one match: the teams and the narration log. Each
/// match owns its own world; nothing is shared between matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub teams: Vec<Team>,
    /// Ordered narration lines. This is the engine's observable trace.
    pub log: Vec<String>,
}

impl World {
    pub fn new(teams: Vec<Team>) -> Self {
        Self {
            teams,
            log: Vec::new(),
        }
    }

    /// Append a narration line.
    pub fn narrate(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.teams
            .iter()
            .flat_map(|t| t.members.iter())
            .find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.teams
            .iter_mut()
            .flat_map(|t| t.members.iter_mut())
            .find(|c| c.id == id)
    }

    /// Combat continues while at least two teams still have someone
    /// standing.
    pub fn combat_is_on(&self) -> bool {
        self.teams.iter().filter(|t| t.any_alive()).count() >= 2
    }

    /// Liveness check, optionally announcing a fallen character.
    pub fn is_alive(&mut self, id: CharacterId, announce: bool) -> bool {
        let Some(character) = self.character(id) else {
            return false;
        };
        let alive = character.is_alive();
        if announce && !alive {
            let name = character.name.clone();
            self.narrate(format!("{name} is out of the fight."));
        }
        alive
    }

    /// Heal a character, optionally announcing the amount actually restored.
    pub fn heal(&mut self, id: CharacterId, amount: i32, announce: bool) -> i32 {
        let Some(character) = self.character_mut(id) else {
            return 0;
        };
        let name = character.name.clone();
        let healed = character.heal(amount);
        if announce {
            self.narrate(format!("{name} recovers {healed} health."));
        }
        healed
    }

    /// All living characters ordered by speed, fastest first. The external
    /// driver iterates this to run a round.
    pub fn turn_order(&self) -> Vec<CharacterId> {
        let mut living: Vec<(i32, CharacterId)> = self
            .teams
            .iter()
            .flat_map(|t| t.living())
            .map(|c| (c.speed, c.id))
            .collect();
        living.sort_by(|a, b| b.0.cmp(&a.0));
        living.into_iter().map(|(_, id)| id).collect()
    }

    /// Reset every team for a fresh encounter and clear the log.
    pub fn reset(&mut self) {
        for team in &mut self.teams {
            team.reset();
        }
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dummy;

    #[test]
    fn test_armor_mitigation_table() {
        assert_eq!(ArmorKind::Plates.mitigation(DamageType::Physical), 0.44);
        assert_eq!(ArmorKind::Textile.mitigation(DamageType::Physical), 0.0);
        assert_eq!(ArmorKind::Textile.mitigation(DamageType::Magical), 0.30);
        assert_eq!(ArmorKind::Plates.mitigation(DamageType::Magical), 0.0);
        for kind in [
            ArmorKind::Textile,
            ArmorKind::Leather,
            ArmorKind::Mesh,
            ArmorKind::Plates,
        ] {
            assert_eq!(kind.mitigation(DamageType::Distance), 0.0);
        }
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut character = dummy("Edda");
        character.health.set(40);
        assert_eq!(character.heal(70), 60);
        assert_eq!(character.health.current(), character.health.max());
    }

    #[test]
    fn test_add_effect_extends_duration() {
        let mut character = dummy("Edda");
        assert_eq!(character.add_effect(StatusEffect::Poison, 3), 3);
        assert_eq!(character.add_effect(StatusEffect::Poison, 2), 5);
        assert_eq!(character.effects.len(), 1);
        assert_eq!(character.add_effect(StatusEffect::Burn, 2), 2);
        assert_eq!(character.effects.len(), 2);
    }

    #[test]
    fn test_stun_gates_can_act() {
        let mut character = dummy("Edda");
        assert!(character.can_act());
        character.add_effect(StatusEffect::Stun, 1);
        assert!(!character.can_act());
        assert!(character.is_alive());
    }

    #[test]
    fn test_team_membership_and_liveness() {
        let mut team = Team::new("Dawn");
        team.add(dummy("Edda"));
        assert_eq!(team.members[0].team, team.id);
        assert!(team.any_alive());

        team.members[0].health.drain();
        assert!(team.is_defeated());

        team.reset();
        assert!(team.any_alive());
    }

    #[test]
    fn test_combat_is_on() {
        let mut blue = Team::new("Blue");
        blue.add(dummy("Edda"));
        let mut red = Team::new("Red");
        red.add(dummy("Rook"));
        let mut world = World::new(vec![blue, red]);
        assert!(world.combat_is_on());

        let loser = world.teams[1].members[0].id;
        world.character_mut(loser).unwrap().health.drain();
        assert!(!world.combat_is_on());
    }

    #[test]
    fn test_turn_order_fastest_first() {
        let mut blue = Team::new("Blue");
        let mut quick = dummy("Quick");
        quick.speed = 20;
        let quick_id = blue.add(quick);
        let mut red = Team::new("Red");
        let slow_id = red.add(dummy("Slow"));

        let world = World::new(vec![blue, red]);
        assert_eq!(world.turn_order(), vec![quick_id, slow_id]);
    }
}
