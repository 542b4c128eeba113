//! Turn-based party combat engine.
//!
//! This crate provides:
//! - Characters grouped into teams, with bounded health/mana pools,
//!   defensive chance stats, and timed status effects
//! - A data-driven skill model (attacks and special abilities) with
//!   cooldowns, mana costs, and declared target contracts
//! - A combat resolution engine: two-phase activation, the canonical
//!   dodge/resist/parry/armor mitigation pipeline, team-wide fan-out, and
//!   chained reactions (counterattacks, spell reflection)
//! - An archetype content set and a deterministic testing harness
//!
//! The console UI and the turn-driving loop live outside this crate; the
//! engine exposes the decision points they call into and narrates every
//! resolution step into the world's log.
//!
//! # Quick Start
//!
//! ```
//! use skirmish_core::{recruit, Archetype, Engine, Team, TargetRef, World};
//!
//! # fn main() -> Result<(), skirmish_core::BoundedError> {
//! let mut blue = Team::new("Blue");
//! let knight = blue.add(recruit(Archetype::Knight, "Bors")?);
//! let mut red = Team::new("Red");
//! let sorcerer = red.add(recruit(Archetype::Sorcerer, "Vex")?);
//!
//! let mut world = World::new(vec![blue, red]);
//! let engine = Engine::new();
//!
//! // Knight slashes the sorcerer (loadout slot 0).
//! let outcome = engine.use_skill(&mut world, knight, 0, Some(TargetRef::Character(sorcerer)));
//! if outcome.ready {
//!     engine.execute_skill(&mut world, knight, 0);
//! }
//! engine.end_turn(&mut world, knight);
//!
//! for line in &world.log {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod bounded;
pub mod content;
pub mod rules;
pub mod skills;
pub mod testing;
pub mod world;

// Primary public API
pub use bounded::{BoundedError, BoundedValue};
pub use content::{archetype_data, get_skill, recruit, ArchetypeData, SkillTemplate, CHANCE_CAP};
pub use rules::{apply_effect, AttackOutcome, Effect, Engine, Resolution, UseOutcome};
pub use skills::{
    AttackSpec, ChanceKind, DamageFormula, PostEffect, Skill, SkillKind, SpecialAction,
    TargetError, TargetKind, TargetRef,
};
pub use world::{
    ActiveEffect, Archetype, ArmorKind, Character, CharacterId, DamageType, StatusEffect, Team,
    TeamId, World,
};
