//! The skill model: targeting, damage formulas, and activation state.
//!
//! Skills are data. An attack carries a damage formula, a damage type, and
//! the side effects that ride on a landed hit; a special ability carries a
//! non-damage action. The rules engine interprets both.

use crate::bounded::{BoundedError, BoundedValue};
use crate::world::{Character, CharacterId, DamageType, StatusEffect, TeamId, World};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Targeting
// ============================================================================

/// Declared eligibility class for a skill's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Only the owner itself.
    SelfOnly,
    /// A living character on the owner's team, other than the owner.
    Teammate,
    /// A fallen character on the owner's team, other than the owner.
    TeammateDead,
    /// A living character on another team.
    Enemy,
    /// The owner's own team.
    TeamAllied,
    /// Any team other than the owner's.
    TeamEnemy,
}

impl TargetKind {
    /// Whether the kind targets a whole team rather than one character.
    pub fn is_team_kind(&self) -> bool {
        matches!(self, TargetKind::TeamAllied | TargetKind::TeamEnemy)
    }

    /// Validate a bound target against this kind.
    pub fn validate(
        &self,
        world: &World,
        owner: CharacterId,
        target: &TargetRef,
    ) -> Result<(), TargetError> {
        let owner_team = world
            .character(owner)
            .map(|c| c.team)
            .ok_or(TargetError::Unknown)?;

        let ok = match (self, target) {
            (TargetKind::SelfOnly, TargetRef::Character(id)) => *id == owner,
            (TargetKind::Teammate, TargetRef::Character(id)) => {
                let c = world.character(*id).ok_or(TargetError::Unknown)?;
                *id != owner && c.team == owner_team && c.is_alive()
            }
            (TargetKind::TeammateDead, TargetRef::Character(id)) => {
                let c = world.character(*id).ok_or(TargetError::Unknown)?;
                *id != owner && c.team == owner_team && !c.is_alive()
            }
            (TargetKind::Enemy, TargetRef::Character(id)) => {
                let c = world.character(*id).ok_or(TargetError::Unknown)?;
                c.team != owner_team && c.is_alive()
            }
            (TargetKind::TeamAllied, TargetRef::Team(id)) => {
                world.team(*id).ok_or(TargetError::Unknown)?;
                *id == owner_team
            }
            (TargetKind::TeamEnemy, TargetRef::Team(id)) => {
                world.team(*id).ok_or(TargetError::Unknown)?;
                *id != owner_team
            }
            // Character kind bound to a team ref, or vice versa.
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(TargetError::Mismatch(*self))
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            TargetKind::SelfOnly => "yourself",
            TargetKind::Teammate => "a living teammate",
            TargetKind::TeammateDead => "a fallen teammate",
            TargetKind::Enemy => "a living enemy",
            TargetKind::TeamAllied => "your own team",
            TargetKind::TeamEnemy => "an enemy team",
        };
        write!(f, "{description}")
    }
}

/// A bound target: one character or a whole team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Character(CharacterId),
    Team(TeamId),
}

/// Why a target failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("no target bound")]
    Missing,
    #[error("the target is not part of this match")]
    Unknown,
    #[error("it requires {0}")]
    Mismatch(TargetKind),
}

// ============================================================================
// Damage Formulas
// ============================================================================

/// How an attack computes its base damage. Formulas may read the resolved
/// target, so damage can depend on the defender's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageFormula {
    /// Fixed damage regardless of stats.
    Flat(i32),
    /// The attacker's attack stat for the damage channel, plus a bonus.
    StatPlus { bonus: i32 },
    /// Attack stat, with extra damage against targets below half health.
    Executioner { bonus: i32 },
}

impl DamageFormula {
    /// Base damage against a resolved defender.
    pub fn damage(&self, attack_stat: i32, defender: &Character) -> i32 {
        match self {
            DamageFormula::Flat(amount) => *amount,
            DamageFormula::StatPlus { bonus } => attack_stat + bonus,
            DamageFormula::Executioner { bonus } => {
                if defender.health.ratio() < 0.5 {
                    attack_stat + bonus
                } else {
                    attack_stat
                }
            }
        }
    }

    /// Damage preview for descriptions, with no defender in hand.
    pub fn preview(&self, attack_stat: i32) -> String {
        match self {
            DamageFormula::Flat(amount) => format!("{amount}"),
            DamageFormula::StatPlus { bonus } => format!("{}", attack_stat + bonus),
            DamageFormula::Executioner { bonus } => {
                format!("{} ({} against the wounded)", attack_stat, attack_stat + bonus)
            }
        }
    }
}

// ============================================================================
// Attack Side Effects
// ============================================================================

/// A rider that fires after an attack's damage resolves, if the hit
/// connected. Counterattacks and reflection are not riders: those belong to
/// the defender and live in the rules engine's reaction policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostEffect {
    /// Inflict a status effect on the struck target.
    Inflict { effect: StatusEffect, turns: u32 },
    /// Sear mana out of the struck target's pool.
    ManaBurn(i32),
}

/// The damage-dealing half of the skill repertoire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub damage_type: DamageType,
    pub formula: DamageFormula,
    pub post_effects: Vec<PostEffect>,
}

// ============================================================================
// Special Abilities
// ============================================================================

/// Which defensive chance a buff raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanceKind {
    Dodge,
    Parry,
    SpellResistance,
}

impl ChanceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChanceKind::Dodge => "dodge",
            ChanceKind::Parry => "parry",
            ChanceKind::SpellResistance => "spell resistance",
        }
    }
}

/// The non-damage half of the skill repertoire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAction {
    /// Restore health to the target.
    Heal { amount: i32 },
    /// Bring a fallen teammate back with a fraction of max health.
    Revive { health_percent: u32 },
    /// Put a status effect on the target (e.g. Regeneration on an ally).
    Grant { effect: StatusEffect, turns: u32 },
    /// Permanently raise a defensive chance, saturating at its cap.
    RaiseChance { chance: ChanceKind, amount: i32 },
    /// Refill part of the target's mana pool.
    RestoreMana { amount: i32 },
    /// The caster's next damaging hit is halved.
    Ward,
    /// The caster's next incoming attack is thrown back at its originator.
    MirrorShield,
}

/// What a skill does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    Attack(AttackSpec),
    Special(SpecialAction),
}

// ============================================================================
// Skill
// ============================================================================

/// A named ability with a cooldown, a mana cost, and a target contract.
///
/// The concrete target is bound at use-time, not construction-time; only
/// `SelfOnly` skills bind implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub target_kind: TargetKind,
    pub mana_cost: i32,
    /// Counts down one per turn; the skill is usable at zero.
    pub reload: BoundedValue,
    pub kind: SkillKind,
    /// Bound by `use_skill`, cleared after execution.
    pub bound_target: Option<TargetRef>,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        target_kind: TargetKind,
        mana_cost: i32,
        reload_time: i32,
        kind: SkillKind,
    ) -> Result<Self, BoundedError> {
        Ok(Self {
            name: name.into(),
            target_kind,
            mana_cost,
            reload: BoundedValue::empty(reload_time)?,
            kind,
            bound_target: None,
        })
    }

    pub fn on_cooldown(&self) -> bool {
        self.reload.current() > 0
    }

    pub fn start_cooldown(&mut self) {
        self.reload.fill();
    }

    pub fn tick_cooldown(&mut self) {
        self.reload.subtract(1);
    }

    /// Render the description from the owner's current stats. Computed
    /// lazily because upgrades shift the numbers.
    pub fn describe(&self, owner: &Character) -> String {
        let action = match &self.kind {
            SkillKind::Attack(spec) => {
                let base = spec.formula.preview(owner.attack_stat(spec.damage_type));
                let mut text = format!("{} {} damage to {}", base, spec.damage_type, self.target_kind);
                for rider in &spec.post_effects {
                    match rider {
                        PostEffect::Inflict { effect, turns } => {
                            text.push_str(&format!(", inflicts {effect} for {turns} turns"));
                        }
                        PostEffect::ManaBurn(amount) => {
                            text.push_str(&format!(", sears {amount} mana"));
                        }
                    }
                }
                text
            }
            SkillKind::Special(action) => match action {
                SpecialAction::Heal { amount } => {
                    format!("restores {amount} health to {}", self.target_kind)
                }
                SpecialAction::Revive { health_percent } => {
                    format!("revives {} at {health_percent}% health", self.target_kind)
                }
                SpecialAction::Grant { effect, turns } => {
                    format!("grants {effect} to {} for {turns} turns", self.target_kind)
                }
                SpecialAction::RaiseChance { chance, amount } => {
                    format!("raises {} chance by {amount}%", chance.name())
                }
                SpecialAction::RestoreMana { amount } => {
                    format!("restores {amount} mana to {}", self.target_kind)
                }
                SpecialAction::Ward => "halves the next damaging hit taken".to_string(),
                SpecialAction::MirrorShield => {
                    "throws the next incoming attack back at its originator".to_string()
                }
            },
        };

        let mut costs = Vec::new();
        if self.mana_cost > 0 {
            costs.push(format!("{} mana", self.mana_cost));
        }
        if self.reload.max() > 0 {
            costs.push(format!("{} turn reload", self.reload.max()));
        }
        if costs.is_empty() {
            format!("{}: {}", self.name, action)
        } else {
            format!("{}: {} ({})", self.name, action, costs.join(", "))
        }
    }
}
