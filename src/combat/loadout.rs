//! Two-weapon comparison on the same doll.
//!
//! Shared stats come from the doll and the target; each weapon adds its own
//! attack, option roll, defense ignore and damage bonus on top.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::combat::curve::{linspace, DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS};
use crate::combat::damage::{compute_damage, DamageInputs};
use crate::combat::stacking::{LoadoutStat, StatContribution, StatStacking};

pub const WEAPON_OPTION_ATTACK_BONUS_PCT: f64 = 15.0;
pub const WEAPON_OPTION_CRIT_DAMAGE_PCT: f64 = 25.0;
pub const MAX_DEFENSE_IGNORE_PCT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Sentinel,
    Vanguard,
    Support,
    Bulwark,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Sentinel, Role::Vanguard, Role::Support, Role::Bulwark];

    pub const fn attack_bonus_pct(self) -> f64 {
        match self {
            Self::Sentinel => 22.0,
            Self::Vanguard | Self::Support => 17.0,
            Self::Bulwark => 0.0,
        }
    }

    pub const fn crit_damage_pct(self) -> f64 {
        match self {
            Self::Vanguard => 10.0,
            _ => 0.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentinel => "sentinel",
            Self::Vanguard => "vanguard",
            Self::Support => "support",
            Self::Bulwark => "bulwark",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown role '{s}' (expected sentinel, vanguard, support or bulwark)")
            })
    }
}

/// The fixed secondary roll a weapon carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponOption {
    #[default]
    AttackBonus,
    CritDamage,
}

impl WeaponOption {
    pub const fn attack_bonus_pct(self) -> f64 {
        match self {
            Self::AttackBonus => WEAPON_OPTION_ATTACK_BONUS_PCT,
            Self::CritDamage => 0.0,
        }
    }

    pub const fn crit_damage_pct(self) -> f64 {
        match self {
            Self::AttackBonus => 0.0,
            Self::CritDamage => WEAPON_OPTION_CRIT_DAMAGE_PCT,
        }
    }
}

impl FromStr for WeaponOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" | "attack_bonus" | "atk" => Ok(Self::AttackBonus),
            "crit" | "crit_damage" => Ok(Self::CritDamage),
            other => Err(format!("unknown weapon option '{other}' (expected attack or crit)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    pub attack: f64,
    pub option: WeaponOption,
    pub defense_ignore_pct: f64,
    pub damage_bonus_pct: f64,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            attack: 390.0,
            option: WeaponOption::AttackBonus,
            defense_ignore_pct: 0.0,
            damage_bonus_pct: 10.0,
        }
    }
}

/// Stats shared by both loadouts: the doll's own numbers, team buffs and the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedStats {
    pub enemy_defense: f64,
    pub base_attack: f64,
    pub base_attack_bonus_pct: f64,
    pub defense_ignore_pct: f64,
    pub weakness_hits: u32,
    pub skill_coef_pct: f64,
    pub damage_bonus_pct: f64,
    pub crit_damage_pct: f64,
}

impl Default for SharedStats {
    fn default() -> Self {
        Self {
            enemy_defense: 5000.0,
            base_attack: 1661.0,
            base_attack_bonus_pct: 65.6,
            defense_ignore_pct: 30.0,
            weakness_hits: 0,
            skill_coef_pct: 100.0,
            damage_bonus_pct: 0.0,
            crit_damage_pct: 120.0,
        }
    }
}

/// Final stats of one loadout after stacking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadoutStats {
    pub panel_attack: f64,
    pub damage_bonus_pct: f64,
    pub crit_damage_pct: f64,
    pub defense_ignore_pct: f64,
    pub contributions: Vec<StatContribution>,
}

impl LoadoutStats {
    pub fn damage_inputs(&self, shared: &SharedStats) -> DamageInputs {
        DamageInputs {
            attack: self.panel_attack,
            enemy_defense: shared.enemy_defense,
            defense_ignore_pct: self.defense_ignore_pct,
            damage_bonus_pct: self.damage_bonus_pct,
            weakness_hits: shared.weakness_hits,
            skill_coef_pct: shared.skill_coef_pct,
            crit_damage_pct: self.crit_damage_pct,
        }
    }
}

pub fn loadout_stats(shared: &SharedStats, role: Role, weapon: &Weapon) -> LoadoutStats {
    use LoadoutStat::*;

    let mut stacking = StatStacking::new();
    stacking.add_many([
        StatContribution::base(Attack, shared.base_attack, "doll"),
        StatContribution::base(Attack, weapon.attack, "weapon"),
        StatContribution::percent(Attack, shared.base_attack_bonus_pct, "doll"),
        StatContribution::percent(Attack, role.attack_bonus_pct(), "role"),
        StatContribution::percent(Attack, weapon.option.attack_bonus_pct(), "weapon_option"),
        StatContribution::flat(DamageBonus, shared.damage_bonus_pct, "team"),
        StatContribution::flat(DamageBonus, weapon.damage_bonus_pct, "weapon"),
        StatContribution::flat(CritDamage, shared.crit_damage_pct, "team"),
        StatContribution::flat(CritDamage, weapon.option.crit_damage_pct(), "weapon_option"),
        StatContribution::flat(CritDamage, role.crit_damage_pct(), "role"),
        StatContribution::flat(DefenseIgnore, shared.defense_ignore_pct, "team"),
        StatContribution::flat(DefenseIgnore, weapon.defense_ignore_pct, "weapon"),
    ]);

    LoadoutStats {
        panel_attack: stacking.composed(Attack),
        damage_bonus_pct: stacking.composed(DamageBonus),
        crit_damage_pct: stacking.composed(CritDamage),
        defense_ignore_pct: stacking.composed(DefenseIgnore).min(MAX_DEFENSE_IGNORE_PCT),
        contributions: stacking.contributions().to_vec(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AStronger,
    BStronger,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadoutComparison {
    pub role: Role,
    pub loadout_a: LoadoutStats,
    pub loadout_b: LoadoutStats,
    pub damage_a: f64,
    pub damage_b: f64,
    /// `damage_b - damage_a`.
    pub diff: f64,
    /// Percent by which B out-damages A; 0 when A deals no damage.
    pub efficiency_pct: f64,
    pub verdict: Verdict,
}

/// `(b / a - 1) * 100`, or 0 when `a` is zero.
pub fn efficiency_pct(damage_a: f64, damage_b: f64) -> f64 {
    if damage_a == 0.0 {
        0.0
    } else {
        (damage_b / damage_a - 1.0) * 100.0
    }
}

pub fn compare_loadouts(
    shared: &SharedStats,
    role: Role,
    weapon_a: &Weapon,
    weapon_b: &Weapon,
) -> LoadoutComparison {
    let loadout_a = loadout_stats(shared, role, weapon_a);
    let loadout_b = loadout_stats(shared, role, weapon_b);
    let damage_a = compute_damage(&loadout_a.damage_inputs(shared));
    let damage_b = compute_damage(&loadout_b.damage_inputs(shared));
    let diff = damage_b - damage_a;
    let verdict = if diff > 0.0 {
        Verdict::BStronger
    } else if diff < 0.0 {
        Verdict::AStronger
    } else {
        Verdict::Equal
    };
    debug!(
        "compare role={role} panel_a={:.0} panel_b={:.0} diff={diff:.3}",
        loadout_a.panel_attack, loadout_b.panel_attack
    );

    LoadoutComparison {
        role,
        damage_a,
        damage_b,
        diff,
        efficiency_pct: efficiency_pct(damage_a, damage_b),
        verdict,
        loadout_a,
        loadout_b,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub attack: f64,
    pub damage_a: f64,
    pub damage_b: f64,
    pub efficiency_pct: f64,
}

/// Sweep attack while holding every other final stat of each loadout fixed.
pub fn comparison_curve(
    shared: &SharedStats,
    comparison: &LoadoutComparison,
    attacks: &[f64],
) -> Vec<ComparisonPoint> {
    let inputs_a = comparison.loadout_a.damage_inputs(shared);
    let inputs_b = comparison.loadout_b.damage_inputs(shared);
    attacks
        .iter()
        .map(|&attack| {
            let damage_a = compute_damage(&inputs_a.with_attack(attack));
            let damage_b = compute_damage(&inputs_b.with_attack(attack));
            ComparisonPoint {
                attack,
                damage_a,
                damage_b,
                efficiency_pct: efficiency_pct(damage_a, damage_b),
            }
        })
        .collect()
}

pub fn default_comparison_curve(
    shared: &SharedStats,
    comparison: &LoadoutComparison,
) -> Vec<ComparisonPoint> {
    comparison_curve(
        shared,
        comparison,
        &linspace(0.0, DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS),
    )
}
