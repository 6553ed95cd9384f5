//! Closed-form hit damage.
//!
//! ```text
//! z = atk² / (atk + def · (1 − ignore)) · (1 + dmg) · (1 + 0.1 · weak) · skill · crit
//! ```
//!
//! Every percentage input is in percent units (30.0 means 30%).

use serde::{Deserialize, Serialize};

/// Damage multiplier added per weak point hit.
pub const WEAKNESS_STEP: f64 = 0.1;

/// Upper bound for the number of weak points a single hit can exploit.
pub const MAX_WEAKNESS_HITS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageInputs {
    pub attack: f64,
    pub enemy_defense: f64,
    pub defense_ignore_pct: f64,
    pub damage_bonus_pct: f64,
    pub weakness_hits: u32,
    pub skill_coef_pct: f64,
    pub crit_damage_pct: f64,
}

impl Default for DamageInputs {
    fn default() -> Self {
        Self {
            attack: 1000.0,
            enemy_defense: 1000.0,
            defense_ignore_pct: 50.0,
            damage_bonus_pct: 100.0,
            weakness_hits: 0,
            skill_coef_pct: 100.0,
            crit_damage_pct: 100.0,
        }
    }
}

impl DamageInputs {
    pub fn with_attack(self, attack: f64) -> Self {
        Self { attack, ..self }
    }

    pub fn with_buffs(self, damage_bonus_pct: f64, crit_damage_pct: f64) -> Self {
        Self {
            damage_bonus_pct,
            crit_damage_pct,
            ..self
        }
    }
}

/// Defense left after ignore, with the ignore share clamped to [0, 1].
pub fn effective_defense(enemy_defense: f64, defense_ignore_pct: f64) -> f64 {
    let ignore = (defense_ignore_pct * 0.01).clamp(0.0, 1.0);
    enemy_defense * (1.0 - ignore)
}

pub fn weakness_factor(weakness_hits: u32) -> f64 {
    1.0 + WEAKNESS_STEP * f64::from(weakness_hits)
}

/// Attack-versus-defense term `atk² / (atk + def')`.
///
/// Returns 0 for non-positive attack and for a non-positive denominator.
pub fn attack_term(attack: f64, effective_defense: f64) -> f64 {
    if attack <= 0.0 {
        return 0.0;
    }
    let denominator = attack + effective_defense;
    if denominator <= 0.0 {
        return 0.0;
    }
    attack * attack / denominator
}

pub fn compute_damage(inputs: &DamageInputs) -> f64 {
    let defense = effective_defense(inputs.enemy_defense, inputs.defense_ignore_pct);
    attack_term(inputs.attack, defense)
        * (1.0 + inputs.damage_bonus_pct * 0.01)
        * weakness_factor(inputs.weakness_hits)
        * (inputs.skill_coef_pct * 0.01)
        * (inputs.crit_damage_pct * 0.01)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn zero_attack_is_zero_damage() {
        let inputs = DamageInputs {
            attack: 0.0,
            enemy_defense: 0.0,
            defense_ignore_pct: 100.0,
            ..DamageInputs::default()
        };
        assert_eq!(compute_damage(&inputs), 0.0);
    }

    #[test]
    fn full_ignore_reduces_to_attack_times_multipliers() {
        let inputs = DamageInputs {
            attack: 2000.0,
            enemy_defense: 5000.0,
            defense_ignore_pct: 100.0,
            damage_bonus_pct: 0.0,
            weakness_hits: 0,
            skill_coef_pct: 100.0,
            crit_damage_pct: 100.0,
        };
        approx_eq(compute_damage(&inputs), 2000.0, 1e-9);
    }

    #[test]
    fn dashboard_default_value() {
        // 1000² / (1000 + 500) · 2 · 1 · 1 · 1
        approx_eq(compute_damage(&DamageInputs::default()), 1333.333_333_333, 1e-6);
    }

    #[test]
    fn weakness_factor_steps_by_a_tenth() {
        approx_eq(weakness_factor(0), 1.0, 1e-12);
        approx_eq(weakness_factor(1), 1.1, 1e-12);
        approx_eq(weakness_factor(2), 1.2, 1e-12);
    }

    #[test]
    fn ignore_above_hundred_is_clamped() {
        approx_eq(effective_defense(4000.0, 150.0), 0.0, 1e-12);
        approx_eq(effective_defense(4000.0, -10.0), 4000.0, 1e-12);
    }
}
