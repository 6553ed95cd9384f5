//! Damage sampled over attack sweeps and buff grids, the data behind the charts.

use serde::Serialize;

use crate::combat::damage::{compute_damage, DamageInputs};

pub const DEFAULT_ATTACK_MAX: f64 = 8000.0;
pub const DEFAULT_CURVE_POINTS: usize = 200;
pub const DEFAULT_SURFACE_DAMAGE_BONUS_MAX: f64 = 400.0;
pub const DEFAULT_SURFACE_CRIT_MAX: f64 = 500.0;
pub const DEFAULT_SURFACE_POINTS: usize = 50;

/// `points` evenly spaced values from `start` to `end`, both ends included.
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub attack: f64,
    pub damage: f64,
}

pub fn damage_curve(inputs: &DamageInputs, attacks: &[f64]) -> Vec<CurvePoint> {
    attacks
        .iter()
        .map(|&attack| CurvePoint {
            attack,
            damage: compute_damage(&inputs.with_attack(attack)),
        })
        .collect()
}

/// Damage over a damage-bonus × crit-damage grid. Rows follow crit damage,
/// columns follow damage bonus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageSurface {
    pub damage_bonus_pct: Vec<f64>,
    pub crit_damage_pct: Vec<f64>,
    pub damage: Vec<Vec<f64>>,
}

impl DamageSurface {
    pub fn get(&self, crit_index: usize, bonus_index: usize) -> Option<f64> {
        self.damage
            .get(crit_index)
            .and_then(|row| row.get(bonus_index))
            .copied()
    }
}

pub fn damage_surface(
    inputs: &DamageInputs,
    damage_bonus_pct: Vec<f64>,
    crit_damage_pct: Vec<f64>,
) -> DamageSurface {
    let damage = crit_damage_pct
        .iter()
        .map(|&crit| {
            damage_bonus_pct
                .iter()
                .map(|&bonus| compute_damage(&inputs.with_buffs(bonus, crit)))
                .collect()
        })
        .collect();
    DamageSurface {
        damage_bonus_pct,
        crit_damage_pct,
        damage,
    }
}

pub fn default_damage_surface(inputs: &DamageInputs) -> DamageSurface {
    damage_surface(
        inputs,
        linspace(0.0, DEFAULT_SURFACE_DAMAGE_BONUS_MAX, DEFAULT_SURFACE_POINTS),
        linspace(0.0, DEFAULT_SURFACE_CRIT_MAX, DEFAULT_SURFACE_POINTS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let values = linspace(0.0, 8000.0, 200);
        assert_eq!(values.len(), 200);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[199], 8000.0);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn surface_shape_follows_axes() {
        let surface = damage_surface(
            &DamageInputs::default(),
            linspace(0.0, 400.0, 5),
            linspace(0.0, 500.0, 3),
        );
        assert_eq!(surface.damage.len(), 3);
        assert!(surface.damage.iter().all(|row| row.len() == 5));
        // zero crit damage wipes out the whole first row
        assert!(surface.damage[0].iter().all(|&z| z == 0.0));
        assert!(surface.get(2, 4).unwrap_or(0.0) > surface.get(1, 4).unwrap_or(0.0));
    }
}
