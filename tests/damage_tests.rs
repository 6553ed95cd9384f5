use dollcalc::combat::{
    attack_term, compute_damage, damage_curve, default_damage_surface, effective_defense, linspace,
    DamageInputs, DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS,
};
use dollcalc::validate::validate_damage_inputs;
use proptest::prelude::*;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn inputs(attack: f64) -> DamageInputs {
    DamageInputs {
        attack,
        enemy_defense: 5000.0,
        defense_ignore_pct: 30.0,
        damage_bonus_pct: 10.0,
        weakness_hits: 1,
        skill_coef_pct: 250.0,
        crit_damage_pct: 120.0,
    }
}

#[test]
fn zero_attack_returns_zero_regardless_of_other_inputs() {
    for defense in [0.0, 1.0, 5000.0, 20_000.0] {
        for ignore in [0.0, 50.0, 100.0] {
            let z = compute_damage(&DamageInputs {
                attack: 0.0,
                enemy_defense: defense,
                defense_ignore_pct: ignore,
                damage_bonus_pct: 800.0,
                weakness_hits: 2,
                skill_coef_pct: 1500.0,
                crit_damage_pct: 500.0,
            });
            assert_eq!(z, 0.0, "defense={defense} ignore={ignore}");
        }
    }
}

#[test]
fn damage_increases_with_attack_for_fixed_defense() {
    let z0 = compute_damage(&inputs(0.0));
    let z1 = compute_damage(&inputs(1000.0));
    let z8 = compute_damage(&inputs(8000.0));
    assert!(z0 < z1, "{z0} !< {z1}");
    assert!(z1 < z8, "{z1} !< {z8}");
}

#[test]
fn matches_hand_computed_value() {
    // 3000² / (3000 + 5000 · 0.7) · 1.1 · 1.1 · 2.5 · 1.2
    let expected = 9_000_000.0 / 6500.0 * 1.1 * 1.1 * 2.5 * 1.2;
    approx_eq(compute_damage(&inputs(3000.0)), expected, 1e-6);
}

#[test]
fn attack_term_guards_non_positive_denominator() {
    assert_eq!(attack_term(0.0, 0.0), 0.0);
    assert_eq!(attack_term(-10.0, 5.0), 0.0);
    assert_eq!(attack_term(10.0, -20.0), 0.0);
    approx_eq(attack_term(10.0, 0.0), 10.0, 1e-12);
}

#[test]
fn effective_defense_scales_linearly_with_ignore() {
    approx_eq(effective_defense(5000.0, 0.0), 5000.0, 1e-9);
    approx_eq(effective_defense(5000.0, 30.0), 3500.0, 1e-9);
    approx_eq(effective_defense(5000.0, 100.0), 0.0, 1e-9);
}

#[test]
fn default_curve_spans_dashboard_range() {
    let attacks = linspace(0.0, DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS);
    let curve = damage_curve(&inputs(1.0), &attacks);
    assert_eq!(curve.len(), 200);
    assert_eq!(curve[0].damage, 0.0);
    assert_eq!(curve[199].attack, 8000.0);
    assert!(curve.windows(2).all(|w| w[0].damage <= w[1].damage));
}

#[test]
fn default_surface_is_fifty_by_fifty() {
    let surface = default_damage_surface(&inputs(1000.0));
    assert_eq!(surface.damage_bonus_pct.len(), 50);
    assert_eq!(surface.crit_damage_pct.len(), 50);
    assert_eq!(surface.damage.len(), 50);
    assert_eq!(surface.damage_bonus_pct[49], 400.0);
    assert_eq!(surface.crit_damage_pct[49], 500.0);
}

#[test]
fn validation_names_every_bad_field() {
    let bad = DamageInputs {
        attack: -1.0,
        enemy_defense: f64::INFINITY,
        defense_ignore_pct: 120.0,
        weakness_hits: 3,
        ..DamageInputs::default()
    };
    let err = validate_damage_inputs(&bad).unwrap_err();
    let fields: Vec<_> = err.issues().iter().map(|issue| issue.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["attack", "enemy_defense", "defense_ignore_pct", "weakness_hits"]
    );
    assert!(validate_damage_inputs(&DamageInputs::default()).is_ok());
}

proptest! {
    #[test]
    fn damage_is_monotonic_in_attack(
        low in 0.0f64..8000.0,
        delta in 1.0f64..8000.0,
        defense in 0.0f64..20_000.0,
        ignore in 0.0f64..100.0,
    ) {
        let base = DamageInputs {
            enemy_defense: defense,
            defense_ignore_pct: ignore,
            ..inputs(0.0)
        };
        let lower = compute_damage(&base.with_attack(low));
        let higher = compute_damage(&base.with_attack(low + delta));
        prop_assert!(lower <= higher);
    }

    #[test]
    fn damage_is_never_negative(
        attack in 0.0f64..10_000.0,
        defense in 0.0f64..20_000.0,
        bonus in 0.0f64..800.0,
        crit in 0.0f64..500.0,
    ) {
        let base = DamageInputs {
            enemy_defense: defense,
            ..inputs(attack)
        };
        let z = compute_damage(&base.with_buffs(bonus, crit));
        prop_assert!(z >= 0.0);
        prop_assert!(z.is_finite());
    }
}
