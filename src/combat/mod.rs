pub mod curve;
pub mod damage;
pub mod loadout;
pub mod stacking;

pub use curve::{
    damage_curve, damage_surface, default_damage_surface, linspace, CurvePoint, DamageSurface,
    DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS,
};
pub use damage::{
    attack_term, compute_damage, effective_defense, weakness_factor, DamageInputs,
    MAX_WEAKNESS_HITS, WEAKNESS_STEP,
};
pub use loadout::{
    compare_loadouts, comparison_curve, default_comparison_curve, efficiency_pct, loadout_stats,
    ComparisonPoint, LoadoutComparison, LoadoutStats, Role, SharedStats, Verdict, Weapon,
    WeaponOption, MAX_DEFENSE_IGNORE_PCT,
};
pub use stacking::{CategoryTotals, LoadoutStat, StackCategory, StatContribution, StatStacking};
