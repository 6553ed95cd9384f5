//! Range checks for everything a caller can hand to the calculators.
//!
//! Issues are collected per field so one report covers every bad input.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;

use crate::combat::{DamageInputs, SharedStats, Weapon, MAX_WEAKNESS_HITS};
use crate::optimizer::SearchRequest;
use crate::score::ScoreModel;

pub const MAX_TARGET_SCORE: u64 = 5_000_000;
pub const MAX_K: u64 = 2_000_000;
pub const MAX_K_STEP: u64 = 10_000;
pub const MAX_DAYS: u32 = 366;
pub const MAX_TOP: usize = 20;
pub const MAX_GRID_CELLS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.issues.iter_mut().find(|issue| issue.field == field) {
            Some(issue) => issue.messages.push(message),
            None => self.issues.push(ValidationIssue {
                field,
                messages: vec![message],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    pub fn check_f64(&mut self, field: &str, value: f64, range: RangeInclusive<f64>) {
        if !value.is_finite() {
            self.push(field, format!("must be a finite number, got {value}"));
        } else if !range.contains(&value) {
            self.push(
                field,
                format!(
                    "must be between {} and {}, got {value}",
                    range.start(),
                    range.end()
                ),
            );
        }
    }

    pub fn check_u64(&mut self, field: &str, value: u64, range: RangeInclusive<u64>) {
        if !range.contains(&value) {
            self.push(
                field,
                format!(
                    "must be between {} and {}, got {value}",
                    range.start(),
                    range.end()
                ),
            );
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { report: self })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {report}")]
pub struct ValidationError {
    pub report: ValidationReport,
}

impl ValidationError {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.report.issues
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.messages.join(", "))?;
        }
        Ok(())
    }
}

/// Free-form formula inputs: finite, non-negative, ignore at most 100%.
pub fn validate_damage_inputs(inputs: &DamageInputs) -> Result<(), ValidationError> {
    let mut report = ValidationReport::default();
    let open = 0.0..=f64::MAX;
    report.check_f64("attack", inputs.attack, open.clone());
    report.check_f64("enemy_defense", inputs.enemy_defense, open.clone());
    report.check_f64("defense_ignore_pct", inputs.defense_ignore_pct, 0.0..=100.0);
    report.check_f64("damage_bonus_pct", inputs.damage_bonus_pct, open.clone());
    report.check_u64(
        "weakness_hits",
        u64::from(inputs.weakness_hits),
        0..=u64::from(MAX_WEAKNESS_HITS),
    );
    report.check_f64("skill_coef_pct", inputs.skill_coef_pct, open.clone());
    report.check_f64("crit_damage_pct", inputs.crit_damage_pct, open);
    report.into_result()
}

pub fn validate_shared_stats(stats: &SharedStats) -> Result<(), ValidationError> {
    let mut report = ValidationReport::default();
    push_shared_stats(&mut report, stats);
    report.into_result()
}

fn push_shared_stats(report: &mut ValidationReport, stats: &SharedStats) {
    report.check_f64("enemy_defense", stats.enemy_defense, 0.0..=20_000.0);
    report.check_f64("base_attack", stats.base_attack, 500.0..=3000.0);
    report.check_f64("base_attack_bonus_pct", stats.base_attack_bonus_pct, 0.0..=200.0);
    report.check_f64("defense_ignore_pct", stats.defense_ignore_pct, 0.0..=100.0);
    report.check_u64(
        "weakness_hits",
        u64::from(stats.weakness_hits),
        0..=u64::from(MAX_WEAKNESS_HITS),
    );
    report.check_f64("skill_coef_pct", stats.skill_coef_pct, 0.0..=1500.0);
    report.check_f64("damage_bonus_pct", stats.damage_bonus_pct, 0.0..=800.0);
    report.check_f64("crit_damage_pct", stats.crit_damage_pct, 0.0..=500.0);
}

fn push_weapon(report: &mut ValidationReport, prefix: &str, weapon: &Weapon) {
    report.check_f64(&format!("{prefix}.attack"), weapon.attack, 200.0..=390.0);
    report.check_f64(
        &format!("{prefix}.defense_ignore_pct"),
        weapon.defense_ignore_pct,
        0.0..=20.0,
    );
    report.check_f64(
        &format!("{prefix}.damage_bonus_pct"),
        weapon.damage_bonus_pct,
        0.0..=100.0,
    );
}

pub fn validate_comparison(
    stats: &SharedStats,
    weapon_a: &Weapon,
    weapon_b: &Weapon,
) -> Result<(), ValidationError> {
    let mut report = ValidationReport::default();
    push_shared_stats(&mut report, stats);
    push_weapon(&mut report, "weapon_a", weapon_a);
    push_weapon(&mut report, "weapon_b", weapon_b);
    report.into_result()
}

/// Number of `(k, n)` cells a search would enumerate.
pub fn grid_cells(request: &SearchRequest, model: &ScoreModel) -> usize {
    if request.k_step == 0 || request.k_max < request.k_min {
        return 0;
    }
    let k_values = ((request.k_max - request.k_min) / request.k_step + 1) as usize;
    k_values.saturating_mul(model.sessions_per_day.len())
}

pub fn validate_search(request: &SearchRequest, model: &ScoreModel) -> Result<(), ValidationError> {
    let mut report = ValidationReport::default();
    report.check_u64("target", request.target, 0..=MAX_TARGET_SCORE);
    report.check_u64("k_min", request.k_min, 0..=MAX_K);
    if request.k_max <= request.k_min {
        report.push(
            "k_max",
            format!(
                "must be greater than k_min ({}), got {}",
                request.k_min, request.k_max
            ),
        );
    } else {
        report.check_u64("k_max", request.k_max, 0..=MAX_K);
    }
    report.check_u64("k_step", request.k_step, 1..=MAX_K_STEP);
    report.check_u64("top", request.top as u64, 1..=MAX_TOP as u64);
    report.check_u64("days", u64::from(request.days), 1..=u64::from(MAX_DAYS));
    if report.is_empty() {
        let cells = grid_cells(request, model);
        if cells > MAX_GRID_CELLS {
            report.push(
                "k_step",
                format!("search grid has {cells} cells, limit is {MAX_GRID_CELLS}; raise k_step or narrow the k range"),
            );
        }
    }
    report.into_result()
}

/// One `(k, n, days)` point of the score model; `n` must be a session count
/// the model enumerates.
pub fn validate_score_query(
    k: u64,
    n: u32,
    days: u32,
    model: &ScoreModel,
) -> Result<(), ValidationError> {
    let mut report = ValidationReport::default();
    report.check_u64("k", k, 0..=MAX_K);
    let sessions = model.sessions_per_day;
    report.check_u64("n", u64::from(n), u64::from(sessions.min)..=u64::from(sessions.max));
    report.check_u64("days", u64::from(days), 1..=u64::from(MAX_DAYS));
    report.into_result()
}
