use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use serde::Serialize;

use crate::combat::curve::{
    DEFAULT_SURFACE_CRIT_MAX, DEFAULT_SURFACE_DAMAGE_BONUS_MAX, DEFAULT_SURFACE_POINTS,
};
use crate::combat::{
    compare_loadouts, compute_damage, damage_curve, damage_surface, default_comparison_curve,
    linspace, ComparisonPoint, DamageInputs, LoadoutComparison, Role, SharedStats, Weapon,
    WeaponOption, DEFAULT_ATTACK_MAX, DEFAULT_CURVE_POINTS,
};
use crate::config::{resolve_config, AppConfig};
use crate::export_csv::{records_to_string, surface_to_string};
use crate::optimizer::{search_best_k_n, SearchRequest};
use crate::validate::{
    validate_comparison, validate_damage_inputs, validate_score_query, ValidationReport,
    MAX_GRID_CELLS,
};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "dollcalc", version, about = "Damage, loadout and activity score calculators")]
pub struct Cli {
    /// YAML config file; falls back to $DOLLCALC_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the damage formula once.
    Damage(DamageArgs),
    /// Damage over an attack sweep.
    Curve(CurveArgs),
    /// Damage over a damage-bonus x crit-damage grid.
    Surface(SurfaceArgs),
    /// Compare two weapons on the same doll.
    Compare(CompareArgs),
    /// Score breakdown for one (k, n).
    Score(ScoreArgs),
    /// Find the (k, n) pairs whose model score is closest to a target.
    Search(SearchArgs),
    /// Print the effective configuration as YAML.
    Config,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DamageArgs {
    #[arg(long)]
    pub attack: Option<f64>,
    /// Enemy defense.
    #[arg(long)]
    pub defense: Option<f64>,
    /// Defense ignore, percent.
    #[arg(long)]
    pub defense_ignore: Option<f64>,
    /// Damage increase, percent.
    #[arg(long)]
    pub damage_bonus: Option<f64>,
    /// Weak points hit (0-2).
    #[arg(long)]
    pub weakness: Option<u32>,
    /// Skill coefficient, percent.
    #[arg(long)]
    pub skill: Option<f64>,
    /// Crit damage, percent.
    #[arg(long)]
    pub crit_damage: Option<f64>,
}

impl DamageArgs {
    pub fn apply(&self, base: DamageInputs) -> DamageInputs {
        DamageInputs {
            attack: self.attack.unwrap_or(base.attack),
            enemy_defense: self.defense.unwrap_or(base.enemy_defense),
            defense_ignore_pct: self.defense_ignore.unwrap_or(base.defense_ignore_pct),
            damage_bonus_pct: self.damage_bonus.unwrap_or(base.damage_bonus_pct),
            weakness_hits: self.weakness.unwrap_or(base.weakness_hits),
            skill_coef_pct: self.skill.unwrap_or(base.skill_coef_pct),
            crit_damage_pct: self.crit_damage.unwrap_or(base.crit_damage_pct),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CurveArgs {
    #[command(flatten)]
    pub inputs: DamageArgs,
    #[arg(long, default_value_t = 0.0)]
    pub from: f64,
    #[arg(long, default_value_t = DEFAULT_ATTACK_MAX)]
    pub to: f64,
    #[arg(long, default_value_t = DEFAULT_CURVE_POINTS)]
    pub points: usize,
}

#[derive(Debug, Clone, Args)]
pub struct SurfaceArgs {
    #[command(flatten)]
    pub inputs: DamageArgs,
    #[arg(long, default_value_t = DEFAULT_SURFACE_DAMAGE_BONUS_MAX)]
    pub bonus_max: f64,
    #[arg(long, default_value_t = DEFAULT_SURFACE_CRIT_MAX)]
    pub crit_max: f64,
    /// Samples per axis.
    #[arg(long, default_value_t = DEFAULT_SURFACE_POINTS)]
    pub points: usize,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CompareArgs {
    /// Enemy defense.
    #[arg(long)]
    pub defense: Option<f64>,
    #[arg(long)]
    pub base_attack: Option<f64>,
    /// Base attack bonus, percent.
    #[arg(long)]
    pub base_attack_bonus: Option<f64>,
    /// Defense ignore from outside the weapon, percent.
    #[arg(long)]
    pub defense_ignore: Option<f64>,
    #[arg(long)]
    pub weakness: Option<u32>,
    #[arg(long)]
    pub skill: Option<f64>,
    /// Damage increase from outside the weapon, percent.
    #[arg(long)]
    pub damage_bonus: Option<f64>,
    /// Crit damage from outside the weapon, percent.
    #[arg(long)]
    pub crit_damage: Option<f64>,
    /// sentinel, vanguard, support or bulwark.
    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub a_attack: Option<f64>,
    /// attack (+15% attack) or crit (+25% crit damage).
    #[arg(long)]
    pub a_option: Option<WeaponOption>,
    #[arg(long)]
    pub a_defense_ignore: Option<f64>,
    #[arg(long)]
    pub a_damage_bonus: Option<f64>,

    #[arg(long)]
    pub b_attack: Option<f64>,
    #[arg(long)]
    pub b_option: Option<WeaponOption>,
    #[arg(long)]
    pub b_defense_ignore: Option<f64>,
    #[arg(long)]
    pub b_damage_bonus: Option<f64>,

    /// Include the attack sweep of both loadouts.
    #[arg(long)]
    pub curve: bool,
}

impl CompareArgs {
    pub fn shared(&self, base: SharedStats) -> SharedStats {
        SharedStats {
            enemy_defense: self.defense.unwrap_or(base.enemy_defense),
            base_attack: self.base_attack.unwrap_or(base.base_attack),
            base_attack_bonus_pct: self.base_attack_bonus.unwrap_or(base.base_attack_bonus_pct),
            defense_ignore_pct: self.defense_ignore.unwrap_or(base.defense_ignore_pct),
            weakness_hits: self.weakness.unwrap_or(base.weakness_hits),
            skill_coef_pct: self.skill.unwrap_or(base.skill_coef_pct),
            damage_bonus_pct: self.damage_bonus.unwrap_or(base.damage_bonus_pct),
            crit_damage_pct: self.crit_damage.unwrap_or(base.crit_damage_pct),
        }
    }

    pub fn weapon_a(&self, base: Weapon) -> Weapon {
        Weapon {
            attack: self.a_attack.unwrap_or(base.attack),
            option: self.a_option.unwrap_or(base.option),
            defense_ignore_pct: self.a_defense_ignore.unwrap_or(base.defense_ignore_pct),
            damage_bonus_pct: self.a_damage_bonus.unwrap_or(base.damage_bonus_pct),
        }
    }

    pub fn weapon_b(&self, base: Weapon) -> Weapon {
        Weapon {
            attack: self.b_attack.unwrap_or(base.attack),
            option: self.b_option.unwrap_or(base.option),
            defense_ignore_pct: self.b_defense_ignore.unwrap_or(base.defense_ignore_pct),
            damage_bonus_pct: self.b_damage_bonus.unwrap_or(base.damage_bonus_pct),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScoreArgs {
    /// Average score per activity session.
    #[arg(long)]
    pub k: u64,
    /// Sessions per day.
    #[arg(long)]
    pub n: u32,
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Observed total score to explain.
    #[arg(long)]
    pub target: Option<u64>,
    #[arg(long)]
    pub k_min: Option<u64>,
    #[arg(long)]
    pub k_max: Option<u64>,
    #[arg(long)]
    pub k_step: Option<u64>,
    #[arg(long)]
    pub days: Option<u32>,
    /// How many candidates to return.
    #[arg(long)]
    pub top: Option<usize>,
}

impl SearchArgs {
    pub fn apply(&self, base: SearchRequest) -> SearchRequest {
        SearchRequest {
            target: self.target.unwrap_or(base.target),
            k_min: self.k_min.unwrap_or(base.k_min),
            k_max: self.k_max.unwrap_or(base.k_max),
            k_step: self.k_step.unwrap_or(base.k_step),
            days: self.days.unwrap_or(base.days),
            top: self.top.unwrap_or(base.top),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct DamageRow {
    attack: f64,
    enemy_defense: f64,
    defense_ignore_pct: f64,
    damage_bonus_pct: f64,
    weakness_hits: u32,
    skill_coef_pct: f64,
    crit_damage_pct: f64,
    damage: f64,
}

impl DamageRow {
    fn new(inputs: &DamageInputs, damage: f64) -> Self {
        Self {
            attack: inputs.attack,
            enemy_defense: inputs.enemy_defense,
            defense_ignore_pct: inputs.defense_ignore_pct,
            damage_bonus_pct: inputs.damage_bonus_pct,
            weakness_hits: inputs.weakness_hits,
            skill_coef_pct: inputs.skill_coef_pct,
            crit_damage_pct: inputs.crit_damage_pct,
            damage,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompareOutput<'a> {
    status: &'static str,
    shared: &'a SharedStats,
    weapon_a: &'a Weapon,
    weapon_b: &'a Weapon,
    #[serde(flatten)]
    comparison: &'a LoadoutComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<&'a [ComparisonPoint]>,
}

/// Parse `args` (program name first), run the command and print its output.
/// Returns the process exit code.
pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    match execute(&cli) {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// Run a parsed command and return what it would print.
pub fn execute(cli: &Cli) -> Result<String> {
    let config = resolve_config(cli.config.as_deref())?;
    debug!("running {:?} with format {:?}", cli.command, cli.format);
    match &cli.command {
        Command::Damage(args) => handle_damage(&config, args, cli.format),
        Command::Curve(args) => handle_curve(&config, args, cli.format),
        Command::Surface(args) => handle_surface(&config, args, cli.format),
        Command::Compare(args) => handle_compare(&config, args, cli.format),
        Command::Score(args) => handle_score(&config, args, cli.format),
        Command::Search(args) => handle_search(&config, args, cli.format),
        Command::Config => Ok(config.to_yaml()?),
    }
}

fn handle_damage(config: &AppConfig, args: &DamageArgs, format: OutputFormat) -> Result<String> {
    let inputs = args.apply(config.defaults.damage);
    validate_damage_inputs(&inputs)?;
    let row = DamageRow::new(&inputs, compute_damage(&inputs));

    match format {
        OutputFormat::Json => Ok(pretty_json(&serde_json::json!({
            "status": "ok",
            "inputs": inputs,
            "damage": row.damage,
        }))?),
        OutputFormat::Csv => Ok(records_to_string(&[row])?),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "attack\tdefense\tdefense_ignore\tdamage_bonus\tweakness\tskill\tcrit_damage\tdamage"
            );
            let _ = writeln!(
                out,
                "{:.0}\t{:.0}\t{:.1}\t{:.1}\t{}\t{:.1}\t{:.1}\t{:.2}",
                row.attack,
                row.enemy_defense,
                row.defense_ignore_pct,
                row.damage_bonus_pct,
                row.weakness_hits,
                row.skill_coef_pct,
                row.crit_damage_pct,
                row.damage
            );
            Ok(out)
        }
    }
}

fn check_points(report: &mut ValidationReport, field: &str, points: usize) {
    if points == 0 || points > 10_000 {
        report.push(field, format!("must be between 1 and 10000, got {points}"));
    }
}

fn handle_curve(config: &AppConfig, args: &CurveArgs, format: OutputFormat) -> Result<String> {
    let inputs = args.inputs.apply(config.defaults.damage);
    validate_damage_inputs(&inputs)?;
    let mut report = ValidationReport::default();
    report.check_f64("from", args.from, 0.0..=f64::MAX);
    report.check_f64("to", args.to, args.from.max(0.0)..=f64::MAX);
    check_points(&mut report, "points", args.points);
    report.into_result()?;

    let points = damage_curve(&inputs, &linspace(args.from, args.to, args.points));
    match format {
        OutputFormat::Json => Ok(pretty_json(&serde_json::json!({
            "status": "ok",
            "inputs": inputs,
            "current": { "attack": inputs.attack, "damage": compute_damage(&inputs) },
            "points": points,
        }))?),
        OutputFormat::Csv => Ok(records_to_string(&points)?),
        OutputFormat::Table => {
            let mut out = String::from("attack\tdamage\n");
            for point in &points {
                let _ = writeln!(out, "{:.1}\t{:.4}", point.attack, point.damage);
            }
            Ok(out)
        }
    }
}

fn handle_surface(config: &AppConfig, args: &SurfaceArgs, format: OutputFormat) -> Result<String> {
    let inputs = args.inputs.apply(config.defaults.damage);
    validate_damage_inputs(&inputs)?;
    let mut report = ValidationReport::default();
    report.check_f64("bonus_max", args.bonus_max, 0.0..=f64::MAX);
    report.check_f64("crit_max", args.crit_max, 0.0..=f64::MAX);
    check_points(&mut report, "points", args.points);
    let cells = args.points.saturating_mul(args.points);
    if cells > MAX_GRID_CELLS {
        report.push("points", format!("surface has {cells} cells, limit is {MAX_GRID_CELLS}"));
    }
    report.into_result()?;

    let surface = damage_surface(
        &inputs,
        linspace(0.0, args.bonus_max, args.points),
        linspace(0.0, args.crit_max, args.points),
    );
    match format {
        OutputFormat::Json => Ok(pretty_json(&serde_json::json!({
            "status": "ok",
            "inputs": inputs,
            "current": {
                "damage_bonus_pct": inputs.damage_bonus_pct,
                "crit_damage_pct": inputs.crit_damage_pct,
                "damage": compute_damage(&inputs),
            },
            "surface": surface,
        }))?),
        OutputFormat::Csv => Ok(surface_to_string(&surface)?),
        OutputFormat::Table => {
            let mut out = String::from("crit\\bonus");
            for bonus in &surface.damage_bonus_pct {
                let _ = write!(out, "\t{bonus:.1}");
            }
            out.push('\n');
            for (crit, row) in surface.crit_damage_pct.iter().zip(&surface.damage) {
                let _ = write!(out, "{crit:.1}");
                for damage in row {
                    let _ = write!(out, "\t{damage:.2}");
                }
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn handle_compare(config: &AppConfig, args: &CompareArgs, format: OutputFormat) -> Result<String> {
    let defaults = &config.defaults;
    let shared = args.shared(defaults.shared);
    let role = args.role.unwrap_or(defaults.role);
    let weapon_a = args.weapon_a(defaults.weapon_a);
    let weapon_b = args.weapon_b(defaults.weapon_b);
    validate_comparison(&shared, &weapon_a, &weapon_b)?;

    let comparison = compare_loadouts(&shared, role, &weapon_a, &weapon_b);
    let curve = (args.curve || format == OutputFormat::Csv)
        .then(|| default_comparison_curve(&shared, &comparison));

    match format {
        OutputFormat::Json => Ok(pretty_json(&CompareOutput {
            status: "ok",
            shared: &shared,
            weapon_a: &weapon_a,
            weapon_b: &weapon_b,
            comparison: &comparison,
            curve: curve.as_deref(),
        })?),
        OutputFormat::Csv => Ok(records_to_string(curve.as_deref().unwrap_or_default())?),
        OutputFormat::Table => {
            let mut out = String::from(
                "loadout\tpanel_attack\tdamage_bonus\tcrit_damage\tdefense_ignore\tdamage\n",
            );
            for (name, stats, damage) in [
                ("A", &comparison.loadout_a, comparison.damage_a),
                ("B", &comparison.loadout_b, comparison.damage_b),
            ] {
                let _ = writeln!(
                    out,
                    "{name}\t{:.0}\t{:.1}\t{:.1}\t{:.1}\t{damage:.2}",
                    stats.panel_attack,
                    stats.damage_bonus_pct,
                    stats.crit_damage_pct,
                    stats.defense_ignore_pct
                );
            }
            let _ = writeln!(
                out,
                "diff\t{:.2}\tefficiency_pct\t{:.2}",
                comparison.diff, comparison.efficiency_pct
            );
            Ok(out)
        }
    }
}

fn handle_score(config: &AppConfig, args: &ScoreArgs, format: OutputFormat) -> Result<String> {
    let model = &config.score_model;
    let days = args.days.unwrap_or(model.days);
    validate_score_query(args.k, args.n, days, model)?;

    let breakdown = model.breakdown(args.k, args.n, days);
    match format {
        OutputFormat::Json => Ok(pretty_json(&serde_json::json!({
            "status": "ok",
            "base_score": model.base_score,
            "breakdown": breakdown,
        }))?),
        OutputFormat::Csv => Ok(records_to_string(&[breakdown])?),
        OutputFormat::Table => {
            let mut out = String::from("k\tn\tdays\tP\ta(P)\tm(k)\ttotal\n");
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                breakdown.k,
                breakdown.n,
                breakdown.days,
                breakdown.accumulated,
                breakdown.milestone_bonus,
                breakdown.session_bonus,
                breakdown.total
            );
            Ok(out)
        }
    }
}

fn handle_search(config: &AppConfig, args: &SearchArgs, format: OutputFormat) -> Result<String> {
    let request = args.apply(config.defaults.search.request(config.score_model.days));
    let outcome = search_best_k_n(&request, &config.score_model)?;

    match format {
        OutputFormat::Json => Ok(pretty_json(&serde_json::json!({
            "status": "ok",
            "request": outcome.request,
            "cells_scanned": outcome.cells_scanned,
            "best": outcome.best(),
            "candidates": outcome.candidates,
        }))?),
        OutputFormat::Csv => Ok(records_to_string(&outcome.candidates)?),
        OutputFormat::Table => {
            let mut out = String::from("rank\tdiff\tk\tn\tP\ta(P)\tm(k)\tmodel_score\n");
            for (rank, candidate) in outcome.candidates.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    rank + 1,
                    candidate.diff,
                    candidate.k,
                    candidate.n,
                    candidate.accumulated,
                    candidate.milestone_bonus,
                    candidate.session_bonus,
                    candidate.model_score
                );
            }
            Ok(out)
        }
    }
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value).map(|mut payload| {
        payload.push('\n');
        payload
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn damage_flags_override_defaults() {
        let cli = parse(&["dollcalc", "damage", "--attack", "2000", "--weakness", "2"]);
        let Command::Damage(args) = cli.command else {
            panic!("expected damage command");
        };
        let inputs = args.apply(DamageInputs::default());
        assert_eq!(inputs.attack, 2000.0);
        assert_eq!(inputs.weakness_hits, 2);
        assert_eq!(inputs.enemy_defense, DamageInputs::default().enemy_defense);
    }

    #[test]
    fn compare_parses_role_and_options() {
        let cli = parse(&[
            "dollcalc", "compare", "--role", "vanguard", "--a-option", "crit", "--b-attack", "300",
        ]);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(args.role, Some(Role::Vanguard));
        assert_eq!(args.weapon_a(Weapon::default()).option, WeaponOption::CritDamage);
        assert_eq!(args.weapon_b(Weapon::default()).attack, 300.0);
    }

    #[test]
    fn format_is_global() {
        let cli = parse(&["dollcalc", "search", "--target", "5000", "--format", "csv"]);
        assert_eq!(cli.format, OutputFormat::Csv);
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        assert!(Cli::try_parse_from(["dollcalc", "compare", "--role", "medic"]).is_err());
    }

    #[test]
    fn score_table_has_header_and_row() {
        let cli = parse(&["dollcalc", "score", "--k", "3800", "--n", "1", "--format", "table"]);
        let output = execute(&cli).expect("score should run");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3800\t1\t8\t30400\t520\t27\t1137");
    }
}
