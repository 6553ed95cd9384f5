//! Activity score model.
//!
//! A player's event score is modelled as
//!
//! ```text
//! score = base + m(k) + a(P),   P = days · k · n
//! ```
//!
//! where `k` is the average score of one activity session, `n` the number of
//! sessions per day, `m(k)` the per-session step bonus and `a(P)` the sum of
//! every accumulated-points milestone reached.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_SCORE: u64 = 590;
pub const DEFAULT_DAYS: u32 = 8;

const DEFAULT_MILESTONES: [(u64, &[u64]); 5] = [
    (40, &[900, 1800, 2700]),
    (100, &[4500, 9000, 15000, 24000, 36000]),
    (160, &[45000, 60000, 72000, 90000]),
    (2000, &[126000, 180000, 240000, 330000]),
    (
        300,
        &[
            375000, 420000, 480000, 540000, 600000, 675000, 788000, 900000, 1050000, 1200000,
            1350000,
        ],
    ),
];

/// Bonus paid once for every threshold the accumulated points reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTier {
    pub bonus: u64,
    pub thresholds: Vec<u64>,
}

impl MilestoneTier {
    pub fn reached(&self, accumulated: u64) -> usize {
        self.thresholds.iter().filter(|&&t| accumulated >= t).count()
    }
}

/// `m(k)`: nothing below `floor`, `flat` up to and including `ceiling`,
/// then one more point per `step` above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionBonus {
    pub floor: u64,
    pub flat: u64,
    pub ceiling: u64,
    pub step: u64,
}

impl Default for SessionBonus {
    fn default() -> Self {
        Self {
            floor: 3800,
            flat: 27,
            ceiling: 4800,
            step: 80,
        }
    }
}

impl SessionBonus {
    pub fn value(&self, k: u64) -> u64 {
        if k < self.floor {
            return 0;
        }
        if k <= self.ceiling || self.step == 0 {
            return self.flat;
        }
        self.flat.saturating_add((k - self.ceiling) / self.step)
    }
}

/// Inclusive range of sessions per day the search enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRange {
    pub min: u32,
    pub max: u32,
}

impl Default for SessionRange {
    fn default() -> Self {
        Self { min: 1, max: 30 }
    }
}

impl SessionRange {
    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreModel {
    pub base_score: u64,
    pub days: u32,
    pub sessions_per_day: SessionRange,
    pub session_bonus: SessionBonus,
    pub milestones: Vec<MilestoneTier>,
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self {
            base_score: DEFAULT_BASE_SCORE,
            days: DEFAULT_DAYS,
            sessions_per_day: SessionRange::default(),
            session_bonus: SessionBonus::default(),
            milestones: DEFAULT_MILESTONES
                .iter()
                .map(|(bonus, thresholds)| MilestoneTier {
                    bonus: *bonus,
                    thresholds: thresholds.to_vec(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub k: u64,
    pub n: u32,
    pub days: u32,
    /// `P = days · k · n`.
    pub accumulated: u64,
    /// `a(P)`.
    pub milestone_bonus: u64,
    /// `m(k)`.
    pub session_bonus: u64,
    pub total: u64,
}

impl ScoreModel {
    /// The built-in model, shared.
    pub fn standard() -> &'static ScoreModel {
        static STANDARD: OnceLock<ScoreModel> = OnceLock::new();
        STANDARD.get_or_init(ScoreModel::default)
    }

    pub fn session_bonus(&self, k: u64) -> u64 {
        self.session_bonus.value(k)
    }

    pub fn milestone_bonus(&self, accumulated: u64) -> u64 {
        self.milestones
            .iter()
            .map(|tier| tier.bonus.saturating_mul(tier.reached(accumulated) as u64))
            .fold(0, u64::saturating_add)
    }

    pub fn breakdown(&self, k: u64, n: u32, days: u32) -> ScoreBreakdown {
        let accumulated = accumulated_points(k, n, days);
        let milestone_bonus = self.milestone_bonus(accumulated);
        let session_bonus = self.session_bonus(k);
        ScoreBreakdown {
            k,
            n,
            days,
            accumulated,
            milestone_bonus,
            session_bonus,
            total: self
                .base_score
                .saturating_add(session_bonus)
                .saturating_add(milestone_bonus),
        }
    }

    /// Highest score the milestone table can ever pay out on top of base and `m(k)`.
    pub fn max_milestone_bonus(&self) -> u64 {
        self.milestones
            .iter()
            .map(|tier| tier.bonus.saturating_mul(tier.thresholds.len() as u64))
            .fold(0, u64::saturating_add)
    }
}

/// `P = days · k · n`, pinned at `u64::MAX` instead of wrapping.
pub fn accumulated_points(k: u64, n: u32, days: u32) -> u64 {
    u64::from(days)
        .saturating_mul(k)
        .saturating_mul(u64::from(n))
}

/// `m(k)` under the built-in model.
pub fn session_bonus(k: u64) -> u64 {
    ScoreModel::standard().session_bonus(k)
}

/// `a(P)` under the built-in model.
pub fn milestone_bonus(accumulated: u64) -> u64 {
    ScoreModel::standard().milestone_bonus(accumulated)
}

/// Full model score for one `(k, n)` under the built-in model.
pub fn model_total_score(k: u64, n: u32, days: u32) -> ScoreBreakdown {
    ScoreModel::standard().breakdown(k, n, days)
}
