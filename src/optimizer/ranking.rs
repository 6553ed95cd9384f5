use serde::Serialize;

use crate::score::ScoreBreakdown;

/// One `(k, n)` cell of the search grid, scored against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// `|model_score - target|`.
    pub diff: u64,
    pub k: u64,
    pub n: u32,
    pub model_score: u64,
    pub accumulated: u64,
    pub milestone_bonus: u64,
    pub session_bonus: u64,
}

impl Candidate {
    pub fn from_breakdown(breakdown: &ScoreBreakdown, target: u64) -> Self {
        Self {
            diff: breakdown.total.abs_diff(target),
            k: breakdown.k,
            n: breakdown.n,
            model_score: breakdown.total,
            accumulated: breakdown.accumulated,
            milestone_bonus: breakdown.milestone_bonus,
            session_bonus: breakdown.session_bonus,
        }
    }
}

/// Sort by ascending difference and keep the first `top`.
///
/// The sort is stable: equal differences stay in grid order (k, then n).
pub fn rank_candidates(mut candidates: Vec<Candidate>, top: usize) -> Vec<Candidate> {
    candidates.sort_by_key(|candidate| candidate.diff);
    candidates.truncate(top);
    candidates
}
