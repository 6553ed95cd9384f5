//! Brute-force search for the activity parameters behind an observed score.
//!
//! Every `k` in `[k_min, k_max]` (stepped by `k_step`) is paired with every
//! sessions-per-day count of the model; each cell is scored and the cells
//! closest to the target are returned. No pruning.

pub mod ranking;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::score::{ScoreModel, DEFAULT_DAYS};
use crate::validate::{validate_search, ValidationError};

pub use ranking::{rank_candidates, Candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub target: u64,
    pub k_min: u64,
    pub k_max: u64,
    pub k_step: u64,
    pub days: u32,
    pub top: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            target: 5000,
            k_min: 3800,
            k_max: 50_000,
            k_step: 20,
            days: DEFAULT_DAYS,
            top: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub request: SearchRequest,
    pub cells_scanned: usize,
    pub candidates: Vec<Candidate>,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Step through `[k_min, k_max]`; a zero step yields nothing.
pub fn k_values(k_min: u64, k_max: u64, k_step: u64) -> impl Iterator<Item = u64> {
    let step = usize::try_from(k_step).unwrap_or(usize::MAX);
    let empty = k_step == 0 || k_max < k_min;
    (k_min..=k_max).step_by(step.max(1)).take_while(move |_| !empty)
}

/// Score every cell of the grid without validation or ranking.
pub fn scan_grid(request: &SearchRequest, model: &ScoreModel) -> Vec<Candidate> {
    let sessions = model.sessions_per_day;
    let mut cells = Vec::new();
    for k in k_values(request.k_min, request.k_max, request.k_step) {
        for n in sessions.min..=sessions.max {
            let breakdown = model.breakdown(k, n, request.days);
            cells.push(Candidate::from_breakdown(&breakdown, request.target));
        }
    }
    cells
}

/// Validate, scan the grid and return the `top` closest candidates.
pub fn search_best_k_n(
    request: &SearchRequest,
    model: &ScoreModel,
) -> Result<SearchOutcome, ValidationError> {
    validate_search(request, model)?;
    debug!(
        "searching k={}..={} step {} over n={}..={} for target {}",
        request.k_min,
        request.k_max,
        request.k_step,
        model.sessions_per_day.min,
        model.sessions_per_day.max,
        request.target
    );

    let cells = scan_grid(request, model);
    let cells_scanned = cells.len();
    let candidates = rank_candidates(cells, request.top);

    match candidates.first() {
        Some(best) => info!(
            "scanned {cells_scanned} cells, best k={} n={} score={} diff={}",
            best.k, best.n, best.model_score, best.diff
        ),
        None => warn!("search grid was empty; check the k range and step"),
    }

    Ok(SearchOutcome {
        request: *request,
        cells_scanned,
        candidates,
    })
}
