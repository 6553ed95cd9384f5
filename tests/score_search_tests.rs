use dollcalc::optimizer::{scan_grid, search_best_k_n, SearchRequest};
use dollcalc::score::{
    accumulated_points, milestone_bonus, model_total_score, session_bonus, MilestoneTier,
    ScoreModel, SessionRange,
};
use dollcalc::Error;
use proptest::prelude::*;

fn request(target: u64, k_min: u64, k_max: u64, k_step: u64) -> SearchRequest {
    SearchRequest {
        target,
        k_min,
        k_max,
        k_step,
        days: 8,
        top: 5,
    }
}

#[test]
fn session_bonus_boundaries() {
    assert_eq!(session_bonus(3799), 0);
    assert_eq!(session_bonus(3800), 27);
    assert_eq!(session_bonus(4800), 27);
    assert_eq!(session_bonus(4880), 28);
}

#[test]
fn milestone_bonus_boundaries() {
    assert_eq!(milestone_bonus(899), 0);
    assert_eq!(milestone_bonus(900), 40);
    assert_eq!(milestone_bonus(1800), 80);
}

#[test]
fn milestone_tiers_accumulate_across_tables() {
    // every threshold of the first three tables plus the first of the fourth
    assert_eq!(milestone_bonus(126_000), 120 + 500 + 640 + 2000);
    assert_eq!(milestone_bonus(375_000), 120 + 500 + 640 + 8000 + 300);
}

#[test]
fn accumulated_points_multiply() {
    assert_eq!(accumulated_points(3800, 6, 8), 182_400);
    assert_eq!(accumulated_points(2_000_000, 30, 8), 480_000_000);
}

#[test]
fn example_search_returns_closest_attainable_score() {
    let model = ScoreModel::standard();
    let req = request(5000, 3800, 4000, 100);
    let outcome = search_best_k_n(&req, model).expect("request is valid");

    assert_eq!(outcome.cells_scanned, 90);
    let best = outcome.best().expect("grid is not empty");
    assert_eq!((best.k, best.n), (3800, 6));
    assert_eq!(best.model_score, 5877);
    assert_eq!(best.diff, 877);
    assert_eq!(best.accumulated, 182_400);

    let closest = scan_grid(&req, model)
        .iter()
        .map(|c| c.model_score.abs_diff(5000))
        .min()
        .expect("grid is not empty");
    assert_eq!(best.diff, closest);

    let breakdown = model_total_score(best.k, best.n, 8);
    assert_eq!(breakdown.total, best.model_score);
}

#[test]
fn equal_differences_keep_grid_order() {
    let outcome = search_best_k_n(&request(5000, 3800, 4000, 100), ScoreModel::standard())
        .expect("request is valid");
    let order: Vec<_> = outcome.candidates.iter().map(|c| (c.k, c.n)).collect();
    assert_eq!(
        order,
        vec![(3800, 6), (3800, 7), (3900, 6), (3900, 7), (4000, 6)]
    );
}

#[test]
fn exact_hit_has_zero_diff() {
    // k=3800, n=1 over 8 days scores 590 + 27 + 520
    let outcome = search_best_k_n(&request(1137, 3800, 3900, 100), ScoreModel::standard())
        .expect("request is valid");
    let best = outcome.best().expect("grid is not empty");
    assert_eq!(best.diff, 0);
    assert_eq!((best.k, best.n), (3800, 1));
}

#[test]
fn custom_model_changes_the_grid() {
    let model = ScoreModel {
        base_score: 0,
        sessions_per_day: SessionRange { min: 1, max: 2 },
        milestones: vec![MilestoneTier {
            bonus: 10,
            thresholds: vec![100, 200],
        }],
        ..ScoreModel::default()
    };
    let req = SearchRequest {
        target: 10,
        k_min: 10,
        k_max: 20,
        k_step: 5,
        days: 5,
        top: 20,
    };
    let outcome = search_best_k_n(&req, &model).expect("request is valid");
    assert_eq!(outcome.cells_scanned, 6);
    assert_eq!(outcome.candidates.len(), 6);
    // k=10,n=2 → P=100 → score 10
    let best = outcome.best().expect("grid is not empty");
    assert_eq!((best.k, best.n, best.model_score), (10, 2, 10));
}

#[test]
fn invalid_requests_are_rejected_with_field_names() {
    let bad = SearchRequest {
        target: 6_000_000,
        k_min: 4000,
        k_max: 4000,
        k_step: 0,
        days: 0,
        top: 0,
    };
    let err = search_best_k_n(&bad, ScoreModel::standard()).unwrap_err();
    let fields: Vec<_> = err.issues().iter().map(|issue| issue.field.as_str()).collect();
    assert_eq!(fields, vec!["target", "k_max", "k_step", "top", "days"]);

    let wrapped: Error = err.into();
    assert!(wrapped.to_string().starts_with("validation failed: target:"));
}

#[test]
fn oversized_grid_is_rejected() {
    let err = search_best_k_n(&request(5000, 0, 2_000_000, 1), ScoreModel::standard())
        .unwrap_err();
    assert_eq!(err.issues()[0].field, "k_step");
    assert!(err.issues()[0].messages[0].contains("cells"));
}

proptest! {
    #[test]
    fn results_are_sorted_by_difference(
        target in 0u64..20_000,
        k_min in 0u64..10_000,
        span in 1u64..5_000,
        k_step in 1u64..500,
        top in 1usize..=20,
    ) {
        let req = SearchRequest { target, k_min, k_max: k_min + span, k_step, days: 8, top };
        let outcome = search_best_k_n(&req, ScoreModel::standard()).unwrap();
        prop_assert!(!outcome.candidates.is_empty());
        prop_assert!(outcome.candidates.len() <= top);
        prop_assert!(outcome.candidates.windows(2).all(|w| w[0].diff <= w[1].diff));

        let closest = scan_grid(&req, ScoreModel::standard())
            .iter()
            .map(|c| c.diff)
            .min()
            .unwrap();
        prop_assert_eq!(outcome.candidates[0].diff, closest);
    }
}
