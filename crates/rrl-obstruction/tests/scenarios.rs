//! End-to-end scenarios for link evaluation.
//!
//! Each test builds a terrain profile and tower pair, runs the full
//! classify → merge → approximate pipeline, and checks the segment reports.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use approx::assert_relative_eq;
use rrl_obstruction::diffraction::{wedge_loss, wedge_parameter};
use rrl_obstruction::{
    count_peaks, covers, evaluate, evaluate_with_params, Category, Confidence, DiffractionModel,
    Evaluation, ObstructionParams, Segment, TowerSide,
};
use rrl_profile::{DataError, TerrainProfile, TowerPair};

const WAVELENGTH_M: f64 = 0.05;

// ============================================================================
// Helpers
// ============================================================================

fn run(elevations: Vec<f64>, path_m: f64, height_m: f64) -> Evaluation {
    let profile = TerrainProfile::new(elevations, path_m).unwrap();
    let towers = TowerPair::new(path_m, height_m, height_m).unwrap();
    evaluate(&profile, &towers, WAVELENGTH_M).unwrap()
}

/// Two 35 m peaks under a 30 m line of sight, separated by a two-sample dip.
fn twin_peaks() -> Vec<f64> {
    let mut elev = vec![0.0; 100];
    for i in [45, 46, 49, 50] {
        elev[i] = 35.0;
    }
    elev
}

fn random_profile(rng: &mut ChaCha8Rng) -> (TerrainProfile, TowerPair) {
    let n = rng.gen_range(2..300);
    let path = rng.gen_range(1_000.0..60_000.0);
    let base: f64 = rng.gen_range(0.0..500.0);
    let roughness: f64 = rng.gen_range(0.0..80.0);
    let elevations = (0..n)
        .map(|_| base + rng.gen_range(0.0..=roughness))
        .collect();
    let profile = TerrainProfile::new(elevations, path).unwrap();
    let towers = TowerPair::above_ground(
        &profile,
        rng.gen_range(0.0..60.0),
        rng.gen_range(0.0..60.0),
    )
    .unwrap();
    (profile, towers)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_flat_terrain_is_open_with_zero_plane_loss() {
    let evaluation = run(vec![0.0; 100], 10_000.0, 50.0);

    assert!(evaluation.categories.iter().all(|c| *c == Category::Open));
    assert_eq!(
        evaluation.segments().copied().collect::<Vec<_>>(),
        vec![Segment::new(Category::Open, 0, 99)]
    );

    let report = &evaluation.reports[0];
    assert_eq!(report.estimate.model, DiffractionModel::Plane);
    assert_eq!(report.estimate.loss_db, 0.0);
    assert!(evaluation.is_line_of_sight());
}

#[test]
fn test_boundary_samples_are_open() {
    let evaluation = run(vec![0.0; 100], 10_000.0, 50.0);
    assert_eq!(evaluation.clearance.critical[0], 0.0);
    assert_eq!(evaluation.clearance.critical[99], 0.0);
    assert_eq!(evaluation.clearance.relative[0], 0.0);
    assert_eq!(evaluation.clearance.relative[99], 0.0);
    assert_eq!(evaluation.categories[0], Category::Open);
    assert_eq!(evaluation.categories[99], Category::Open);
}

#[test]
fn test_grazing_spike_is_half_open() {
    let mut elev = vec![0.0; 100];
    elev[50] = 29.7;
    let evaluation = run(elev, 10_000.0, 30.0);

    // H = 0.3 m, H0 ≈ 6.45 m at midpath
    let h0 = evaluation.clearance.relative[50];
    assert!(h0 > 0.046 && h0 < 0.047, "h0 = {h0}");
    assert_eq!(evaluation.categories[50], Category::HalfOpen);

    let half_open: Vec<_> = evaluation
        .reports
        .iter()
        .filter(|r| r.segment.category == Category::HalfOpen)
        .collect();
    assert_eq!(half_open.len(), 1);
    assert_eq!(half_open[0].segment, Segment::new(Category::HalfOpen, 50, 50));
    assert_eq!(half_open[0].estimate.model, DiffractionModel::Sphere);

    // r ≈ 840 km keeps the loss close to the 6 dB sphere floor.
    let loss = half_open[0].estimate.loss_db;
    assert!(loss > 6.0 && loss < 7.0, "loss = {loss}");
    let mu = half_open[0].estimate.relief.as_ref().unwrap().mu;
    assert!(mu > 10.0 && mu < 11.0, "mu = {mu}");
}

#[test]
fn test_low_towers_over_flat_ground_lose_little() {
    // Every sample clears the critical zone but the reflection region spans
    // half the path, so the obstacle criterion applies to the whole ground.
    let evaluation = run(vec![0.0; 100], 10_000.0, 10.0);
    assert_eq!(
        evaluation.segments().copied().collect::<Vec<_>>(),
        vec![Segment::new(Category::Open, 0, 99)]
    );

    let estimate = &evaluation.reports[0].estimate;
    assert_eq!(estimate.model, DiffractionModel::Sphere);
    assert!(estimate.loss_db > 6.0 && estimate.loss_db < 20.0, "loss = {}", estimate.loss_db);
    assert!(estimate.relief.as_ref().unwrap().mu > 1.0);
}

#[test]
fn test_sharp_ridge_uses_knife_edge() {
    let mut elev = vec![0.0; 100];
    elev[50] = 33.0;
    let evaluation = run(elev, 10_000.0, 30.0);

    let closed: Vec<_> = evaluation
        .reports
        .iter()
        .filter(|r| r.segment.category == Category::Closed)
        .collect();
    assert_eq!(closed.len(), 1);
    let report = closed[0];
    assert_eq!(report.segment, Segment::new(Category::Closed, 50, 50));

    // A one-sample ridge gives a radius far below the sphere threshold.
    let obstacle = report.obstacle.as_ref().unwrap();
    assert!(obstacle.sphere_radius_km < 1.0);
    assert_eq!(report.estimate.model, DiffractionModel::Wedge);
    assert_eq!(report.estimate.confidence, Confidence::Nominal);

    let k = 50.0 / 99.0;
    let nu = wedge_parameter(-3.0, WAVELENGTH_M, 10_000.0, k);
    assert!(nu > 0.37 && nu < 0.39, "nu = {nu}");
    assert_relative_eq!(report.estimate.loss_db, wedge_loss(nu), max_relative = 1e-9);
    assert!(
        report.estimate.loss_db > 9.2 && report.estimate.loss_db < 9.4,
        "loss = {}",
        report.estimate.loss_db
    );
}

#[test]
fn test_twin_peaks_merge_into_one_closed_segment() {
    let evaluation = run(twin_peaks(), 10_000.0, 30.0);

    // The dip between the peaks clears the critical clearance.
    assert_eq!(evaluation.categories[47], Category::Open);
    assert_eq!(evaluation.categories[48], Category::Open);
    assert_eq!(count_peaks(&evaluation.clearance, 0..=99), 2);

    let segments: Vec<_> = evaluation.segments().copied().collect();
    assert_eq!(
        segments,
        vec![
            Segment::new(Category::Open, 0, 44),
            Segment::new(Category::Closed, 45, 50),
            Segment::new(Category::Open, 51, 99),
        ]
    );

    let closed = &evaluation.reports[1];
    let details = closed.closed.as_ref().unwrap();
    assert_eq!(details.peak_count, 2);
    assert_eq!(details.governing_side, Some(TowerSide::Sender));
    assert!(details.distance_parameter_m > 0.0);
    assert_eq!(closed.estimate.confidence, Confidence::Nominal);
    assert_eq!(closed.estimate.model, DiffractionModel::Sphere);
    let loss = closed.estimate.loss_db;
    assert!(loss > 6.0 && loss < 6.1, "loss = {loss}");

    let obstacle = closed.obstacle.as_ref().unwrap();
    assert_eq!(obstacle.tangent_index_sender, Some(45));
    assert_eq!(obstacle.tangent_index_receiver, Some(50));
    assert!(!evaluation.is_line_of_sight());
}

#[test]
fn test_smaller_gap_keeps_peaks_apart() {
    let profile = TerrainProfile::new(twin_peaks(), 10_000.0).unwrap();
    let towers = TowerPair::new(10_000.0, 30.0, 30.0).unwrap();
    let params = ObstructionParams {
        max_gap: 1,
        ..Default::default()
    };
    let evaluation = evaluate_with_params(&profile, &towers, WAVELENGTH_M, &params).unwrap();

    let closed: Vec<_> = evaluation
        .segments()
        .filter(|s| s.category == Category::Closed)
        .copied()
        .collect();
    assert_eq!(
        closed,
        vec![
            Segment::new(Category::Closed, 45, 46),
            Segment::new(Category::Closed, 49, 50),
        ]
    );
}

#[test]
fn test_earth_curvature_can_close_a_flat_link() {
    let profile = TerrainProfile::new(vec![0.0; 200], 40_000.0).unwrap();
    let towers = TowerPair::new(40_000.0, 20.0, 20.0).unwrap();

    let flat = evaluate(&profile, &towers, WAVELENGTH_M).unwrap();
    assert!(flat.is_line_of_sight());

    let params = ObstructionParams {
        refraction_k_factor: Some(4.0 / 3.0),
        ..Default::default()
    };
    let curved = evaluate_with_params(&profile, &towers, WAVELENGTH_M, &params).unwrap();
    assert!(!curved.is_line_of_sight());
    assert_eq!(curved.categories[100], Category::Closed);
}

#[test]
fn test_invalid_input_is_rejected() {
    let profile = TerrainProfile::new(vec![0.0; 10], 1_000.0).unwrap();
    let towers = TowerPair::new(1_000.0, 10.0, 10.0).unwrap();
    assert!(matches!(
        evaluate(&profile, &towers, -1.0),
        Err(DataError::NonPositiveWavelength(_))
    ));

    let short = TowerPair::new(900.0, 10.0, 10.0).unwrap();
    assert!(matches!(
        evaluate(&profile, &short, WAVELENGTH_M),
        Err(DataError::PathLengthMismatch { .. })
    ));

    assert!(matches!(
        TerrainProfile::new(vec![1.0], 1_000.0),
        Err(DataError::TooFewSamples { count: 1 })
    ));
}

// ============================================================================
// Properties over generated profiles
// ============================================================================

#[test]
fn test_random_profiles_are_fully_covered() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..300 {
        let (profile, towers) = random_profile(&mut rng);
        let evaluation = evaluate(&profile, &towers, WAVELENGTH_M).unwrap();

        let segments: Vec<_> = evaluation.segments().copied().collect();
        assert!(covers(&segments, profile.len()));
        assert_eq!(evaluation.categories.len(), profile.len());
        for estimate in evaluation.estimates() {
            assert!(estimate.loss_db.is_finite());
            assert!(estimate.loss_db >= 0.0);
        }
    }
}

#[test]
fn test_repeated_evaluation_is_bit_identical() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..50 {
        let (profile, towers) = random_profile(&mut rng);
        let first = evaluate(&profile, &towers, WAVELENGTH_M).unwrap();
        let second = evaluate(&profile, &towers, WAVELENGTH_M).unwrap();

        assert_eq!(first.categories, second.categories);
        let bits = |e: &Evaluation| -> Vec<u64> {
            e.estimates().map(|est| est.loss_db.to_bits()).collect()
        };
        assert_eq!(bits(&first), bits(&second));
    }
}
