//! Whole-profile evaluation: classify, merge, approximate every segment.

use crate::approximation::{SegmentContext, SegmentReport};
use crate::{classify_with_params, merge_with_gap, Category, LossEstimate, ObstructionParams, Segment};
use rayon::prelude::*;
use rrl_profile::{
    compute_clearance, compute_clearance_with_refraction, ClearanceSeries, DataError,
    TerrainProfile, TowerPair,
};
use tracing::debug;

/// Sample counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryCounts {
    /// Samples whose Fresnel zone is clear.
    pub open: usize,
    /// Samples intruding into the critical zone without crossing the line of sight.
    pub half_open: usize,
    /// Samples at or above the line of sight.
    pub closed: usize,
}

/// Outcome of evaluating one link profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Clearance metrics per sample.
    pub clearance: ClearanceSeries,
    /// Category per sample.
    pub categories: Vec<Category>,
    /// One report per merged segment, ordered by start index.
    pub reports: Vec<SegmentReport>,
}

impl Evaluation {
    /// Merged segments in profile order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.reports.iter().map(|r| &r.segment)
    }

    /// Loss estimates in profile order.
    pub fn estimates(&self) -> impl Iterator<Item = &LossEstimate> + '_ {
        self.reports.iter().map(|r| &r.estimate)
    }

    /// The segment with the largest loss; the first one on ties.
    pub fn worst(&self) -> Option<&SegmentReport> {
        self.reports.iter().fold(None, |worst, report| match worst {
            Some(w) if w.estimate.loss_db >= report.estimate.loss_db => Some(w),
            _ => Some(report),
        })
    }

    /// How many samples fell into each category.
    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for category in &self.categories {
            match category {
                Category::Open => counts.open += 1,
                Category::HalfOpen => counts.half_open += 1,
                Category::Closed => counts.closed += 1,
            }
        }
        counts
    }

    /// True when no segment is obstructed.
    pub fn is_line_of_sight(&self) -> bool {
        self.segments().all(|s| !s.category.is_obstructed())
    }
}

/// Evaluate a link with default parameters.
///
/// # Example
///
/// ```
/// use rrl_obstruction::{evaluate, Category};
/// use rrl_profile::{TerrainProfile, TowerPair};
///
/// let profile = TerrainProfile::new(vec![0.0; 100], 10_000.0).unwrap();
/// let towers = TowerPair::new(10_000.0, 50.0, 50.0).unwrap();
/// let evaluation = evaluate(&profile, &towers, 0.05).unwrap();
///
/// assert!(evaluation.is_line_of_sight());
/// assert_eq!(evaluation.reports[0].segment.category, Category::Open);
/// ```
pub fn evaluate(
    profile: &TerrainProfile,
    towers: &TowerPair,
    wavelength_m: f64,
) -> Result<Evaluation, DataError> {
    evaluate_with_params(profile, towers, wavelength_m, &ObstructionParams::default())
}

/// Validate `params` and compute the clearance series, on a curved earth
/// when `params.refraction_k_factor` is set.
///
/// # Errors
///
/// Returns [`DataError`] for invalid parameters or input.
pub fn compute_link_clearance(
    profile: &TerrainProfile,
    towers: &TowerPair,
    wavelength_m: f64,
    params: &ObstructionParams,
) -> Result<ClearanceSeries, DataError> {
    params.validate()?;
    match params.refraction_k_factor {
        Some(k_factor) => {
            compute_clearance_with_refraction(profile, towers, wavelength_m, k_factor)
        }
        None => compute_clearance(profile, towers, wavelength_m),
    }
}

/// Evaluate a link.
///
/// Segments are processed on the rayon pool once there are at least
/// `params.parallel_threshold` of them. Reports keep segment order either
/// way, so the result does not depend on the execution path.
///
/// # Errors
///
/// Returns [`DataError`] for invalid input. Obstacle fitting and numeric
/// problems are recovered and recorded in the affected estimates instead.
pub fn evaluate_with_params(
    profile: &TerrainProfile,
    towers: &TowerPair,
    wavelength_m: f64,
    params: &ObstructionParams,
) -> Result<Evaluation, DataError> {
    let clearance = compute_link_clearance(profile, towers, wavelength_m, params)?;
    let categories = classify_with_params(&clearance, params)?;
    let segments = merge_with_gap(&categories, params.max_gap)?;

    let parallel = segments.len() >= params.parallel_threshold;
    debug!(
        samples = clearance.len(),
        segments = segments.len(),
        parallel,
        "profile classified"
    );

    let ctx = SegmentContext {
        series: &clearance,
        towers,
        params,
    };
    let reports: Vec<SegmentReport> = if parallel {
        segments.par_iter().map(|s| ctx.process(s)).collect()
    } else {
        segments.iter().map(|s| ctx.process(s)).collect()
    };

    Ok(Evaluation {
        clearance,
        categories,
        reports,
    })
}
