//! Closed-form diffraction and reflection loss approximations.
//!
//! Three models are available:
//! - **Plane**: Rayleigh-style interference over a flat reflecting stretch
//! - **Sphere**: diffraction over an obstacle approximated by a sphere of
//!   radius `r`, driven by the relief parameter `μ`
//! - **Wedge**: knife-edge diffraction driven by the Fresnel-Kirchhoff
//!   parameter `ν`
//!
//! All losses are non-negative attenuations in dB.

use crate::{Fault, NumericFault};
use std::f64::consts::PI;

/// Relief parameter distance from 0.1 below which the slope is clamped.
pub const RELIEF_SINGULARITY_MARGIN: f64 = 1e-3;

/// Smallest allowed normalized position; `k` is kept in `[K_MARGIN, 1 − K_MARGIN]`.
pub const K_MARGIN: f64 = 1e-6;

/// Floor of the plane interference term `2 − 2cos(·)`.
pub const INTERFERENCE_FLOOR: f64 = 1e-6;

/// Approximation used for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiffractionModel {
    /// Flat reflecting surface.
    Plane,
    /// Spherical obstacle.
    Sphere,
    /// Knife-edge obstacle.
    Wedge,
}

impl std::fmt::Display for DiffractionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffractionModel::Plane => write!(f, "plane"),
            DiffractionModel::Sphere => write!(f, "sphere"),
            DiffractionModel::Wedge => write!(f, "wedge"),
        }
    }
}

/// How much an estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Confidence {
    /// The model was evaluated on a fitted obstacle.
    #[default]
    Nominal,
    /// Obstacle fitting failed and the fallback was used.
    Low,
}

/// Relief parameter of the sphere model and the slope reported with it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReliefParameter {
    /// Relief parameter `μ`.
    pub mu: f64,
    /// Auxiliary slope `4 + 10 / (μ − 0.1)`.
    pub slope: f64,
}

/// Diffraction loss estimate for one segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossEstimate {
    /// Model that produced the value.
    pub model: DiffractionModel,
    /// Attenuation in dB (non-negative).
    pub loss_db: f64,
    /// Trust in the value.
    pub confidence: Confidence,
    /// Sphere model relief parameter, when the sphere model was used.
    pub relief: Option<ReliefParameter>,
    /// Recovered faults encountered on the way.
    pub faults: Vec<Fault>,
}

impl LossEstimate {
    /// An estimate with nominal confidence and no faults.
    pub fn new(model: DiffractionModel, loss_db: f64) -> Self {
        Self {
            model,
            loss_db,
            confidence: Confidence::Nominal,
            relief: None,
            faults: Vec::new(),
        }
    }

    /// True when the estimate relies on a fallback.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }
}

/// Keep `k` inside the open interval (0, 1).
///
/// Returns the clamped value and a fault when clamping changed it.
pub fn clamp_position(k: f64, index: usize) -> (f64, Option<NumericFault>) {
    let clamped = k.clamp(K_MARGIN, 1.0 - K_MARGIN);
    if clamped != k {
        (clamped, Some(NumericFault::PositionClamped { index, k }))
    } else {
        (k, None)
    }
}

/// Reflection-region length `l0 = R0 · sqrt(1 + h0²) / (1 + h0² / (4k(1 − k)))`.
pub fn reflection_length(path_length_m: f64, rel: f64, k: f64) -> f64 {
    let rel2 = rel * rel;
    path_length_m * (1.0 + rel2).sqrt() / (1.0 + rel2 / (4.0 * k * (1.0 - k)))
}

/// Plane interference loss `−10 · log10(2 − 2cos(π/3 · Δh²))`.
///
/// A perfectly flat stretch (`Δh = 0`) yields 0 dB. A vanishing interference
/// term is floored at [`INTERFERENCE_FLOOR`] and reported.
pub fn plane_loss(deviation_m: f64) -> (f64, Option<NumericFault>) {
    if deviation_m == 0.0 {
        return (0.0, None);
    }
    let term = 2.0 - 2.0 * (PI / 3.0 * deviation_m * deviation_m).cos();
    let (term, fault) = if term < INTERFERENCE_FLOOR {
        (
            INTERFERENCE_FLOOR,
            Some(NumericFault::InterferenceFloor { value: term }),
        )
    } else {
        (term, None)
    };
    ((-10.0 * term.log10()).max(0.0), fault)
}

/// Sphere radius `l² / (8 Δy) · scale` (kilometers with the default scale).
pub fn sphere_radius(chord_length_m: f64, chord_height_m: f64, scale: f64) -> f64 {
    chord_length_m * chord_length_m / (8.0 * chord_height_m) * scale
}

/// Radius at or above which an obstacle is treated as a sphere:
/// `sqrt(R0 · λ · 0.5 · (0.5 / 3))`.
pub fn sphere_threshold(path_length_m: f64, wavelength_m: f64) -> f64 {
    (path_length_m * wavelength_m * 0.5 * (0.5 / 3.0)).sqrt()
}

/// Pick the sphere model at or above the threshold, the wedge model below it.
pub fn select_obstacle_model(sphere_radius: f64, threshold: f64) -> DiffractionModel {
    if sphere_radius >= threshold {
        DiffractionModel::Sphere
    } else {
        DiffractionModel::Wedge
    }
}

/// Relief parameter `μ = (R0² k² (1 − k)² / (r · H0))^(1/3)`.
///
/// `R0` and `H0` are in meters and `r` is the scaled radius returned by
/// [`sphere_radius`].
pub fn relief_parameter(path_length_m: f64, k: f64, radius_km: f64, critical_m: f64) -> f64 {
    let numerator = path_length_m * path_length_m * k * k * (1.0 - k) * (1.0 - k);
    (numerator / (radius_km * critical_m)).cbrt()
}

/// Relief slope `4 + 10 / (μ − 0.1)`, clamped near its singular point.
pub fn relief_slope(mu: f64) -> (f64, Option<NumericFault>) {
    let offset = mu - 0.1;
    if offset.abs() < RELIEF_SINGULARITY_MARGIN {
        let clamped = if offset < 0.0 {
            -RELIEF_SINGULARITY_MARGIN
        } else {
            RELIEF_SINGULARITY_MARGIN
        };
        (
            4.0 + 10.0 / clamped,
            Some(NumericFault::ReliefSingularity { mu }),
        )
    } else {
        (4.0 + 10.0 / offset, None)
    }
}

/// Sphere diffraction loss `6 + 16.4 / (μ (1 + 0.8μ))`.
pub fn sphere_loss(mu: f64) -> f64 {
    (6.0 + 16.4 / (mu * (1.0 + 0.8 * mu))).max(0.0)
}

/// Evaluate the sphere model and collect the relief parameter.
pub fn sphere_estimate(
    path_length_m: f64,
    k: f64,
    radius_km: f64,
    critical_m: f64,
) -> LossEstimate {
    let mu = relief_parameter(path_length_m, k, radius_km, critical_m);
    let (slope, fault) = relief_slope(mu);
    let mut estimate = LossEstimate::new(DiffractionModel::Sphere, sphere_loss(mu));
    estimate.relief = Some(ReliefParameter { mu, slope });
    estimate.faults.extend(fault.map(Fault::from));
    estimate
}

/// Fresnel-Kirchhoff parameter `ν = −H · sqrt(2 / (λ R0 k (1 − k)))`.
pub fn wedge_parameter(clearance_m: f64, wavelength_m: f64, path_length_m: f64, k: f64) -> f64 {
    -clearance_m * (2.0 / (wavelength_m * path_length_m * k * (1.0 - k))).sqrt()
}

/// Knife-edge loss `6.9 + 20 · log10(sqrt((ν − 0.1)² + 1) + ν − 0.1)`.
///
/// The expression turns negative for `ν` below about −0.78, where the edge
/// no longer obstructs; the result is floored at 0 dB.
pub fn wedge_loss(nu: f64) -> f64 {
    let v = nu - 0.1;
    (6.9 + 20.0 * ((v * v + 1.0).sqrt() + v).log10()).max(0.0)
}

/// Evaluate the wedge model.
pub fn wedge_estimate(clearance_m: f64, wavelength_m: f64, path_length_m: f64, k: f64) -> LossEstimate {
    let nu = wedge_parameter(clearance_m, wavelength_m, path_length_m, k);
    LossEstimate::new(DiffractionModel::Wedge, wedge_loss(nu))
}

/// Diffraction distance parameter `s = (r² λ / π)^(1/3)` for a sphere of
/// radius `radius_m` in meters.
pub fn distance_parameter(radius_m: f64, wavelength_m: f64) -> f64 {
    (radius_m * radius_m * wavelength_m / PI).cbrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_loss_zero_deviation() {
        assert_eq!(plane_loss(0.0), (0.0, None));
    }

    #[test]
    fn test_plane_loss_known_value() {
        // π/3 · 1² = π/3, 2 − 2cos(π/3) = 1 → 0 dB
        let (loss, fault) = plane_loss(1.0);
        assert_relative_eq!(loss, 0.0, epsilon = 1e-12);
        assert!(fault.is_none());
        // Small deviation: strong interference
        let (loss, _) = plane_loss(0.3);
        let expected = -10.0 * (2.0 - 2.0 * (PI / 3.0 * 0.09).cos()).log10();
        assert_relative_eq!(loss, expected);
        assert!(loss > 10.0);
    }

    #[test]
    fn test_plane_loss_floor() {
        // π/3 · Δh² = 2π → Δh = sqrt(6)
        let (loss, fault) = plane_loss(6f64.sqrt());
        assert_relative_eq!(loss, 60.0, epsilon = 1e-6);
        assert!(matches!(fault, Some(NumericFault::InterferenceFloor { .. })));
    }

    #[test]
    fn test_plane_loss_never_negative() {
        // 2 − 2cos(π) = 4 → −6 dB, floored
        let (loss, _) = plane_loss(3f64.sqrt());
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let threshold = sphere_threshold(10_000.0, 0.05);
        assert_relative_eq!(threshold, (10_000.0 * 0.05 * 0.5 * (0.5 / 3.0f64)).sqrt());
        assert_eq!(select_obstacle_model(threshold, threshold), DiffractionModel::Sphere);
        assert_eq!(
            select_obstacle_model(threshold - 1e-9, threshold),
            DiffractionModel::Wedge
        );
        assert_eq!(
            select_obstacle_model(threshold * 2.0, threshold),
            DiffractionModel::Sphere
        );
    }

    #[test]
    fn test_sphere_radius() {
        // l = 2 km, Δy = 10 m → 4e6 / 80 · 0.001 = 50 km
        assert_relative_eq!(sphere_radius(2_000.0, 10.0, 0.001), 50.0);
    }

    #[test]
    fn test_relief_parameter_and_loss() {
        // R0 = 40 km, k = 0.5, r = 50 km, H0 = 12.91 m
        let h0 = (40_000.0 * 0.05 * 0.25 / 3.0f64).sqrt();
        let mu = relief_parameter(40_000.0, 0.5, 50.0, h0);
        let expected = (1.6e9 * 0.0625 / (50.0 * h0)).cbrt();
        assert_relative_eq!(mu, expected);
        assert!(mu > 53.0 && mu < 54.5, "mu = {mu}");

        let loss = sphere_loss(mu);
        assert_relative_eq!(loss, 6.0 + 16.4 / (mu * (1.0 + 0.8 * mu)));
        assert!(loss > 6.0 && loss < 6.01, "loss = {loss}");
    }

    #[test]
    fn test_sphere_estimate_reports_relief() {
        let estimate = sphere_estimate(40_000.0, 0.5, 50.0, 12.9);
        assert_eq!(estimate.model, DiffractionModel::Sphere);
        let relief = estimate.relief.unwrap();
        assert_relative_eq!(relief.slope, 4.0 + 10.0 / (relief.mu - 0.1));
        assert!(estimate.faults.is_empty());
    }

    #[test]
    fn test_relief_slope_singularity_is_clamped() {
        let (slope, fault) = relief_slope(0.1);
        assert_relative_eq!(slope, 4.0 + 10.0 / RELIEF_SINGULARITY_MARGIN);
        assert_eq!(fault, Some(NumericFault::ReliefSingularity { mu: 0.1 }));

        let (slope, fault) = relief_slope(0.0995);
        assert_relative_eq!(slope, 4.0 - 10.0 / RELIEF_SINGULARITY_MARGIN);
        assert!(fault.is_some());

        let (slope, fault) = relief_slope(1.1);
        assert_relative_eq!(slope, 14.0);
        assert!(fault.is_none());
    }

    #[test]
    fn test_wedge_loss_grazing() {
        // ν = 0 → 6.9 + 20 log10(sqrt(1.01) − 0.1) ≈ 6.0 dB
        assert_relative_eq!(wedge_loss(0.0), 6.0, epsilon = 0.05);
        assert_eq!(wedge_parameter(0.0, 0.05, 10_000.0, 0.5), 0.0);
    }

    #[test]
    fn test_wedge_loss_grows_with_obstruction() {
        let clear = wedge_loss(wedge_parameter(5.0, 0.05, 10_000.0, 0.5));
        let blocked = wedge_loss(wedge_parameter(-5.0, 0.05, 10_000.0, 0.5));
        assert!(blocked > clear);
        assert!(blocked > 6.0);
        assert_eq!(wedge_loss(-3.0), 0.0);
    }

    #[test]
    fn test_reflection_length() {
        // h0 = 0 → l0 = R0
        assert_relative_eq!(reflection_length(10_000.0, 0.0, 0.5), 10_000.0);
        // h0 = 7.75 at midpath → roughly an eighth of the path
        let l0 = reflection_length(10_000.0, 7.75, 0.5);
        assert!(l0 < 2_500.0);
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(0.5, 3), (0.5, None));
        let (k, fault) = clamp_position(0.0, 0);
        assert_eq!(k, K_MARGIN);
        assert_eq!(fault, Some(NumericFault::PositionClamped { index: 0, k: 0.0 }));
        let (k, _) = clamp_position(1.0, 9);
        assert_eq!(k, 1.0 - K_MARGIN);
    }

    #[test]
    fn test_distance_parameter() {
        // r = 50 km, λ = 0.05 m
        let s = distance_parameter(50_000.0, 0.05);
        assert_relative_eq!(s, (2.5e9 * 0.05 / PI).cbrt());
    }
}
