//! Per-category loss approximations for a merged segment.

use crate::diffraction::{
    clamp_position, distance_parameter, plane_loss, reflection_length, select_obstacle_model,
    sphere_estimate, sphere_radius, sphere_threshold, wedge_estimate, Confidence,
    DiffractionModel, LossEstimate,
};
use crate::{
    count_peaks, crossing_span, fit_obstacle, Category, Fault, GeometryFault, NumericFault,
    ObstacleFit, ObstructionParams, Segment, TowerSide,
};
use rrl_profile::{critical_clearance, ClearanceSeries, TowerPair};
use tracing::{debug, warn};

// ============================================================================
// Report types
// ============================================================================

/// Obstacle fitted to a segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleGeometry {
    /// Equivalent sphere radius (kilometers with the default scale). Zero when
    /// the fit failed.
    pub sphere_radius_km: f64,
    /// Chord height `Δy` under the governing tangent (meters).
    pub chord_height_m: f64,
    /// Chord length `l` used for the radius (meters).
    pub chord_length_m: f64,
    /// Sample at which the model was evaluated.
    pub obstruction_index: usize,
    /// Touching point of the sender tangent.
    pub tangent_index_sender: Option<usize>,
    /// Touching point of the receiver tangent.
    pub tangent_index_receiver: Option<usize>,
}

impl ObstacleGeometry {
    fn failed(obstruction_index: usize) -> Self {
        Self {
            sphere_radius_km: 0.0,
            chord_height_m: 0.0,
            chord_length_m: 0.0,
            obstruction_index,
            tangent_index_sender: None,
            tangent_index_receiver: None,
        }
    }
}

/// Reflection region of an open segment evaluated with the plane model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reflection {
    /// Reflection-region length `l0` (meters).
    pub reflection_length_m: f64,
    /// Largest perpendicular deviation of the terrain from the segment chord (meters).
    pub deviation_m: f64,
}

/// Extra geometry reported for closed segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosedDetails {
    /// Number of separate rises above the line of sight inside the segment.
    pub peak_count: usize,
    /// Tower whose tangent governs the obstacle, if a tangent was found.
    pub governing_side: Option<TowerSide>,
    /// Diffraction distance parameter `s` (meters).
    pub distance_parameter_m: f64,
    /// Distance from the sender to the obstacle top divided by `s`.
    pub sender_distance_ratio: f64,
    /// Distance from the receiver to the obstacle top divided by `s`.
    pub receiver_distance_ratio: f64,
}

/// Result of processing one segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentReport {
    /// The segment evaluated.
    pub segment: Segment,
    /// Loss estimate and any recovered faults.
    pub estimate: LossEstimate,
    /// Fitted obstacle, absent for plane-model segments.
    pub obstacle: Option<ObstacleGeometry>,
    /// Reflection region, present for plane-model segments.
    pub reflection: Option<Reflection>,
    /// Closed-segment geometry.
    pub closed: Option<ClosedDetails>,
}

impl SegmentReport {
    fn new(segment: Segment, estimate: LossEstimate) -> Self {
        Self {
            segment,
            estimate,
            obstacle: None,
            reflection: None,
            closed: None,
        }
    }
}

// ============================================================================
// Segment context
// ============================================================================

/// Read-only inputs shared by every segment of one evaluation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SegmentContext<'a> {
    pub series: &'a ClearanceSeries,
    pub towers: &'a TowerPair,
    pub params: &'a ObstructionParams,
}

/// Position and critical clearance at the sample a model is evaluated on,
/// after the numeric safeguards.
struct EvaluationPoint {
    index: usize,
    k: f64,
    critical_m: f64,
    faults: Vec<Fault>,
}

impl SegmentContext<'_> {
    /// Evaluate `segment` with the approximation for its category.
    pub fn process(&self, segment: &Segment) -> SegmentReport {
        let report = match segment.category {
            Category::Open => self.approximate_open(segment),
            Category::HalfOpen => self.approximate_half_open(segment),
            Category::Closed => self.approximate_closed(segment),
        };
        debug!(
            segment = %segment,
            model = %report.estimate.model,
            loss_db = report.estimate.loss_db,
            "segment evaluated"
        );
        report
    }

    /// Open segment: plane criterion inside a short reflection region,
    /// obstacle criterion otherwise.
    pub fn approximate_open(&self, segment: &Segment) -> SegmentReport {
        let series = self.series;
        let point = self.evaluation_point(self.obstruction_index(segment));
        let l0 = reflection_length(series.path_length_m, series.relative[point.index], point.k);

        if l0 <= self.params.plane_region_fraction * series.path_length_m {
            let deviation_m = perpendicular_deviation(series, segment);
            let (loss_db, fault) = plane_loss(deviation_m);
            let mut estimate = LossEstimate::new(DiffractionModel::Plane, loss_db);
            estimate.faults = point.faults;
            if let Some(fault) = fault {
                debug!(segment = %segment, %fault, "numeric safeguard applied");
                estimate.faults.push(fault.into());
            }

            let mut report = SegmentReport::new(*segment, estimate);
            report.reflection = Some(Reflection {
                reflection_length_m: l0,
                deviation_m,
            });
            return report;
        }

        self.approximate_obstacle(segment, point, l0)
    }

    /// Half-open segment: obstacle criterion at the point of least relative
    /// clearance, with the reflection-region length as the chord.
    pub fn approximate_half_open(&self, segment: &Segment) -> SegmentReport {
        let series = self.series;
        let point = self.evaluation_point(self.obstruction_index(segment));
        let l0 = reflection_length(series.path_length_m, series.relative[point.index], point.k);
        self.approximate_obstacle(segment, point, l0)
    }

    /// Closed segment: tangents from both towers, the lower obstruction
    /// governs, the chord spans the line-of-sight crossings around it.
    pub fn approximate_closed(&self, segment: &Segment) -> SegmentReport {
        let series = self.series;
        let params = self.params;
        let peak_count = count_peaks(series, segment.indices());

        let fit = match self.fit(segment) {
            Ok(fit) => fit,
            Err(fault) => {
                let index = self.obstruction_index(segment);
                let mut report = self.fallback(segment, index, fault);
                report.closed = Some(ClosedDetails {
                    peak_count,
                    governing_side: None,
                    distance_parameter_m: 0.0,
                    sender_distance_ratio: 0.0,
                    receiver_distance_ratio: 0.0,
                });
                return report;
            }
        };

        let tangent = fit.governing;
        let (left, right) = crossing_span(series, tangent.tangent_index);
        let chord_length_m = (right - left).max(series.spacing_m);
        let radius = sphere_radius(chord_length_m, fit.chord_height_m, params.sphere_radius_scale);

        let s = distance_parameter(radius / params.sphere_radius_scale, series.wavelength_m);
        let x_t = series.position_m(tangent.tangent_index);

        let point = self.evaluation_point(tangent.tangent_index);
        let mut report = self.obstacle_report(segment, point, &fit, radius, chord_length_m);
        report.closed = Some(ClosedDetails {
            peak_count,
            governing_side: Some(tangent.side),
            distance_parameter_m: s,
            sender_distance_ratio: x_t / s,
            receiver_distance_ratio: (series.path_length_m - x_t) / s,
        });
        report
    }

    // ------------------------------------------------------------------------

    fn approximate_obstacle(
        &self,
        segment: &Segment,
        point: EvaluationPoint,
        chord_length_m: f64,
    ) -> SegmentReport {
        match self.fit(segment) {
            Ok(fit) => {
                let radius = sphere_radius(
                    chord_length_m,
                    fit.chord_height_m,
                    self.params.sphere_radius_scale,
                );
                self.obstacle_report(segment, point, &fit, radius, chord_length_m)
            }
            Err(fault) => self.fallback(segment, point.index, fault),
        }
    }

    /// Sphere or wedge estimate for a fitted obstacle.
    fn obstacle_report(
        &self,
        segment: &Segment,
        point: EvaluationPoint,
        fit: &ObstacleFit,
        radius: f64,
        chord_length_m: f64,
    ) -> SegmentReport {
        let series = self.series;
        let threshold = sphere_threshold(series.path_length_m, series.wavelength_m);

        let mut estimate = match select_obstacle_model(radius, threshold) {
            DiffractionModel::Wedge => wedge_estimate(
                series.clearance[point.index],
                series.wavelength_m,
                series.path_length_m,
                point.k,
            ),
            _ => sphere_estimate(series.path_length_m, point.k, radius, point.critical_m),
        };
        let mut faults = point.faults;
        faults.append(&mut estimate.faults);
        for fault in &faults {
            debug!(segment = %segment, %fault, "numeric safeguard applied");
        }
        estimate.faults = faults;

        let mut report = SegmentReport::new(*segment, estimate);
        report.obstacle = Some(ObstacleGeometry {
            sphere_radius_km: radius,
            chord_height_m: fit.chord_height_m,
            chord_length_m,
            obstruction_index: point.index,
            tangent_index_sender: fit.sender.map(|t| t.tangent_index),
            tangent_index_receiver: fit.receiver.map(|t| t.tangent_index),
        });
        report
    }

    /// Zero-loss, low-confidence report for a segment whose obstacle could not be fitted.
    fn fallback(&self, segment: &Segment, index: usize, fault: GeometryFault) -> SegmentReport {
        warn!(segment = %segment, %fault, "obstacle fit failed, reporting zero loss");
        let mut estimate = LossEstimate::new(DiffractionModel::Wedge, 0.0);
        estimate.confidence = Confidence::Low;
        estimate.faults.push(fault.into());

        let mut report = SegmentReport::new(*segment, estimate);
        report.obstacle = Some(ObstacleGeometry::failed(index));
        report
    }

    fn fit(&self, segment: &Segment) -> Result<ObstacleFit, GeometryFault> {
        let window = segment.widened(
            self.params.obstacle_window_margin,
            self.series.len().saturating_sub(1),
        );
        fit_obstacle(self.series, &self.towers.sender, &self.towers.receiver, window)
    }

    /// Sample of least relative clearance inside the segment.
    ///
    /// Boundary samples carry `h0 = 0` by convention and are skipped; a
    /// segment made only of boundary samples falls back to the least absolute
    /// clearance.
    fn obstruction_index(&self, segment: &Segment) -> usize {
        let series = self.series;
        segment
            .indices()
            .filter(|&i| !series.is_boundary(i))
            .min_by(|&a, &b| series.relative[a].total_cmp(&series.relative[b]))
            .or_else(|| {
                segment
                    .indices()
                    .min_by(|&a, &b| series.clearance[a].total_cmp(&series.clearance[b]))
            })
            .unwrap_or(segment.start)
    }

    fn evaluation_point(&self, index: usize) -> EvaluationPoint {
        let series = self.series;
        let mut faults = Vec::new();

        let (k, clamped) = clamp_position(series.normalized_position(index), index);
        faults.extend(clamped.map(Fault::from));

        let mut critical_m = series.critical[index];
        if critical_m == 0.0 {
            faults.push(NumericFault::BoundaryClearance { index }.into());
            critical_m = critical_clearance(series.path_length_m, series.wavelength_m, k);
        }

        EvaluationPoint {
            index,
            k,
            critical_m,
            faults,
        }
    }
}

/// Largest perpendicular distance between the terrain and the chord joining
/// the terrain at the segment's first and last samples.
pub fn perpendicular_deviation(series: &ClearanceSeries, segment: &Segment) -> f64 {
    if segment.start == segment.end {
        return 0.0;
    }
    let (x0, x1) = (series.position_m(segment.start), series.position_m(segment.end));
    let (y0, y1) = (series.terrain[segment.start], series.terrain[segment.end]);
    let slope = (y1 - y0) / (x1 - x0);
    let norm = (1.0 + slope * slope).sqrt();

    segment
        .indices()
        .map(|i| {
            let chord = y0 + slope * (series.position_m(i) - x0);
            (series.terrain[i] - chord).abs() / norm
        })
        .fold(0.0, f64::max)
}
