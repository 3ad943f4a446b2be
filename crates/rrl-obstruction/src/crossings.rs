//! Places where the terrain crosses the line of sight.

use rrl_profile::ClearanceSeries;
use std::ops::RangeInclusive;

/// Count terrain peaks that rise above the line of sight within `range`.
///
/// The pass walks the range with an inside/outside state. It flips to
/// inside whenever the clearance turns negative and back to outside once it
/// is non-negative again. Every entry counts as one peak.
pub fn count_peaks(series: &ClearanceSeries, range: RangeInclusive<usize>) -> usize {
    let end = (*range.end()).min(series.len().saturating_sub(1));
    let mut inside = false;
    let mut peaks = 0;

    for i in *range.start()..=end {
        let above = series.clearance[i] < 0.0;
        if above && !inside {
            peaks += 1;
            inside = true;
        } else if !above && inside {
            inside = false;
        }
    }

    peaks
}

/// Horizontal extent (meters) where the terrain around `index` stays above
/// the line of sight.
///
/// The crossing positions are interpolated linearly between the last sample
/// above and the first sample below the line. When the terrain at `index` is
/// not above the line the span is empty and both ends equal its position.
pub fn crossing_span(series: &ClearanceSeries, index: usize) -> (f64, f64) {
    let h = &series.clearance;
    let x = series.position_m(index);
    if h[index] >= 0.0 {
        return (x, x);
    }

    let mut left = index;
    while left > 0 && h[left - 1] < 0.0 {
        left -= 1;
    }
    let left_x = if left == 0 {
        series.position_m(0)
    } else {
        interpolate_crossing(series, left - 1, left)
    };

    let last = h.len() - 1;
    let mut right = index;
    while right < last && h[right + 1] < 0.0 {
        right += 1;
    }
    let right_x = if right == last {
        series.position_m(last)
    } else {
        interpolate_crossing(series, right, right + 1)
    };

    (left_x, right_x)
}

/// Position between samples `a` and `a + 1` where the clearance is zero.
fn interpolate_crossing(series: &ClearanceSeries, a: usize, b: usize) -> f64 {
    let (ha, hb) = (series.clearance[a], series.clearance[b]);
    let xa = series.position_m(a);
    let denom = ha - hb;
    if denom == 0.0 {
        return xa;
    }
    xa + series.spacing_m * (b - a) as f64 * ha / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(clearance: Vec<f64>) -> ClearanceSeries {
        let n = clearance.len();
        ClearanceSeries::from_parts(clearance, vec![1.0; n], vec![0.0; n], n as f64 * 100.0, 0.05)
            .unwrap()
    }

    #[test]
    fn test_count_two_peaks() {
        let s = series(vec![5.0, -1.0, -2.0, 3.0, 4.0, -1.0, 2.0]);
        assert_eq!(count_peaks(&s, 0..=6), 2);
        assert_eq!(count_peaks(&s, 3..=6), 1);
    }

    #[test]
    fn test_count_starts_inside() {
        let s = series(vec![-1.0, -1.0, 2.0, -3.0]);
        assert_eq!(count_peaks(&s, 0..=3), 2);
    }

    #[test]
    fn test_no_peaks_when_clear() {
        let s = series(vec![1.0, 0.0, 2.0]);
        assert_eq!(count_peaks(&s, 0..=2), 0);
    }

    #[test]
    fn test_crossing_span_interpolates() {
        // Spacing 100 m. Clearance crosses zero halfway between 0-1 and 3-4.
        let s = series(vec![2.0, -2.0, -5.0, -1.0, 1.0]);
        let (left, right) = crossing_span(&s, 2);
        assert_relative_eq!(left, 50.0);
        assert_relative_eq!(right, 350.0);
    }

    #[test]
    fn test_crossing_span_reaches_profile_end() {
        let s = series(vec![-1.0, -2.0, 1.0]);
        let (left, right) = crossing_span(&s, 1);
        assert_relative_eq!(left, 0.0);
        assert_relative_eq!(right, 100.0 + 100.0 * 2.0 / 3.0);
    }

    #[test]
    fn test_crossing_span_empty_when_clear() {
        let s = series(vec![1.0, 2.0, 1.0]);
        assert_eq!(crossing_span(&s, 1), (100.0, 100.0));
    }
}
