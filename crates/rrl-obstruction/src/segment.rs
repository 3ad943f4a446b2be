//! Contiguous runs of classified samples.
//!
//! Merging proceeds in two passes. Maximal runs of identical categories are
//! collected first. An obstructed run then absorbs a short gap of samples of
//! any other category when the same obstruction resumes right after it, so a
//! grazing dip inside a closed ridge does not split the ridge. Open runs never
//! absorb obstructions.

use crate::Category;
use rrl_profile::DataError;
use std::ops::RangeInclusive;

/// Default largest open gap bridged by an obstructed segment.
pub const DEFAULT_MAX_GAP: usize = 3;

/// A classified, inclusive index range of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Category shared by the segment.
    pub category: Category,
    /// First sample index.
    pub start: usize,
    /// Last sample index (inclusive).
    pub end: usize,
}

impl Segment {
    /// Create a segment over `start..=end`.
    pub fn new(category: Category, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self {
            category,
            start,
            end,
        }
    }

    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a segment covers at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sample indices covered.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// True when `index` lies inside the segment.
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Indices widened by `margin` on both sides, clipped to `0..=last`.
    pub fn widened(&self, margin: usize, last: usize) -> RangeInclusive<usize> {
        self.start.saturating_sub(margin)..=self.end.saturating_add(margin).min(last)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}..={}]", self.category, self.start, self.end)
    }
}

/// Merge per-sample categories into segments with the default gap tolerance.
pub fn merge(categories: &[Category]) -> Result<Vec<Segment>, DataError> {
    merge_with_gap(categories, DEFAULT_MAX_GAP)
}

/// Merge per-sample categories into segments.
///
/// The result is ordered by start index, never overlaps, and covers every
/// index of `categories` exactly once.
///
/// # Errors
///
/// Returns [`DataError::EmptyCategories`] when `categories` is empty.
pub fn merge_with_gap(categories: &[Category], max_gap: usize) -> Result<Vec<Segment>, DataError> {
    if categories.is_empty() {
        return Err(DataError::EmptyCategories);
    }
    Ok(merge_segments(&runs(categories), max_gap))
}

/// Maximal runs of identical categories.
pub fn runs(categories: &[Category]) -> Vec<Segment> {
    let mut out = Vec::new();
    let Some(&first) = categories.first() else {
        return out;
    };

    let mut current = Segment::new(first, 0, 0);
    for (i, &category) in categories.iter().enumerate().skip(1) {
        if category == current.category {
            current.end = i;
        } else {
            out.push(current);
            current = Segment::new(category, i, i);
        }
    }
    // The final index closes the last open run.
    out.push(current);
    out
}

/// Re-merge an ordered, covering segment list.
///
/// Adjacent segments of the same category are joined, and an obstructed
/// segment followed by at most `max_gap` samples of other categories and then
/// the same obstruction is joined across the gap. Applying this to its own
/// output returns the same list.
pub fn merge_segments(segments: &[Segment], max_gap: usize) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let mut current = segments[i];
        i += 1;

        loop {
            if let Some(next) = segments.get(i) {
                if next.category == current.category {
                    current.end = next.end;
                    i += 1;
                    continue;
                }
            }

            if current.category.is_obstructed() {
                if let Some(resume) = bridge_gap(segments, i, current.category, max_gap) {
                    current.end = segments[resume].end;
                    i = resume + 1;
                    continue;
                }
            }

            break;
        }

        out.push(current);
    }

    out
}

/// Index of the segment that resumes `category` after a gap starting at
/// `from`, if the gap holds no more than `max_gap` samples.
fn bridge_gap(
    segments: &[Segment],
    from: usize,
    category: Category,
    max_gap: usize,
) -> Option<usize> {
    let mut gap = 0;
    for (j, segment) in segments.iter().enumerate().skip(from) {
        if segment.category == category {
            return (j > from).then_some(j);
        }
        gap += segment.len();
        if gap > max_gap {
            return None;
        }
    }
    None
}

/// Check that `segments` is ordered, non-overlapping and covers `0..len`.
pub fn covers(segments: &[Segment], len: usize) -> bool {
    let mut expected = 0;
    for segment in segments {
        if segment.start != expected || segment.end < segment.start {
            return false;
        }
        expected = segment.end + 1;
    }
    expected == len
}
