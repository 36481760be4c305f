//! # Gap detection and bounded interpolation
//!
//! Tracking dropouts are handled per marker in three steps:
//!
//! 1. **Detection** – every maximal run of `Lost` samples is a gap `[start, end)`; a run that
//!    touches the last sample closes at `len`.
//! 2. **Surface fill** – every gap is filled on its own as the solution of a zero discrete
//!    Laplacian over the gap, i.e. harmonic (linear) inpainting. An interior gap becomes the
//!    straight line between its two bounding samples (a single lost sample is the mean of its
//!    neighbours); an open gap at either end continues the slope through the nearest valid
//!    sample and the next valid one after it. No other valid sample influences a fill: curvature
//!    of the path around the gap is not reproduced, and a column with a single valid sample is
//!    filled with that constant position. Results are rounded to whole pixels.
//! 3. **Policy** – gaps longer than `max_gap` samples are reset to `Lost` and flagged
//!    `unfilled`; shorter gaps keep their interpolated values and are flagged `filled`.
//!
//! The composite head markers are synthesized afterwards on the filled positions, see
//! [`composite`](crate::trajectory::composite).
//!
//! ## See also
//! * [`max_fillable_gap`](crate::trajectory::max_fillable_gap) – half the sample rate.
//! * [`FilledTrajectory::is_unfilled`] – validity query used by every downstream stage.

use std::collections::BTreeMap;

use itertools::Itertools;
use nalgebra::Vector2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    constants::{Hertz, Pixel, SampleIndex},
    processing::ProcessingParams,
    track_errors::TrackError,
    trajectory::{composite, max_fillable_gap, MarkerId, Position, SampleRange, Trajectory},
};

/// Outcome of the fill policy for one gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GapKind {
    /// `len <= max_gap`: interpolated values are kept
    Fillable,
    /// `len > max_gap`: samples are reset to `Lost`
    Unfillable,
}

/// A maximal run of lost samples of one marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapRecord {
    pub marker: MarkerId,
    pub range: SampleRange,
    pub kind: GapKind,
}

impl GapRecord {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Per-sample validity flags of one marker.
///
/// Whenever `lost[i]` holds, exactly one of `filled[i]` / `unfilled[i]` holds;
/// otherwise both are false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingFlags {
    pub lost: Vec<bool>,
    pub filled: Vec<bool>,
    pub unfilled: Vec<bool>,
}

/// A trajectory after gap filling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledTrajectory {
    /// Filled positions of the tracked lights plus the `Average` and `Mashup` composites
    pub trajectory: Trajectory,
    /// Flags of the tracked lights
    pub flags: BTreeMap<MarkerId, TrackingFlags>,
    /// Gap inventory of the tracked lights
    pub gaps: BTreeMap<MarkerId, Vec<GapRecord>>,
    pub sample_rate: Hertz,
    /// Half the sample rate; gaps strictly longer are unfillable
    pub max_gap: f64,
}

impl FilledTrajectory {
    /// True when the marker has no usable position at `sample`.
    ///
    /// Tracked lights answer from their `unfilled` flag; composite markers carry no flags and
    /// answer from their position.
    pub fn is_unfilled(&self, marker: MarkerId, sample: SampleIndex) -> bool {
        match self.flags.get(&marker) {
            Some(flags) => flags.unfilled[sample],
            None => self
                .trajectory
                .markers()
                .get(&marker)
                .map_or(true, |column| column[sample].is_lost()),
        }
    }

    /// The filled position of `marker` at `sample`, `None` when it is unfilled.
    pub fn usable_position(&self, marker: MarkerId, sample: SampleIndex) -> Option<Vector2<Pixel>> {
        if self.is_unfilled(marker, sample) {
            return None;
        }
        self.trajectory
            .markers()
            .get(&marker)
            .and_then(|column| column[sample].valid().copied())
    }
}

/// Split a lost-flag sequence into maximal lost runs `[start, end)`.
pub fn detect_gaps(lost: &[bool]) -> Vec<SampleRange> {
    let mut gaps = Vec::new();
    let mut start = 0;
    let runs = lost.iter().chunk_by(|is_lost| **is_lost);
    for (is_lost, run) in &runs {
        let len = run.count();
        if is_lost {
            gaps.push(start..start + len);
        }
        start += len;
    }
    gaps
}

/// Fill one coordinate series in place of its unknown samples.
///
/// `known` must contain at least one `true`.
fn inpaint_series(values: &[f64], known: &[bool], gaps: &[SampleRange]) -> Vec<f64> {
    let n = values.len();
    let mut out = values.to_vec();

    let next_known = |from: usize| (from..n).find(|&i| known[i]);
    let prev_known = |to: usize| (0..to).rev().find(|&i| known[i]);

    for gap in gaps {
        match (gap.start.checked_sub(1), gap.end < n) {
            // interior: straight line between the bounding samples
            (Some(left), true) => {
                let right = gap.end;
                let span = (right - left) as f64;
                for i in gap.clone() {
                    let w = (i - left) as f64 / span;
                    out[i] = values[left] * (1.0 - w) + values[right] * w;
                }
            }
            // leading: continue the slope of the first two valid samples backwards
            (None, true) => {
                let anchor = gap.end;
                let slope = next_known(anchor + 1)
                    .map(|b| (values[b] - values[anchor]) / (b - anchor) as f64)
                    .unwrap_or(0.0);
                for i in gap.clone() {
                    out[i] = values[anchor] - (anchor - i) as f64 * slope;
                }
            }
            // trailing: continue the slope of the last two valid samples forwards
            (Some(anchor), false) => {
                let slope = prev_known(anchor)
                    .map(|a| (values[anchor] - values[a]) / (anchor - a) as f64)
                    .unwrap_or(0.0);
                for i in gap.clone() {
                    out[i] = values[anchor] + (i - anchor) as f64 * slope;
                }
            }
            // the whole series is lost; rejected by the caller
            (None, false) => {}
        }
    }
    out
}

/// Fill the gaps of a single marker column.
///
/// Return
/// ----------
/// * The filled column, its flags and its gap records, or [`TrackError::UnrecoverableGap`]
///   when the column holds no valid sample at all.
pub fn fill_marker(
    marker: MarkerId,
    column: &[Position],
    max_gap: f64,
    frame_size: Option<(Pixel, Pixel)>,
) -> Result<(Vec<Position>, TrackingFlags, Vec<GapRecord>), TrackError> {
    let n = column.len();
    let lost: Vec<bool> = column.iter().map(Position::is_lost).collect();
    if lost.iter().all(|l| *l) {
        return Err(TrackError::UnrecoverableGap { marker });
    }

    let gaps = detect_gaps(&lost);
    let known: Vec<bool> = lost.iter().map(|l| !l).collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = column
        .iter()
        .map(|p| p.valid().map_or((0.0, 0.0), |v| (v.x, v.y)))
        .unzip();

    let fill_x = inpaint_series(&xs, &known, &gaps);
    let fill_y = inpaint_series(&ys, &known, &gaps);

    let clamp = |v: f64, extent: Option<Pixel>| match extent {
        Some(e) => v.clamp(0.0, (e - 1.0).max(0.0)),
        None => v,
    };

    let mut filled_column = column.to_vec();
    let mut filled = vec![false; n];
    let mut unfilled = vec![false; n];
    let mut records = Vec::with_capacity(gaps.len());

    for gap in gaps {
        let kind = if gap.len() as f64 > max_gap {
            GapKind::Unfillable
        } else {
            GapKind::Fillable
        };
        for i in gap.clone() {
            match kind {
                GapKind::Fillable => {
                    filled_column[i] = Position::new(
                        clamp(fill_x[i].round(), frame_size.map(|f| f.0)),
                        clamp(fill_y[i].round(), frame_size.map(|f| f.1)),
                    );
                    filled[i] = true;
                }
                GapKind::Unfillable => {
                    filled_column[i] = Position::Lost;
                    unfilled[i] = true;
                }
            }
        }
        records.push(GapRecord {
            marker,
            range: gap,
            kind,
        });
    }

    Ok((
        filled_column,
        TrackingFlags {
            lost,
            filled,
            unfilled,
        },
        records,
    ))
}

/// Run gap detection, interpolation and the fill policy on every tracked light, then
/// synthesize the composite markers.
///
/// Arguments
/// -----------------
/// * `raw`: the raw trajectory (composite markers in it, if any, are ignored and rebuilt).
/// * `sample_rate`: samples per second; `max_gap` is derived from it.
/// * `params`: processing parameters (head markers, optional frame size).
///
/// Return
/// ----------
/// * A new [`FilledTrajectory`]; `raw` is left untouched.
///
/// Errors
/// ----------
/// * [`TrackError::UnrecoverableGap`] for a light with no valid sample.
/// * [`TrackError::MalformedInput`] when a configured head marker is not tracked.
pub fn fill_gaps(
    raw: &Trajectory,
    sample_rate: Hertz,
    params: &ProcessingParams,
) -> Result<FilledTrajectory, TrackError> {
    let max_gap = max_fillable_gap(sample_rate);
    info!(
        "Filling gaps over {} samples at {:.3} Hz (max fillable gap: {:.3} samples)",
        raw.len(),
        sample_rate,
        max_gap
    );

    let mut markers = BTreeMap::new();
    let mut flags = BTreeMap::new();
    let mut gaps = BTreeMap::new();

    for (&id, column) in raw.markers().iter().filter(|(id, _)| !id.is_composite()) {
        let (filled_column, marker_flags, records) =
            fill_marker(id, column, max_gap, params.frame_size)?;

        let unfillable: Vec<&GapRecord> = records
            .iter()
            .filter(|g| g.kind == GapKind::Unfillable)
            .collect();
        debug!(
            "Marker {id}: {} gaps, {} unfillable",
            records.len(),
            unfillable.len()
        );
        if !unfillable.is_empty() {
            warn!(
                "Marker {id}: {} samples left unfilled in {} gaps longer than {:.3} samples",
                unfillable.iter().map(|g| g.len()).sum::<usize>(),
                unfillable.len(),
                max_gap
            );
        }

        markers.insert(id, filled_column);
        flags.insert(id, marker_flags);
        gaps.insert(id, records);
    }

    let (head_a, head_b) = params.head_markers;
    let (average, mashup) = composite::synthesize(&markers, &flags, head_a, head_b)?;
    markers.insert(MarkerId::Average, average);
    markers.insert(MarkerId::Mashup, mashup);

    Ok(FilledTrajectory {
        trajectory: raw.with_markers(markers),
        flags,
        gaps,
        sample_rate,
        max_gap,
    })
}
