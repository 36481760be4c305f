//! # Trajectories of tracked markers
//!
//! A [`Trajectory`] is a time-ordered set of samples holding, for every marker, either a
//! valid pixel position or the explicit [`Position::Lost`] tag. Positions are stored
//! column-wise per marker in a `BTreeMap<MarkerId, Vec<Position>>` so that each stage can
//! address a marker by identity rather than by its column in the source table.
//!
//! ## Lifecycle
//!
//! * The raw trajectory built by a reader (or by [`Trajectory::from_samples`]) is never
//!   mutated.
//! * [`gap_filler::fill_gaps`] returns a *new* [`FilledTrajectory`] carrying the interpolated
//!   positions, the per-marker [`TrackingFlags`](gap_filler::TrackingFlags) and the two
//!   composite markers ([`MarkerId::Average`], [`MarkerId::Mashup`]).
//!
//! ## Invariants
//!
//! * timestamps are finite and strictly increasing,
//! * every marker column has exactly one entry per sample,
//! * a trajectory holds at least two samples (needed to estimate the sample rate).
pub mod composite;
pub mod gap_filler;

use std::collections::BTreeMap;

use nalgebra::Vector2;
use serde::Serialize;

use crate::{
    constants::{Hertz, Pixel, SampleIndex, Second},
    track_errors::TrackError,
};

/// Identifier of a marker column in a trajectory.
///
/// Tracked lights are numbered from 1 in the order they appear in the source table.
/// `Average` and `Mashup` are synthesized from the two head markers after gap filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MarkerId {
    Light(u8),
    Average,
    Mashup,
}

impl MarkerId {
    pub fn is_composite(&self) -> bool {
        matches!(self, MarkerId::Average | MarkerId::Mashup)
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerId::Light(n) => write!(f, "light{n}"),
            MarkerId::Average => write!(f, "average"),
            MarkerId::Mashup => write!(f, "mashup"),
        }
    }
}

/// Position of a marker at one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Position {
    /// Pixel coordinates `(x, y)`
    Valid(Vector2<Pixel>),
    /// The tracker could not resolve the marker
    Lost,
}

impl Position {
    pub fn new(x: Pixel, y: Pixel) -> Self {
        Position::Valid(Vector2::new(x, y))
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Position::Lost)
    }

    pub fn valid(&self) -> Option<&Vector2<Pixel>> {
        match self {
            Position::Valid(p) => Some(p),
            Position::Lost => None,
        }
    }

    /// Apply `f` to a valid position; `Lost` is passed through untouched.
    pub fn map(self, f: impl FnOnce(Vector2<Pixel>) -> Vector2<Pixel>) -> Self {
        match self {
            Position::Valid(p) => Position::Valid(f(p)),
            Position::Lost => Position::Lost,
        }
    }
}

/// One row of a raw trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub index: u64,
    pub timestamp: Second,
    pub positions: BTreeMap<MarkerId, Position>,
}

/// Time-ordered positions of a fixed set of markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    indices: Vec<u64>,
    timestamps: Vec<Second>,
    markers: BTreeMap<MarkerId, Vec<Position>>,
}

impl Trajectory {
    /// Build a trajectory from column data, validating the invariants listed in the module docs.
    ///
    /// Arguments
    /// -----------------
    /// * `indices`: source sample indices (carried through untouched).
    /// * `timestamps`: strictly increasing sample times in seconds.
    /// * `markers`: one position column per marker, each of length `timestamps.len()`.
    ///
    /// Return
    /// ----------
    /// * The trajectory, or [`TrackError::MalformedInput`] naming the first violation.
    pub fn new(
        indices: Vec<u64>,
        timestamps: Vec<Second>,
        markers: BTreeMap<MarkerId, Vec<Position>>,
    ) -> Result<Self, TrackError> {
        let n = timestamps.len();
        if n < 2 {
            return Err(TrackError::MalformedInput(format!(
                "a trajectory needs at least 2 samples, got {n}"
            )));
        }
        if indices.len() != n {
            return Err(TrackError::MalformedInput(format!(
                "{} sample indices for {n} timestamps",
                indices.len()
            )));
        }
        if let Some(i) = timestamps.iter().position(|t| !t.is_finite()) {
            return Err(TrackError::MalformedInput(format!(
                "non-finite timestamp at sample {i}"
            )));
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TrackError::MalformedInput(format!(
                "timestamps are not strictly increasing between samples {i} and {} ({} -> {})",
                i + 1,
                timestamps[i],
                timestamps[i + 1]
            )));
        }
        if markers.is_empty() {
            return Err(TrackError::MalformedInput(
                "a trajectory needs at least one marker".into(),
            ));
        }
        for (id, column) in &markers {
            if column.len() != n {
                return Err(TrackError::MalformedInput(format!(
                    "marker {id} has {} positions for {n} samples",
                    column.len()
                )));
            }
        }

        Ok(Trajectory {
            indices,
            timestamps,
            markers,
        })
    }

    /// Build a trajectory from row-oriented samples.
    ///
    /// Every sample must carry the same marker set as the first one.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, TrackError> {
        let Some(first) = samples.first() else {
            return Err(TrackError::MalformedInput("empty trajectory".into()));
        };
        let ids: Vec<MarkerId> = first.positions.keys().copied().collect();

        let mut indices = Vec::with_capacity(samples.len());
        let mut timestamps = Vec::with_capacity(samples.len());
        let mut markers: BTreeMap<MarkerId, Vec<Position>> = ids
            .iter()
            .map(|id| (*id, Vec::with_capacity(samples.len())))
            .collect();

        for (row, sample) in samples.into_iter().enumerate() {
            if sample.positions.len() != ids.len()
                || !ids.iter().all(|id| sample.positions.contains_key(id))
            {
                return Err(TrackError::MalformedInput(format!(
                    "sample {row} carries {} markers, expected {:?}",
                    sample.positions.len(),
                    ids
                )));
            }
            indices.push(sample.index);
            timestamps.push(sample.timestamp);
            for (id, pos) in sample.positions {
                if let Some(column) = markers.get_mut(&id) {
                    column.push(pos);
                }
            }
        }

        Trajectory::new(indices, timestamps, markers)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    pub fn timestamps(&self) -> &[Second] {
        &self.timestamps
    }

    pub fn marker_ids(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.markers.keys().copied()
    }

    pub fn markers(&self) -> &BTreeMap<MarkerId, Vec<Position>> {
        &self.markers
    }

    /// Positions of one marker, or `MalformedInput` if the marker is not tracked.
    pub fn positions(&self, id: MarkerId) -> Result<&[Position], TrackError> {
        self.markers
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| TrackError::MalformedInput(format!("marker {id} is not tracked")))
    }

    /// Estimate the sample rate from two consecutive early samples.
    ///
    /// Arguments
    /// -----------------
    /// * `first`: index of the first of the two samples; the rate is `1 / (t[first+1] - t[first])`.
    ///   When the trajectory is too short for `first`, the first two samples are used.
    pub fn estimate_sample_rate(&self, first: usize) -> Hertz {
        let first = if first + 1 < self.len() { first } else { 0 };
        1.0 / (self.timestamps[first + 1] - self.timestamps[first])
    }

    /// Rebuild with different marker columns, keeping indices and timestamps.
    pub(crate) fn with_markers(&self, markers: BTreeMap<MarkerId, Vec<Position>>) -> Self {
        Trajectory {
            indices: self.indices.clone(),
            timestamps: self.timestamps.clone(),
            markers,
        }
    }
}

/// Largest gap length (in samples) that is allowed to keep its interpolated values:
/// half the sample rate, unrounded.
///
/// A gap is fillable when `len as f64 <= max_fillable_gap(rate)`, so at 25 Hz a gap of 12
/// samples is kept and a gap of 13 is not.
pub fn max_fillable_gap(sample_rate: Hertz) -> f64 {
    (sample_rate / 2.0).max(0.0)
}

/// A trajectory after gap filling, with its validity flags and gap inventory.
pub use gap_filler::FilledTrajectory;

/// Convenience for tests and readers: a sample index range `[start, end)`.
pub type SampleRange = std::ops::Range<SampleIndex>;
