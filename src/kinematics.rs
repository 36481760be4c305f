//! # Velocity and acceleration estimates
//!
//! For every marker of the filled trajectory two derivative estimates are produced:
//!
//! * **Instantaneous** – `v[i] = (p[i] - p[i-1]) · rate`, `a[i] = (v[i] - v[i-1]) · rate`.
//! * **Smoothed** – `v[i] = (p[i] - p[i-w]) / window_seconds` with
//!   `w = round(rate · window_seconds)`, `a[i] = (v[i] - v[i-1]) · rate`.
//!
//! Each vector is reported in polar form ([`Polar`]). A value whose computation involves an
//! unfilled sample is `None`, as are the first samples where the difference is not defined.
//!
//! Object-relative variants keep the magnitude and add the object orientation of the same sample
//! to the direction, reduced with the configured [`AngleWrap`].

use std::collections::BTreeMap;

use nalgebra::Vector2;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    constants::{Hertz, Radian, Second},
    conversion::{cartesian_to_polar, AngleWrap, Polar},
    track_errors::TrackError,
    trajectory::{FilledTrajectory, MarkerId},
};

/// Velocity and acceleration of one marker for one estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionSeries {
    pub velocity: Vec<Option<Polar>>,
    pub acceleration: Vec<Option<Polar>>,
}

impl MotionSeries {
    fn rotated(&self, orientation: &[Radian], wrap: AngleWrap) -> Self {
        let rotate = |series: &[Option<Polar>]| {
            series
                .iter()
                .zip(orientation)
                .map(|(value, angle)| value.map(|p| p.rotated(*angle, wrap)))
                .collect()
        };
        MotionSeries {
            velocity: rotate(&self.velocity),
            acceleration: rotate(&self.acceleration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerKinematics {
    pub instantaneous: MotionSeries,
    pub smoothed: MotionSeries,
}

/// Kinematics of every marker, in the world frame and relative to the object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kinematics {
    /// Number of samples spanned by the smoothing window
    pub window_samples: usize,
    pub world: BTreeMap<MarkerId, MarkerKinematics>,
    pub object_relative: BTreeMap<MarkerId, MarkerKinematics>,
}

/// `(series[i] - series[i - lag]) * scale`, `None` wherever an endpoint is missing.
fn lagged_difference(
    series: &[Option<Vector2<f64>>],
    lag: usize,
    scale: f64,
) -> Vec<Option<Vector2<f64>>> {
    (0..series.len())
        .map(|i| {
            let j = i.checked_sub(lag)?;
            Some((series[i]? - series[j]?) * scale)
        })
        .collect()
}

fn to_polar(series: &[Option<Vector2<f64>>]) -> Vec<Option<Polar>> {
    series.iter().map(|v| v.as_ref().map(cartesian_to_polar)).collect()
}

/// Smoothing window length in samples.
pub fn window_samples(sample_rate: Hertz, window_seconds: Second) -> Result<usize, TrackError> {
    let w = (sample_rate * window_seconds).round();
    if !(w >= 1.0) {
        return Err(TrackError::InvalidParameter(format!(
            "a {window_seconds} s smoothing window spans less than one sample at {sample_rate} Hz"
        )));
    }
    Ok(w as usize)
}

/// Instantaneous and smoothed kinematics of one position column.
fn marker_kinematics(
    positions: &[Option<Vector2<f64>>],
    sample_rate: Hertz,
    window: usize,
    window_seconds: Second,
) -> MarkerKinematics {
    let inst_v = lagged_difference(positions, 1, sample_rate);
    let inst_a = lagged_difference(&inst_v, 1, sample_rate);
    let smooth_v = lagged_difference(positions, window, 1.0 / window_seconds);
    let smooth_a = lagged_difference(&smooth_v, 1, sample_rate);

    MarkerKinematics {
        instantaneous: MotionSeries {
            velocity: to_polar(&inst_v),
            acceleration: to_polar(&inst_a),
        },
        smoothed: MotionSeries {
            velocity: to_polar(&smooth_v),
            acceleration: to_polar(&smooth_a),
        },
    }
}

/// Estimate the kinematics of every marker of a filled trajectory.
///
/// Arguments
/// -----------------
/// * `filled`: the gap-filled trajectory; unfilled samples yield `None`.
/// * `orientation`: object orientation per sample (see
///   [`ObjectFrame::orientation`](crate::object_frame::ObjectFrame::orientation)).
/// * `window_seconds`: smoothing window width.
/// * `wrap`: reduction applied to the object-relative directions.
///
/// Errors
/// ----------
/// * [`TrackError::InvalidParameter`] when the window spans less than one sample.
/// * [`TrackError::MalformedInput`] when `orientation` does not have one entry per sample.
pub fn estimate(
    filled: &FilledTrajectory,
    orientation: &[Radian],
    window_seconds: Second,
    wrap: AngleWrap,
) -> Result<Kinematics, TrackError> {
    let n = filled.trajectory.len();
    if orientation.len() != n {
        return Err(TrackError::MalformedInput(format!(
            "{} orientation values for {n} samples",
            orientation.len()
        )));
    }
    let window = window_samples(filled.sample_rate, window_seconds)?;

    let mut world = BTreeMap::new();
    let mut object_relative = BTreeMap::new();
    for id in filled.trajectory.marker_ids() {
        let positions: Vec<Option<Vector2<f64>>> =
            (0..n).map(|i| filled.usable_position(id, i)).collect();
        let kin = marker_kinematics(&positions, filled.sample_rate, window, window_seconds);
        debug!(
            "Marker {id}: {} instantaneous velocity values",
            kin.instantaneous.velocity.iter().flatten().count()
        );

        object_relative.insert(
            id,
            MarkerKinematics {
                instantaneous: kin.instantaneous.rotated(orientation, wrap),
                smoothed: kin.smoothed.rotated(orientation, wrap),
            },
        );
        world.insert(id, kin);
    }

    info!(
        "Kinematics estimated for {} markers (smoothing window: {window} samples)",
        world.len()
    );

    Ok(Kinematics {
        window_samples: window,
        world,
        object_relative,
    })
}
