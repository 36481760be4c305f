//! # Object-centred rotating frame
//!
//! The object is a three-marker rig (`arm_a`, `vertex`, `arm_c`). Its orientation at sample `t`
//! is
//!
//! ```text
//! orientation(t) = -atan2(arm_a.y - vertex.y, arm_a.x - vertex.x)
//! ```
//!
//! and the object frame is obtained, per sample, by translating every world position by
//! `-vertex(t)` and rotating it by `orientation(t)`. In that frame the vertex sits at the origin
//! and `arm_a` lies on the positive x axis.
//!
//! Object poses come from sparse object events on a coarser scale; they are rescaled into pixel
//! units and held forward onto every sample (see [`poses_per_sample`]). The orientation series
//! is computed once here and shared read-only by every object-relative estimator.
//!
//! Samples whose marker is unfilled are passed through unchanged: rotating a `Lost` tag would
//! otherwise fabricate a valid-looking coordinate.

use nalgebra::Vector2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    constants::{Pixel, Radian, Second, EPS},
    conversion::{translate_rotate, wrap_angle},
    events::{aligner::nearest_preceding_index, ObjectEvent},
    track_errors::TrackError,
    trajectory::{FilledTrajectory, Position, Trajectory},
};

/// Positions of the three object markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectPose {
    pub arm_a: Vector2<Pixel>,
    pub vertex: Vector2<Pixel>,
    pub arm_c: Vector2<Pixel>,
}

impl ObjectPose {
    pub fn new(arm_a: Vector2<Pixel>, vertex: Vector2<Pixel>, arm_c: Vector2<Pixel>) -> Self {
        ObjectPose {
            arm_a,
            vertex,
            arm_c,
        }
    }

    /// Linear rescaling `p ↦ scale * p + offset` of the three markers.
    pub fn rescaled(&self, scale: f64, offset: &Vector2<Pixel>) -> Self {
        let f = |p: &Vector2<Pixel>| p * scale + offset;
        ObjectPose {
            arm_a: f(&self.arm_a),
            vertex: f(&self.vertex),
            arm_c: f(&self.arm_c),
        }
    }

    /// Orientation of the object, `None` when `arm_a` and `vertex` coincide.
    pub fn orientation(&self) -> Option<Radian> {
        let arm = self.arm_a - self.vertex;
        if arm.norm() <= EPS {
            return None;
        }
        Some(wrap_angle(-arm.y.atan2(arm.x)))
    }

    /// Lengths of the `arm_a ↔ vertex` and `vertex ↔ arm_c` segments.
    pub fn arm_lengths(&self) -> (Pixel, Pixel) {
        (
            (self.arm_a - self.vertex).norm(),
            (self.vertex - self.arm_c).norm(),
        )
    }

    /// The pose expressed in the object frame defined by `vertex` and `angle`.
    pub fn to_object_frame(&self, vertex: &Vector2<Pixel>, angle: Radian) -> Self {
        ObjectPose {
            arm_a: translate_rotate(&self.arm_a, vertex, angle),
            vertex: translate_rotate(&self.vertex, vertex, angle),
            arm_c: translate_rotate(&self.arm_c, vertex, angle),
        }
    }
}

/// Mean of the two arm lengths over all object observations.
pub fn mean_arm_length(poses: &[ObjectPose]) -> Option<Pixel> {
    if poses.is_empty() {
        return None;
    }
    let total: Pixel = poses
        .iter()
        .map(|p| {
            let (a, c) = p.arm_lengths();
            (a + c) / 2.0
        })
        .sum();
    Some(total / poses.len() as f64)
}

/// Hold object poses forward onto the sample grid.
///
/// Every event is rescaled into pixel units and placed on its nearest preceding sample (events
/// at or before the first sample apply from sample 0). Sample `i` takes the pose of the latest
/// event placed at or before `i`; samples before the first placed event take the first pose.
///
/// Errors
/// ----------
/// * [`TrackError::MalformedInput`] when `events` is empty or holds a non-finite timestamp.
pub fn poses_per_sample(
    sample_times: &[Second],
    events: &[ObjectEvent],
    scale: f64,
    offset: &Vector2<Pixel>,
) -> Result<Vec<ObjectPose>, TrackError> {
    if events.is_empty() {
        return Err(TrackError::MalformedInput(
            "no object event: the object pose is unknown".into(),
        ));
    }
    if let Some(k) = events.iter().position(|e| !e.timestamp.is_finite()) {
        return Err(TrackError::MalformedInput(format!(
            "object event #{k} has a non-finite timestamp"
        )));
    }

    let mut placed: Vec<(usize, ObjectPose)> = events
        .iter()
        .map(|e| {
            (
                nearest_preceding_index(sample_times, e.timestamp).unwrap_or(0),
                e.pose.rescaled(scale, offset),
            )
        })
        .collect();
    // stable: events placed on the same sample keep their input order
    placed.sort_by_key(|(index, _)| *index);

    if placed[0].0 > 0 {
        warn!(
            "First object event placed at sample {}; earlier samples use its pose",
            placed[0].0
        );
    }

    let mut poses = Vec::with_capacity(sample_times.len());
    let mut current = placed[0].1;
    let mut next = 0;
    for i in 0..sample_times.len() {
        while next < placed.len() && placed[next].0 <= i {
            current = placed[next].1;
            next += 1;
        }
        poses.push(current);
    }
    debug!(
        "Held {} object events over {} samples",
        events.len(),
        poses.len()
    );
    Ok(poses)
}

/// Orientation of the object at every sample.
///
/// Errors
/// ----------
/// * [`TrackError::DegenerateGeometry`] at the first sample whose `arm_a` and `vertex` coincide.
pub fn orientation_series(poses: &[ObjectPose]) -> Result<Vec<Radian>, TrackError> {
    poses
        .iter()
        .enumerate()
        .map(|(sample, pose)| {
            pose.orientation()
                .ok_or(TrackError::DegenerateGeometry { sample })
        })
        .collect()
}

/// The recording re-expressed in the object frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectFrame {
    /// `orientation(t)` per sample, shared by all object-relative estimators
    pub orientation: Vec<Radian>,
    /// Object poses in world pixel coordinates, one per sample
    pub world_poses: Vec<ObjectPose>,
    /// Object poses in the object frame, one per sample
    pub object_poses: Vec<ObjectPose>,
    /// Every marker of the filled trajectory in the object frame
    pub trajectory: Trajectory,
}

/// Translate and rotate the filled trajectory and the object poses into the object frame.
///
/// Arguments
/// -----------------
/// * `filled`: the gap-filled trajectory (composite markers included).
/// * `world_poses`: one object pose per sample, in pixel units.
///
/// Return
/// ----------
/// * A new [`ObjectFrame`]; unfilled samples stay `Lost`.
///
/// Errors
/// ----------
/// * [`TrackError::MalformedInput`] when the pose count differs from the sample count.
/// * [`TrackError::DegenerateGeometry`] when the orientation is undefined at some sample.
pub fn transform(
    filled: &FilledTrajectory,
    world_poses: Vec<ObjectPose>,
) -> Result<ObjectFrame, TrackError> {
    let n = filled.trajectory.len();
    if world_poses.len() != n {
        return Err(TrackError::MalformedInput(format!(
            "{} object poses for {n} samples",
            world_poses.len()
        )));
    }
    let orientation = orientation_series(&world_poses)?;

    let markers = filled
        .trajectory
        .markers()
        .iter()
        .map(|(&id, column)| {
            let rotated: Vec<Position> = column
                .iter()
                .enumerate()
                .map(|(i, pos)| {
                    if filled.is_unfilled(id, i) {
                        *pos
                    } else {
                        pos.map(|p| translate_rotate(&p, &world_poses[i].vertex, orientation[i]))
                    }
                })
                .collect();
            (id, rotated)
        })
        .collect();

    let object_poses = world_poses
        .iter()
        .zip(&orientation)
        .map(|(pose, angle)| pose.to_object_frame(&pose.vertex, *angle))
        .collect();

    info!("Object frame computed over {n} samples");

    Ok(ObjectFrame {
        orientation,
        world_poses,
        object_poses,
        trajectory: filled.trajectory.with_markers(markers),
    })
}
