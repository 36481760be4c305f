//! # Subject → object vector
//!
//! The displacement from the object vertex to the mashup head marker, in polar form.
//!
//! The same `(distance, angle)` shape carries two different angles depending on the frame:
//!
//! * [`WorldObjectVector::bearing`] – polar angle of the displacement in the world frame,
//! * [`ObjectFrameVector::relative_heading`] – the object-relative head direction.
//!
//! They are kept as distinct types so the two meanings cannot be mixed up.

use serde::Serialize;

use crate::{
    constants::{Pixel, Radian},
    conversion::cartesian_to_polar,
    object_frame::ObjectPose,
    track_errors::TrackError,
    trajectory::{FilledTrajectory, MarkerId},
};

/// Distance and bearing from the object vertex to the subject, world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldObjectVector {
    pub distance: Pixel,
    pub bearing: Radian,
}

/// Distance to the object and heading relative to the object's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectFrameVector {
    pub distance: Pixel,
    pub relative_heading: Radian,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectVectors {
    pub world: Vec<Option<WorldObjectVector>>,
    pub object_frame: Vec<Option<ObjectFrameVector>>,
}

impl ObjectVectors {
    /// World-frame distance per sample, `None` where the mashup marker is unfilled.
    pub fn distances(&self) -> impl Iterator<Item = Option<Pixel>> + '_ {
        self.world.iter().map(|v| v.map(|v| v.distance))
    }
}

/// Compute the subject → object vectors of every sample.
///
/// Arguments
/// -----------------
/// * `filled`: gap-filled trajectory holding the `Mashup` marker.
/// * `world_poses`: object pose per sample, pixel units.
/// * `relative_heading`: object-relative head direction per sample.
///
/// Errors
/// ----------
/// * [`TrackError::MalformedInput`] when the per-sample inputs have different lengths.
pub fn estimate(
    filled: &FilledTrajectory,
    world_poses: &[ObjectPose],
    relative_heading: &[Option<Radian>],
) -> Result<ObjectVectors, TrackError> {
    let n = filled.trajectory.len();
    if world_poses.len() != n || relative_heading.len() != n {
        return Err(TrackError::MalformedInput(format!(
            "object vector inputs disagree: {n} samples, {} poses, {} headings",
            world_poses.len(),
            relative_heading.len()
        )));
    }

    let world: Vec<Option<WorldObjectVector>> = (0..n)
        .map(|i| {
            let subject = filled.usable_position(MarkerId::Mashup, i)?;
            let polar = cartesian_to_polar(&(subject - world_poses[i].vertex));
            Some(WorldObjectVector {
                distance: polar.magnitude,
                bearing: polar.direction,
            })
        })
        .collect();

    let object_frame = world
        .iter()
        .zip(relative_heading)
        .map(|(w, heading)| {
            Some(ObjectFrameVector {
                distance: w.as_ref()?.distance,
                relative_heading: (*heading)?,
            })
        })
        .collect();

    Ok(ObjectVectors {
        world,
        object_frame,
    })
}
