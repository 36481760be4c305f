//! Head direction from the two head lights.
//!
//! `HD(t) = atan2(head_a.y - head_b.y, head_a.x - head_b.x)`, undefined whenever either light is
//! unfilled. The object-relative heading adds the object orientation of the same sample.

use serde::Serialize;

use crate::{
    constants::Radian,
    conversion::{wrap_angle, AngleWrap},
    track_errors::TrackError,
    trajectory::{FilledTrajectory, MarkerId},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadDirection {
    pub world: Vec<Option<Radian>>,
    pub object_relative: Vec<Option<Radian>>,
}

/// Head direction per sample; errors when a head marker is not tracked or `orientation` does not
/// cover every sample.
pub fn estimate(
    filled: &FilledTrajectory,
    head_markers: (MarkerId, MarkerId),
    orientation: &[Radian],
    wrap: AngleWrap,
) -> Result<HeadDirection, TrackError> {
    let (head_a, head_b) = head_markers;
    for id in [head_a, head_b] {
        filled.trajectory.positions(id)?;
    }
    if orientation.len() != filled.trajectory.len() {
        return Err(TrackError::MalformedInput(format!(
            "{} orientations for {} samples",
            orientation.len(),
            filled.trajectory.len()
        )));
    }

    let world: Vec<Option<Radian>> = (0..filled.trajectory.len())
        .map(|i| {
            let a = filled.usable_position(head_a, i)?;
            let b = filled.usable_position(head_b, i)?;
            let d = a - b;
            Some(wrap_angle(d.y.atan2(d.x)))
        })
        .collect();

    let object_relative = world
        .iter()
        .zip(orientation)
        .map(|(hd, angle)| hd.map(|h| wrap.apply(h + angle)))
        .collect();

    Ok(HeadDirection {
        world,
        object_relative,
    })
}
