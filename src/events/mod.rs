//! # Behavioural events
//!
//! Discrete events recorded next to the position stream:
//!
//! * [`ObjectEvent`] – pose of the tracked object (three markers) at a given time, in the
//!   coarser object-tracking scale,
//! * [`RewardEvent`] – the time of a reward delivery,
//! * [`InnerRun`] – start/end timestamps of a traversal through the interior zone.
//!
//! All of them are placed on the trajectory by the [`aligner`], which maps a timestamp onto the
//! nearest *preceding* sample index.
pub mod aligner;

use serde::Serialize;

use crate::{constants::Second, object_frame::ObjectPose};

/// Pose of the object reported by the object tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEvent {
    /// Free-form type label from the event table, passed through untouched
    pub label: String,
    pub timestamp: Second,
    /// Marker positions in object-tracker units; see
    /// [`ObjectPose::rescaled`](crate::object_frame::ObjectPose::rescaled)
    pub pose: ObjectPose,
}

/// A reward delivery. Only its time is used; the reward site is located through the
/// object pose in effect at that sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardEvent {
    pub timestamp: Second,
}

impl RewardEvent {
    pub fn at(timestamp: Second) -> Self {
        RewardEvent { timestamp }
    }
}

/// A zone-crossing run through the interior zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InnerRun {
    pub start: Second,
    pub end: Second,
}

impl InnerRun {
    pub fn new(start: Second, end: Second) -> Self {
        InnerRun { start, end }
    }

    /// True when `t` lies inside the closed span `[start, end]`.
    pub fn contains(&self, t: Second) -> bool {
        self.start <= t && t <= self.end
    }
}
