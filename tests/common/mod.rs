#![allow(dead_code)]

use std::{collections::BTreeMap, ops::Range};

use nalgebra::Vector2;

use markertrack::{
    events::{InnerRun, ObjectEvent, RewardEvent},
    object_frame::ObjectPose,
    trajectory::{MarkerId, Position, Trajectory},
};

/// Sample times `i / rate` for `n` samples.
pub fn sample_times(n: usize, rate: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 / rate).collect()
}

/// A slowly curving path inside a 640x480 frame, integral pixel coordinates.
pub fn wandering_path(n: usize, phase: f64) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let t = i as f64 / 50.0 + phase;
            Position::new(
                (320.0 + 150.0 * t.cos()).round(),
                (240.0 + 100.0 * (0.7 * t).sin()).round(),
            )
        })
        .collect()
}

/// Replace the samples of `gap` with `Lost`.
pub fn with_gap(mut column: Vec<Position>, gap: Range<usize>) -> Vec<Position> {
    for i in gap {
        column[i] = Position::Lost;
    }
    column
}

/// Build a trajectory sampled at `rate` from light columns numbered from 1.
pub fn trajectory(rate: f64, lights: Vec<Vec<Position>>) -> Trajectory {
    let n = lights[0].len();
    let markers: BTreeMap<MarkerId, Vec<Position>> = lights
        .into_iter()
        .enumerate()
        .map(|(k, column)| (MarkerId::Light(k as u8 + 1), column))
        .collect();
    Trajectory::new((0..n as u64).collect(), sample_times(n, rate), markers).unwrap()
}

/// The 1000-sample, 30 Hz, two-marker trace with a gap on light 1.
pub fn two_marker_trace(gap: Range<usize>) -> Trajectory {
    let n = 1000;
    trajectory(
        30.0,
        vec![
            with_gap(wandering_path(n, 0.0), gap),
            wandering_path(n, 0.05),
        ],
    )
}

pub fn pose(arm_a: (f64, f64), vertex: (f64, f64), arm_c: (f64, f64)) -> ObjectPose {
    ObjectPose::new(
        Vector2::new(arm_a.0, arm_a.1),
        Vector2::new(vertex.0, vertex.1),
        Vector2::new(arm_c.0, arm_c.1),
    )
}

pub fn object_event(timestamp: f64, pose: ObjectPose) -> ObjectEvent {
    ObjectEvent {
        label: "object".into(),
        timestamp,
        pose,
    }
}

pub fn rewards(times: &[f64]) -> Vec<RewardEvent> {
    times.iter().map(|t| RewardEvent::at(*t)).collect()
}

pub fn runs(spans: &[(f64, f64)]) -> Vec<InnerRun> {
    spans.iter().map(|(s, e)| InnerRun::new(*s, *e)).collect()
}
