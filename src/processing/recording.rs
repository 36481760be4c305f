//! # Whole-recording pipeline
//!
//! [`process_recording`] chains every stage over one recording:
//!
//! ```text
//! raw trajectory ──► gap filling ──► object frame ──► kinematics
//!        │                                  ├────────► head direction ──► object vector ──► run phases
//!        └──► event alignment (rewards, inner/outer runs) ─────────────────────────────────┘
//! ```
//!
//! Each stage takes the previous records by shared reference and returns a new record; nothing
//! is mutated after it has been produced. The first failure aborts the whole recording: no
//! partial [`RecordingResult`] is ever returned.

use serde::Serialize;
use tracing::{info, info_span};

use crate::{
    constants::{Hertz, Pixel},
    events::{
        aligner::{align_behaviour, EventAlignment},
        InnerRun, ObjectEvent, RewardEvent,
    },
    head_direction::{self, HeadDirection},
    kinematics::{self, Kinematics},
    object_frame::{self, mean_arm_length, ObjectFrame, ObjectPose},
    object_vector::{self, ObjectVectors},
    processing::ProcessingParams,
    run_phase::{self, RunPhase},
    track_errors::TrackError,
    trajectory::{gap_filler::fill_gaps, FilledTrajectory, Trajectory},
};

/// Everything the external readers hand to the pipeline for one recording.
#[derive(Debug, Clone)]
pub struct RecordingInput<S> {
    pub trajectory: Trajectory,
    pub object_events: Vec<ObjectEvent>,
    pub rewards: Vec<RewardEvent>,
    pub inner_runs: Vec<InnerRun>,
    /// Spike data, passed through untouched
    pub spikes: S,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingMetadata {
    pub sample_count: usize,
    pub sample_rate: Hertz,
    /// Longest gap, in samples, that keeps its interpolated values
    pub max_gap: f64,
    pub window_samples: usize,
    /// Mean object arm length, pixels
    pub arm_length: Pixel,
}

/// The aggregated result of one recording. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingResult<S> {
    pub metadata: RecordingMetadata,
    /// Filled positions (with composites), tracking flags and gap inventory
    pub filled: FilledTrajectory,
    pub events: EventAlignment,
    pub object_frame: ObjectFrame,
    pub kinematics: Kinematics,
    pub head_direction: HeadDirection,
    pub object_vectors: ObjectVectors,
    pub run_phases: Vec<RunPhase>,
    pub spikes: S,
}

/// Run the full pipeline over one recording.
///
/// Arguments
/// -----------------
/// * `input`: raw trajectory, events and spike payload.
/// * `params`: validated processing parameters.
///
/// Return
/// ----------
/// * The aggregated [`RecordingResult`].
///
/// Errors
/// ----------
/// Any [`TrackError`] raised by a stage; processing stops at the first one.
pub fn process_recording<S>(
    input: RecordingInput<S>,
    params: &ProcessingParams,
) -> Result<RecordingResult<S>, TrackError> {
    let RecordingInput {
        trajectory,
        object_events,
        rewards,
        inner_runs,
        spikes,
    } = input;
    let _span = info_span!("recording", samples = trajectory.len()).entered();

    let sample_rate = params
        .sample_rate
        .unwrap_or_else(|| trajectory.estimate_sample_rate(params.rate_reference_sample));

    let events = align_behaviour(
        trajectory.timestamps(),
        &rewards,
        &inner_runs,
        params.align_strategy,
    )?;

    let filled = fill_gaps(&trajectory, sample_rate, params)?;

    let world_poses = object_frame::poses_per_sample(
        trajectory.timestamps(),
        &object_events,
        params.object_scale,
        &params.object_offset,
    )?;
    let object_frame = object_frame::transform(&filled, world_poses)?;

    let kinematics = kinematics::estimate(
        &filled,
        &object_frame.orientation,
        params.window_seconds,
        params.angle_wrap,
    )?;
    let head_direction = head_direction::estimate(
        &filled,
        params.head_markers,
        &object_frame.orientation,
        params.angle_wrap,
    )?;
    let object_vectors = object_vector::estimate(
        &filled,
        &object_frame.world_poses,
        &head_direction.object_relative,
    )?;

    let observed_poses: Vec<ObjectPose> = object_events
        .iter()
        .map(|e| e.pose.rescaled(params.object_scale, &params.object_offset))
        .collect();
    let arm_length = mean_arm_length(&observed_poses).ok_or_else(|| {
        TrackError::MalformedInput("no object event to measure the arm length".into())
    })?;
    let distances: Vec<Option<Pixel>> = object_vectors.distances().collect();
    let run_phases = run_phase::segment(
        &events.rewarded_runs,
        &distances,
        arm_length,
        params.phase_distance_factor,
    )?;

    let metadata = RecordingMetadata {
        sample_count: trajectory.len(),
        sample_rate,
        max_gap: filled.max_gap,
        window_samples: kinematics.window_samples,
        arm_length,
    };
    info!(
        "Recording processed: {} samples at {:.3} Hz, {} rewarded runs",
        metadata.sample_count,
        metadata.sample_rate,
        run_phases.len()
    );

    Ok(RecordingResult {
        metadata,
        filled,
        events,
        object_frame,
        kinematics,
        head_direction,
        object_vectors,
        run_phases,
        spikes,
    })
}
