//! # Approach / retreat segmentation around rewarded runs
//!
//! For each rewarded run the reward sample splits the subject's trip into an approach and a
//! retreat. The boundaries are the closest samples, on either side of the reward, at which the
//! subject is *far* from the object:
//!
//! ```text
//! threshold = phase_distance_factor × mean arm length
//! pre  = max { i < reward : distance[i] > threshold }
//! post = min { i > reward : distance[i] > threshold }
//! ```
//!
//! The mean arm length averages the `arm_a ↔ vertex` and `vertex ↔ arm_c` segments over every
//! object observation. Samples without a distance (mashup marker unfilled) never qualify.
//! When no sample qualifies on a side, segmentation fails with
//! [`TrackError::BoundaryNotFound`]; indices are never clamped.

use serde::Serialize;
use tracing::info;

use crate::{
    constants::{Pixel, SampleIndex},
    events::aligner::RewardedRun,
    track_errors::{PhaseSide, TrackError},
};

/// Phase boundaries of one rewarded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunPhase {
    pub run_id: usize,
    pub reward_index: SampleIndex,
    pub pre_reward_boundary: SampleIndex,
    pub post_reward_boundary: SampleIndex,
}

/// Find the approach/retreat boundaries of every rewarded run.
///
/// Arguments
/// -----------------
/// * `runs`: rewarded runs with their reward sample index.
/// * `distances`: world-frame subject → object distance per sample.
/// * `arm_length`: mean object arm length, pixels.
/// * `factor`: multiple of `arm_length` beyond which the subject is far from the object.
///
/// Errors
/// ----------
/// * [`TrackError::BoundaryNotFound`] for the first run/side without a far sample.
/// * [`TrackError::MalformedInput`] when a reward index lies outside `distances`.
pub fn segment(
    runs: &[RewardedRun],
    distances: &[Option<Pixel>],
    arm_length: Pixel,
    factor: f64,
) -> Result<Vec<RunPhase>, TrackError> {
    let threshold = factor * arm_length;
    let is_far = |i: &usize| distances[*i].is_some_and(|d| d > threshold);

    let phases = runs
        .iter()
        .map(|run| {
            let reward = run.reward_index;
            if reward >= distances.len() {
                return Err(TrackError::MalformedInput(format!(
                    "reward sample {reward} of run {} is outside the {} samples",
                    run.run_id,
                    distances.len()
                )));
            }
            let not_found = |side| TrackError::BoundaryNotFound {
                run_id: run.run_id,
                reward_index: reward,
                side,
            };

            let pre = (0..reward)
                .rev()
                .find(is_far)
                .ok_or_else(|| not_found(PhaseSide::Pre))?;
            let post = (reward + 1..distances.len())
                .find(is_far)
                .ok_or_else(|| not_found(PhaseSide::Post))?;

            Ok(RunPhase {
                run_id: run.run_id,
                reward_index: reward,
                pre_reward_boundary: pre,
                post_reward_boundary: post,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Segmented {} rewarded runs (distance threshold: {threshold:.1} px)",
        phases.len()
    );
    Ok(phases)
}
