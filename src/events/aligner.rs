//! # Event → sample index alignment
//!
//! Maps event timestamps onto the **nearest preceding sample**: the largest index `i` such that
//! `sample_times[i] < event` (strict). An event that falls exactly on a sample is therefore
//! attributed to the sample *before* it.
//!
//! ## Strategies
//!
//! Two equivalent implementations are provided, selected with [`AlignStrategy`]:
//!
//! * [`AlignStrategy::BinarySearch`] – one `partition_point` per event, `O(M log N)`; events
//!   may come in any order.
//! * [`AlignStrategy::Merge`] – a single two-pointer sweep over the samples and the events
//!   sorted by time, `O(N + M log M)`; results are scattered back to input order.
//!
//! Both strategies validate the events up front, so they accept and reject exactly the same
//! inputs and report the same offending event.
//!
//! ## Range contract
//!
//! Every event must satisfy `sample_times[0] < event <= sample_times[N-1]`; otherwise the whole
//! alignment is rejected with [`TrackError::EventOutOfRange`]. For an accepted event with
//! returned index `i`: `sample_times[i] < event <= sample_times[i + 1]`.
//!
//! ## Behavioural alignment
//!
//! [`align_behaviour`] applies the aligner to rewards and inner runs, keeps only the
//! *rewarded* runs (span containing at least one reward) and derives the outer runs between
//! consecutive rewarded runs.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    constants::{SampleIndex, Second},
    events::{InnerRun, RewardEvent},
    track_errors::TrackError,
};

/// Algorithm used to place events on the sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AlignStrategy {
    #[default]
    BinarySearch,
    Merge,
}

/// Index of the nearest preceding sample, `None` when no sample precedes `event`.
///
/// `sample_times` must be strictly increasing.
pub fn nearest_preceding_index(sample_times: &[Second], event: Second) -> Option<SampleIndex> {
    sample_times.partition_point(|t| *t < event).checked_sub(1)
}

fn validate_events(
    sample_times: &[Second],
    events: &[Second],
    kind: &'static str,
) -> Result<(), TrackError> {
    let (Some(first), Some(last)) = (sample_times.first(), sample_times.last()) else {
        return Err(TrackError::MalformedInput(format!(
            "cannot align {kind} events on an empty trajectory"
        )));
    };
    match events
        .iter()
        .position(|e| !e.is_finite() || *e <= *first || *e > *last)
    {
        Some(event_index) => Err(TrackError::EventOutOfRange {
            kind,
            event_index,
            timestamp: events[event_index],
        }),
        None => Ok(()),
    }
}

fn align_binary_search(sample_times: &[Second], events: &[Second]) -> Vec<SampleIndex> {
    events
        .iter()
        .map(|&e| nearest_preceding_index(sample_times, e).unwrap_or(0))
        .collect()
}

fn align_merge(sample_times: &[Second], events: &[Second]) -> Vec<SampleIndex> {
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by(|&a, &b| events[a].total_cmp(&events[b]));

    let mut result = vec![0; events.len()];
    // number of samples strictly before the current event
    let mut before = 0;
    for k in order {
        let e = events[k];
        while before < sample_times.len() && sample_times[before] < e {
            before += 1;
        }
        result[k] = before.saturating_sub(1);
    }
    result
}

/// Align a list of event timestamps onto the sample grid.
///
/// Arguments
/// -----------------
/// * `sample_times`: strictly increasing sample timestamps.
/// * `events`: event timestamps, in any order.
/// * `kind`: label used in error reports (e.g. `"reward"`).
/// * `strategy`: search algorithm; both give identical results.
///
/// Return
/// ----------
/// * One sample index per event, in input order.
///
/// Errors
/// ----------
/// * [`TrackError::EventOutOfRange`] for the first event (in input order) at or before the first
///   sample, after the last sample, or non-finite.
pub fn align_events(
    sample_times: &[Second],
    events: &[Second],
    kind: &'static str,
    strategy: AlignStrategy,
) -> Result<Vec<SampleIndex>, TrackError> {
    validate_events(sample_times, events, kind)?;
    let indices = match strategy {
        AlignStrategy::BinarySearch => align_binary_search(sample_times, events),
        AlignStrategy::Merge => align_merge(sample_times, events),
    };
    debug!("Aligned {} {kind} events with {strategy:?}", indices.len());
    Ok(indices)
}

/// Sample index span of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSpan {
    pub start_index: SampleIndex,
    pub end_index: SampleIndex,
}

/// An inner run whose time span contains at least one reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardedRun {
    /// Position of the run in the input inner-run list
    pub run_id: usize,
    pub span: RunSpan,
    /// Position of the (earliest) reward of the run in the input reward list
    pub reward_event: usize,
    pub reward_index: SampleIndex,
}

/// The exterior interval between two consecutive rewarded runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OuterRun {
    /// `run_id` of the rewarded run preceding the interval
    pub after_run: usize,
    /// `run_id` of the rewarded run following the interval
    pub before_run: usize,
    pub span: RunSpan,
}

/// Event → sample mappings of one recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAlignment {
    /// One entry per reward event, input order
    pub reward_indices: Vec<SampleIndex>,
    /// One entry per inner run, input order
    pub inner_runs: Vec<RunSpan>,
    /// Rewarded runs only, in run order
    pub rewarded_runs: Vec<RewardedRun>,
    pub outer_runs: Vec<OuterRun>,
}

/// Align rewards and runs, filter the rewarded runs and derive the outer runs.
///
/// Arguments
/// -----------------
/// * `sample_times`: strictly increasing sample timestamps of the raw trajectory.
/// * `rewards`: reward events, any order.
/// * `runs`: inner runs in chronological order, each with `start <= end`.
/// * `strategy`: see [`AlignStrategy`].
///
/// Return
/// ----------
/// * The [`EventAlignment`]; outer run `k` spans from the end of rewarded run `k` to the start of
///   rewarded run `k + 1`.
///
/// Errors
/// ----------
/// * [`TrackError::EventOutOfRange`] when any reward, run start or run end cannot be placed.
/// * [`TrackError::MalformedInput`] when a run ends before it starts or runs overlap out of order.
pub fn align_behaviour(
    sample_times: &[Second],
    rewards: &[RewardEvent],
    runs: &[InnerRun],
    strategy: AlignStrategy,
) -> Result<EventAlignment, TrackError> {
    if let Some(run_id) = runs.iter().position(|r| !(r.start <= r.end)) {
        return Err(TrackError::MalformedInput(format!(
            "inner run #{run_id} ends before it starts ({} > {})",
            runs[run_id].start, runs[run_id].end
        )));
    }
    if let Some(k) = runs.windows(2).position(|w| w[1].start < w[0].end) {
        return Err(TrackError::MalformedInput(format!(
            "inner run #{} starts before run #{k} ends",
            k + 1
        )));
    }

    let reward_times: Vec<Second> = rewards.iter().map(|r| r.timestamp).collect();
    let starts: Vec<Second> = runs.iter().map(|r| r.start).collect();
    let ends: Vec<Second> = runs.iter().map(|r| r.end).collect();

    let reward_indices = align_events(sample_times, &reward_times, "reward", strategy)?;
    let start_indices = align_events(sample_times, &starts, "inner run start", strategy)?;
    let end_indices = align_events(sample_times, &ends, "inner run end", strategy)?;

    let inner_runs: Vec<RunSpan> = start_indices
        .into_iter()
        .zip(end_indices)
        .map(|(start_index, end_index)| RunSpan {
            start_index,
            end_index,
        })
        .collect();

    let rewarded_runs: Vec<RewardedRun> = runs
        .iter()
        .enumerate()
        .filter_map(|(run_id, run)| {
            reward_times
                .iter()
                .enumerate()
                .filter(|(_, t)| run.contains(**t))
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(reward_event, _)| RewardedRun {
                    run_id,
                    span: inner_runs[run_id],
                    reward_event,
                    reward_index: reward_indices[reward_event],
                })
        })
        .collect();

    let outer_runs: Vec<OuterRun> = rewarded_runs
        .windows(2)
        .map(|w| OuterRun {
            after_run: w[0].run_id,
            before_run: w[1].run_id,
            span: RunSpan {
                start_index: w[0].span.end_index,
                end_index: w[1].span.start_index,
            },
        })
        .collect();

    info!(
        "Aligned {} rewards and {} inner runs: {} rewarded, {} outer runs",
        reward_indices.len(),
        inner_runs.len(),
        rewarded_runs.len(),
        outer_runs.len()
    );

    Ok(EventAlignment {
        reward_indices,
        inner_runs,
        rewarded_runs,
        outer_runs,
    })
}

#[cfg(test)]
mod aligner_test {
    use super::*;

    fn grid() -> Vec<f64> {
        (0..=20).map(|i| 4.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_strict_preceding_rule() {
        let times = [4.9, 5.1];
        assert_eq!(nearest_preceding_index(&times, 5.0), Some(0));
        assert_eq!(nearest_preceding_index(&times, 5.1), Some(0));
        assert_eq!(nearest_preceding_index(&times, 4.9), None);
        assert_eq!(nearest_preceding_index(&times, 6.0), Some(1));
    }

    #[test]
    fn test_reward_between_samples() {
        let times = [4.7, 4.8, 4.9, 5.1, 5.2];
        for strategy in [AlignStrategy::BinarySearch, AlignStrategy::Merge] {
            assert_eq!(align_events(&times, &[5.0], "reward", strategy).unwrap(), vec![2]);
        }
    }

    #[test]
    fn test_strategies_agree_on_unsorted_events() {
        let times = grid();
        let events = [5.05, 4.05, 5.55, 4.35, 5.95, 4.35];
        let a = align_events(&times, &events, "reward", AlignStrategy::BinarySearch).unwrap();
        let b = align_events(&times, &events, "reward", AlignStrategy::Merge).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[1], 0);
        assert_eq!(a[4], 19);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let times = grid();
        for strategy in [AlignStrategy::BinarySearch, AlignStrategy::Merge] {
            assert_eq!(
                align_events(&times, &[4.5, 4.0], "reward", strategy).unwrap_err(),
                TrackError::EventOutOfRange {
                    kind: "reward",
                    event_index: 1,
                    timestamp: 4.0
                }
            );
            assert!(align_events(&times, &[6.01], "reward", strategy)
                .unwrap_err()
                .is_malformed_input());
        }
    }

    #[test]
    fn test_rewarded_and_outer_runs() {
        let times = grid();
        let runs = [
            InnerRun::new(4.15, 4.45),
            InnerRun::new(4.55, 4.75),
            InnerRun::new(5.05, 5.45),
        ];
        let rewards = [RewardEvent::at(5.25), RewardEvent::at(4.35)];

        let alignment =
            align_behaviour(&times, &rewards, &runs, AlignStrategy::BinarySearch).unwrap();

        assert_eq!(alignment.reward_indices, vec![12, 3]);
        assert_eq!(alignment.inner_runs.len(), 3);
        assert_eq!(alignment.rewarded_runs.len(), 2);
        assert_eq!(alignment.rewarded_runs[0].run_id, 0);
        assert_eq!(alignment.rewarded_runs[0].reward_event, 1);
        assert_eq!(alignment.rewarded_runs[0].reward_index, 3);
        assert_eq!(alignment.rewarded_runs[1].run_id, 2);
        assert_eq!(
            alignment.outer_runs,
            vec![OuterRun {
                after_run: 0,
                before_run: 2,
                span: RunSpan {
                    start_index: 4,
                    end_index: 10
                }
            }]
        );
    }

    #[test]
    fn test_inverted_run_rejected() {
        let times = grid();
        let err = align_behaviour(
            &times,
            &[],
            &[InnerRun::new(5.0, 4.5)],
            AlignStrategy::BinarySearch,
        )
        .unwrap_err();
        assert!(err.is_malformed_input());
    }
}
