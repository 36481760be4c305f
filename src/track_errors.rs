use thiserror::Error;

use crate::constants::{SampleIndex, Second};
use crate::trajectory::MarkerId;

/// Side of a reward sample on which a phase boundary is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSide {
    /// Approach: the latest far sample before the reward.
    Pre,
    /// Retreat: the earliest far sample after the reward.
    Post,
}

impl std::fmt::Display for PhaseSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseSide::Pre => write!(f, "pre-reward"),
            PhaseSide::Post => write!(f, "post-reward"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Malformed input: {kind} event #{event_index} at t={timestamp} lies outside the sampled time range")]
    EventOutOfRange {
        kind: &'static str,
        event_index: usize,
        timestamp: Second,
    },

    #[error("Unrecoverable gap: marker {marker} has no valid sample in the whole recording")]
    UnrecoverableGap { marker: MarkerId },

    #[error("Boundary not found: no {side} boundary for run {run_id} (reward sample {reward_index})")]
    BoundaryNotFound {
        run_id: usize,
        reward_index: SampleIndex,
        side: PhaseSide,
    },

    #[error("Degenerate geometry: object arm and vertex markers coincide at sample {sample}")]
    DegenerateGeometry { sample: SampleIndex },

    #[error("Invalid processing parameter: {0}")]
    InvalidParameter(String),

    #[error("Error while reading CSV data: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error in {path} at line {line}: {reason}")]
    ParseError {
        path: String,
        line: u64,
        reason: String,
    },
}

impl TrackError {
    /// True for every flavour of malformed input, including events that cannot be placed.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            TrackError::MalformedInput(_) | TrackError::EventOutOfRange { .. }
        )
    }
}

impl PartialEq for TrackError {
    fn eq(&self, other: &Self) -> bool {
        use TrackError::*;
        match (self, other) {
            (MalformedInput(a), MalformedInput(b)) => a == b,
            (
                EventOutOfRange {
                    kind: k1,
                    event_index: i1,
                    timestamp: t1,
                },
                EventOutOfRange {
                    kind: k2,
                    event_index: i2,
                    timestamp: t2,
                },
            ) => k1 == k2 && i1 == i2 && t1 == t2,
            (UnrecoverableGap { marker: a }, UnrecoverableGap { marker: b }) => a == b,
            (
                BoundaryNotFound {
                    run_id: r1,
                    reward_index: i1,
                    side: s1,
                },
                BoundaryNotFound {
                    run_id: r2,
                    reward_index: i2,
                    side: s2,
                },
            ) => r1 == r2 && i1 == i2 && s1 == s2,
            (DegenerateGeometry { sample: a }, DegenerateGeometry { sample: b }) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,

            // Wrapped errors are not comparable: equal if same variant
            (CsvError(_), CsvError(_)) => true,
            (IoError(_), IoError(_)) => true,

            (
                ParseError {
                    path: p1,
                    line: l1,
                    reason: r1,
                },
                ParseError {
                    path: p2,
                    line: l2,
                    reason: r2,
                },
            ) => p1 == p2 && l1 == l2 && r1 == r2,

            _ => false,
        }
    }
}
