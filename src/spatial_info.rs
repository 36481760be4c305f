//! # Skaggs spatial information
//!
//! Scores how much a cell's firing, conditioned on position, tells about the subject's location,
//! given a rate map `R` and an occupancy map `O` of the same shape and the overall mean rate `Ro`.
//!
//! Bins whose occupancy fails the [`OccupancyThreshold`] are masked out of both maps. Over the
//! remaining bins, with `p = O_bin / Σ O`:
//!
//! ```text
//! info / second = Σ p · R · log2(R / Ro)
//! info / spike  = Σ p · (R / Ro) · log2(R / Ro)
//! ```
//!
//! A bin contributes 0 when its rate is excluded (non-finite) or not positive, or when `Ro` is 0.
//! The function is pure and independent from the trajectory pipeline.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::track_errors::TrackError;

/// Occupancy filter applied bin by bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OccupancyThreshold {
    /// Keep bins with `occupancy >= low`
    AtLeast(f64),
    /// Keep bins with `low <= occupancy < high`
    Band { low: f64, high: f64 },
}

impl OccupancyThreshold {
    pub fn accepts(&self, occupancy: f64) -> bool {
        match *self {
            OccupancyThreshold::AtLeast(low) => occupancy >= low,
            OccupancyThreshold::Band { low, high } => low <= occupancy && occupancy < high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialInformation {
    /// bits per second
    pub info_per_second: f64,
    /// bits per spike
    pub info_per_spike: f64,
    /// Occupancy probability of every included bin, `NaN` for masked bins
    pub occupancy_probability: DMatrix<f64>,
}

/// Compute the Skaggs information of a rate map.
///
/// Arguments
/// -----------------
/// * `rate_map`: firing rate per bin; `NaN` marks an excluded bin.
/// * `occupancy`: occupancy count per bin, same shape as `rate_map`.
/// * `mean_rate`: overall mean firing rate `Ro`.
/// * `threshold`: occupancy filter.
///
/// Return
/// ----------
/// * Both information scores and the normalized occupancy-probability map (sums to 1 over the
///   included bins).
///
/// Errors
/// ----------
/// * [`TrackError::MalformedInput`] when the maps differ in shape, an occupancy is negative, or no
///   occupied bin passes the threshold.
pub fn skaggs_information(
    rate_map: &DMatrix<f64>,
    occupancy: &DMatrix<f64>,
    mean_rate: f64,
    threshold: OccupancyThreshold,
) -> Result<SpatialInformation, TrackError> {
    if rate_map.shape() != occupancy.shape() {
        return Err(TrackError::MalformedInput(format!(
            "rate map is {:?} but occupancy map is {:?}",
            rate_map.shape(),
            occupancy.shape()
        )));
    }
    if occupancy.iter().any(|o| *o < 0.0 || o.is_nan()) {
        return Err(TrackError::MalformedInput(
            "occupancy counts must be non-negative".into(),
        ));
    }

    let included = occupancy.map(|o| threshold.accepts(o));
    let total: f64 = occupancy
        .iter()
        .zip(included.iter())
        .filter(|(_, keep)| **keep)
        .map(|(o, _)| o)
        .sum();
    if !(total > 0.0) {
        return Err(TrackError::MalformedInput(format!(
            "no occupied bin passes the occupancy threshold {threshold:?}"
        )));
    }

    let occupancy_probability = occupancy.zip_map(&included, |o, keep| {
        if keep {
            o / total
        } else {
            f64::NAN
        }
    });

    let mut info_per_second = 0.0;
    let mut info_per_spike = 0.0;
    if mean_rate > 0.0 {
        for (p, r) in occupancy_probability.iter().zip(rate_map.iter()) {
            if p.is_nan() || !r.is_finite() || *r <= 0.0 {
                continue;
            }
            let ratio = r / mean_rate;
            info_per_second += p * r * ratio.log2();
            info_per_spike += p * ratio * ratio.log2();
        }
    }

    Ok(SpatialInformation {
        info_per_second,
        info_per_spike,
        occupancy_probability,
    })
}
