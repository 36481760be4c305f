//! # Recording processing parameters
//!
//! This module defines the [`ProcessingParams`] configuration struct and its builder, which
//! control every tunable stage of [`process_recording`](crate::processing::recording::process_recording).
//!
//! ## Pipeline overview
//!
//! 1. **Sample rate**
//!    Estimated from two consecutive early samples (`rate_reference_sample`) unless given
//!    explicitly with `sample_rate`. The maximum fillable gap is half the sample rate.
//!
//! 2. **Gap filling**
//!    Lost positions are interpolated; gaps longer than the maximum fillable gap are reset.
//!    `frame_size` clamps extrapolated pixels to the camera frame. `head_markers` names the two
//!    lights used for the composite markers and the head direction.
//!
//! 3. **Object frame**
//!    Object events are rescaled into pixels with `object_scale` / `object_offset`.
//!
//! 4. **Kinematics, head direction, object vector**
//!    Smoothed derivatives use a `window_seconds` wide window; object-relative angles are
//!    reduced with `angle_wrap`.
//!
//! 5. **Events and run phases**
//!    Events are aligned with `align_strategy`; phase boundaries use
//!    `phase_distance_factor` × mean arm length.
//!
//! ## Example
//!
//! ```rust,no_run
//! use markertrack::processing::ProcessingParams;
//! use markertrack::conversion::AngleWrap;
//!
//! let params = ProcessingParams::builder()
//!     .window_seconds(0.2)
//!     .object_scale(2.0)
//!     .angle_wrap(AngleWrap::LegacyPi)
//!     .build()
//!     .unwrap();
//! ```
pub mod recording;

use nalgebra::Vector2;
use std::cmp::Ordering::{Equal, Greater};

use crate::{
    constants::{
        Hertz, Pixel, Second, DEFAULT_PHASE_DISTANCE_FACTOR, DEFAULT_RATE_REFERENCE_SAMPLE,
        DEFAULT_WINDOW_SECONDS,
    },
    conversion::AngleWrap,
    events::aligner::AlignStrategy,
    track_errors::TrackError,
    trajectory::MarkerId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingParams {
    // --- Sampling ---
    pub sample_rate: Option<Hertz>,
    pub rate_reference_sample: usize,

    // --- Gap filling ---
    pub head_markers: (MarkerId, MarkerId),
    pub frame_size: Option<(Pixel, Pixel)>,

    // --- Object frame ---
    pub object_scale: f64,
    pub object_offset: Vector2<Pixel>,

    // --- Kinematics / angles ---
    pub window_seconds: Second,
    pub angle_wrap: AngleWrap,

    // --- Events / phases ---
    pub align_strategy: AlignStrategy,
    pub phase_distance_factor: f64,
}

impl ProcessingParams {
    /// Create a new set of parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a [`ProcessingParamsBuilder`] from the defaults.
    pub fn builder() -> ProcessingParamsBuilder {
        ProcessingParamsBuilder::new()
    }
}

impl Default for ProcessingParams {
    fn default() -> Self {
        ProcessingParams {
            sample_rate: None,
            rate_reference_sample: DEFAULT_RATE_REFERENCE_SAMPLE,

            head_markers: (MarkerId::Light(1), MarkerId::Light(2)),
            frame_size: None,

            object_scale: 1.0,
            object_offset: Vector2::zeros(),

            window_seconds: DEFAULT_WINDOW_SECONDS,
            angle_wrap: AngleWrap::TwoPi,

            align_strategy: AlignStrategy::BinarySearch,
            phase_distance_factor: DEFAULT_PHASE_DISTANCE_FACTOR,
        }
    }
}

/// Builder for [`ProcessingParams`], validated by [`build`](ProcessingParamsBuilder::build).
#[derive(Debug, Clone)]
pub struct ProcessingParamsBuilder {
    params: ProcessingParams,
}

impl Default for ProcessingParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ProcessingParams::default(),
        }
    }

    // --- Sampling ---
    pub fn sample_rate(mut self, v: Hertz) -> Self {
        self.params.sample_rate = Some(v);
        self
    }
    pub fn rate_reference_sample(mut self, v: usize) -> Self {
        self.params.rate_reference_sample = v;
        self
    }

    // --- Gap filling ---
    pub fn head_markers(mut self, a: MarkerId, b: MarkerId) -> Self {
        self.params.head_markers = (a, b);
        self
    }
    pub fn frame_size(mut self, width: Pixel, height: Pixel) -> Self {
        self.params.frame_size = Some((width, height));
        self
    }

    // --- Object frame ---
    pub fn object_scale(mut self, v: f64) -> Self {
        self.params.object_scale = v;
        self
    }
    pub fn object_offset(mut self, x: Pixel, y: Pixel) -> Self {
        self.params.object_offset = Vector2::new(x, y);
        self
    }

    // --- Kinematics / angles ---
    pub fn window_seconds(mut self, v: Second) -> Self {
        self.params.window_seconds = v;
        self
    }
    pub fn angle_wrap(mut self, v: AngleWrap) -> Self {
        self.params.angle_wrap = v;
        self
    }

    // --- Events / phases ---
    pub fn align_strategy(mut self, v: AlignStrategy) -> Self {
        self.params.align_strategy = v;
        self
    }
    pub fn phase_distance_factor(mut self, v: f64) -> Self {
        self.params.phase_distance_factor = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder and produce a [`ProcessingParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `window_seconds > 0.0`
    /// * `sample_rate > 0.0` when set
    /// * `object_scale > 0.0`, `object_offset` finite
    /// * `phase_distance_factor >= 0.0`
    /// * `frame_size` strictly positive when set
    /// * the two head markers are distinct tracked lights
    ///
    /// Returns
    /// -----------------
    /// * `Ok(ProcessingParams)` if all values are valid.
    /// * `Err(TrackError::InvalidParameter)` naming the first failing rule.
    pub fn build(self) -> Result<ProcessingParams, TrackError> {
        let p = &self.params;

        if !Self::gt0(p.window_seconds) {
            return Err(TrackError::InvalidParameter(
                "window_seconds must be > 0".into(),
            ));
        }
        if let Some(rate) = p.sample_rate {
            if !Self::gt0(rate) || !rate.is_finite() {
                return Err(TrackError::InvalidParameter(
                    "sample_rate must be a finite value > 0".into(),
                ));
            }
        }
        if !Self::gt0(p.object_scale) || !p.object_scale.is_finite() {
            return Err(TrackError::InvalidParameter(
                "object_scale must be a finite value > 0".into(),
            ));
        }
        if !p.object_offset.iter().all(|v| v.is_finite()) {
            return Err(TrackError::InvalidParameter(
                "object_offset must be finite".into(),
            ));
        }
        if !Self::ge0(p.phase_distance_factor) {
            return Err(TrackError::InvalidParameter(
                "phase_distance_factor must be >= 0".into(),
            ));
        }
        if let Some((w, h)) = p.frame_size {
            if !Self::gt0(w) || !Self::gt0(h) {
                return Err(TrackError::InvalidParameter(
                    "frame_size must be strictly positive".into(),
                ));
            }
        }
        let (a, b) = p.head_markers;
        if a == b || a.is_composite() || b.is_composite() {
            return Err(TrackError::InvalidParameter(format!(
                "head markers must be two distinct lights, got {a} and {b}"
            )));
        }

        Ok(self.params)
    }
}
