//! # Constants and type definitions for markertrack
//!
//! This module centralizes the **numeric defaults**, **angle constants**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Angle constants (π, 2π) used by the wrap policies
//! - Processing defaults (smoothing window, phase threshold factor)
//! - Core type aliases for units (pixels, seconds, radians, Hz)
//!
//! The defaults below are the values used by
//! [`ProcessingParams::default`](crate::processing::ProcessingParams).

// -------------------------------------------------------------------------------------------------
// Angle constants
// -------------------------------------------------------------------------------------------------

/// 2π, full turn
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Numerical epsilon used for floating-point comparisons on pixel coordinates
pub const EPS: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Processing defaults
// -------------------------------------------------------------------------------------------------

/// Default width of the smoothing window for velocity/acceleration, in seconds
pub const DEFAULT_WINDOW_SECONDS: Second = 0.1;

/// Default index of the first of the two consecutive samples used to estimate the sample rate
pub const DEFAULT_RATE_REFERENCE_SAMPLE: usize = 1;

/// Default multiple of the mean arm length used as the approach/retreat distance threshold
pub const DEFAULT_PHASE_DISTANCE_FACTOR: f64 = 1.5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Coordinate or distance in camera pixels
pub type Pixel = f64;
/// Time in seconds
pub type Second = f64;
/// Angle in radians
pub type Radian = f64;
/// Sampling frequency in samples per second
pub type Hertz = f64;
/// Index of a sample in a trajectory
pub type SampleIndex = usize;
