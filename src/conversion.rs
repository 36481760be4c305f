//! Planar angle and vector conversions shared by every kinematic stage.
//!
//! All angles handled by the crate live in the half-open interval `(-π, π]`.
//! [`wrap_angle`] brings an arbitrary sum of angles back into that interval,
//! and [`AngleWrap`] selects how the object-relative variants are reduced.

use nalgebra::{Rotation2, Vector2};
use serde::Serialize;
use std::f64::consts::PI;

use crate::constants::{Pixel, Radian, DPI};

/// Reduction applied after adding the object orientation to a world-frame angle.
///
/// * `TwoPi` – proper wrap into `(-π, π]`.
/// * `LegacyPi` – the historical reduction: the sum is taken modulo π (truncated
///   remainder, sign of the dividend) whenever it leaves `(-π, π]`. The result stays
///   inside the interval but loses half a turn for every out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AngleWrap {
    #[default]
    TwoPi,
    LegacyPi,
}

impl AngleWrap {
    /// Apply this wrap policy to an angle sum.
    pub fn apply(self, angle: Radian) -> Radian {
        match self {
            AngleWrap::TwoPi => wrap_angle(angle),
            AngleWrap::LegacyPi => {
                if angle > -PI && angle <= PI {
                    angle
                } else {
                    // truncated remainder keeps |r| < π
                    angle % PI
                }
            }
        }
    }
}

/// Wrap an angle into `(-π, π]`.
///
/// Arguments
/// -----------------
/// * `angle`: any finite angle in radians.
///
/// Return
/// ----------
/// * The equivalent angle in `(-π, π]`. `-π` maps to `π`.
pub fn wrap_angle(angle: Radian) -> Radian {
    let wrapped = (angle + PI).rem_euclid(DPI) - PI;
    if wrapped <= -PI {
        wrapped + DPI
    } else {
        wrapped
    }
}

/// Magnitude/direction pair of a planar vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Polar {
    /// Euclidean norm, always `>= 0`
    pub magnitude: f64,
    /// Polar angle in `(-π, π]`
    pub direction: Radian,
}

impl Polar {
    /// Same magnitude, direction shifted by `offset` and reduced by `wrap`.
    pub fn rotated(self, offset: Radian, wrap: AngleWrap) -> Self {
        Polar {
            magnitude: self.magnitude,
            direction: wrap.apply(self.direction + offset),
        }
    }
}

/// Convert a cartesian vector to its polar form.
///
/// The direction is `atan2(dy, dx)` brought into `(-π, π]`; a null vector has
/// direction `0`.
pub fn cartesian_to_polar(v: &Vector2<Pixel>) -> Polar {
    Polar {
        magnitude: v.norm(),
        direction: wrap_angle(v.y.atan2(v.x)),
    }
}

/// Translate `position` into the frame of `origin` and rotate it by `angle`.
///
/// This is the standard 2-D rotation `[[cos, -sin], [sin, cos]]` applied to
/// `position - origin`.
pub fn translate_rotate(
    position: &Vector2<Pixel>,
    origin: &Vector2<Pixel>,
    angle: Radian,
) -> Vector2<Pixel> {
    Rotation2::new(angle) * (position - origin)
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_angle() {
        assert_abs_diff_eq!(wrap_angle(0.0), 0.0);
        assert_abs_diff_eq!(wrap_angle(PI), PI);
        assert_abs_diff_eq!(wrap_angle(-PI), PI);
        assert_abs_diff_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(5.0 * DPI + 0.25), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_legacy_wrap_truncates() {
        // in range: untouched
        assert_eq!(AngleWrap::LegacyPi.apply(1.0), 1.0);
        // 3π/2 should be -π/2 but the modulo-π reduction gives π/2
        assert_abs_diff_eq!(
            AngleWrap::LegacyPi.apply(3.0 * PI / 2.0),
            PI / 2.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            AngleWrap::TwoPi.apply(3.0 * PI / 2.0),
            -PI / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cartesian_to_polar() {
        let p = cartesian_to_polar(&Vector2::new(3.0, 4.0));
        assert_abs_diff_eq!(p.magnitude, 5.0);
        assert_abs_diff_eq!(p.direction, 4.0_f64.atan2(3.0));

        let back = cartesian_to_polar(&Vector2::new(-1.0, -0.0));
        assert_abs_diff_eq!(back.direction, PI);

        let null = cartesian_to_polar(&Vector2::zeros());
        assert_eq!(null.magnitude, 0.0);
        assert_eq!(null.direction, 0.0);
    }

    #[test]
    fn test_translate_rotate() {
        let p = translate_rotate(&Vector2::new(11.0, 20.0), &Vector2::new(10.0, 20.0), PI / 2.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
    }
}
