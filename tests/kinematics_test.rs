mod common;

use std::f64::consts::PI;

use proptest::prelude::*;

use markertrack::{
    conversion::{AngleWrap, Polar},
    kinematics::{estimate, Kinematics},
    processing::ProcessingParams,
    trajectory::{gap_filler::fill_gaps, FilledTrajectory, MarkerId, Position},
};

use common::trajectory;

fn filled(rate: f64, lights: Vec<Vec<Position>>) -> FilledTrajectory {
    let raw = trajectory(rate, lights);
    fill_gaps(&raw, rate, &ProcessingParams::default()).unwrap()
}

fn all_values(kin: &Kinematics) -> Vec<Polar> {
    kin.world
        .values()
        .chain(kin.object_relative.values())
        .flat_map(|m| {
            m.instantaneous
                .velocity
                .iter()
                .chain(&m.instantaneous.acceleration)
                .chain(&m.smoothed.velocity)
                .chain(&m.smoothed.acceleration)
                .flatten()
                .copied()
                .collect::<Vec<_>>()
        })
        .collect()
}

fn path() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec((0.0f64..640.0, 0.0f64..480.0), 20..120).prop_map(|points| {
        points
            .into_iter()
            .map(|(x, y)| Position::new(x.round(), y.round()))
            .collect()
    })
}

#[test]
fn test_window_from_sample_rate() {
    let n = 60;
    let column: Vec<Position> = (0..n).map(|i| Position::new(i as f64, 0.0)).collect();
    let f = filled(30.0, vec![column.clone(), column]);
    let kin = estimate(&f, &vec![0.0; n], 0.1, AngleWrap::TwoPi).unwrap();
    assert_eq!(kin.window_samples, 3);

    // 1 px per sample at 30 Hz: 30 px/s, both estimators agree on a straight line
    let v = &kin.world[&MarkerId::Light(1)];
    assert!((v.instantaneous.velocity[10].unwrap().magnitude - 30.0).abs() < 1e-9);
    assert!((v.smoothed.velocity[10].unwrap().magnitude - 30.0).abs() < 1e-9);
    assert!(v.smoothed.velocity[2].is_none());
    assert!(v.smoothed.velocity[3].is_some());
    assert!(v.instantaneous.acceleration[1].is_none());
    assert!(v.instantaneous.acceleration[2].unwrap().magnitude.abs() < 1e-9);
}

#[test]
fn test_legacy_wrap_reproduced() {
    let n = 10;
    // moving along -x: world direction π
    let column: Vec<Position> = (0..n).map(|i| Position::new(100.0 - i as f64, 0.0)).collect();
    let f = filled(10.0, vec![column.clone(), column]);
    let orientation = vec![PI / 2.0; n];

    let fixed = estimate(&f, &orientation, 0.2, AngleWrap::TwoPi).unwrap();
    let legacy = estimate(&f, &orientation, 0.2, AngleWrap::LegacyPi).unwrap();
    let d_fixed = fixed.object_relative[&MarkerId::Light(1)].instantaneous.velocity[5]
        .unwrap()
        .direction;
    let d_legacy = legacy.object_relative[&MarkerId::Light(1)].instantaneous.velocity[5]
        .unwrap()
        .direction;
    assert!((d_fixed + PI / 2.0).abs() < 1e-12);
    assert!((d_legacy - PI / 2.0).abs() < 1e-12);
}

proptest! {
    #[test]
    fn prop_directions_and_magnitudes_in_range(
        a in path(),
        angle in -PI..PI,
        legacy in any::<bool>(),
    ) {
        let n = a.len();
        let b: Vec<Position> = a.iter().map(|p| p.map(|v| v.map(|c| c + 1.0))).collect();
        let f = filled(30.0, vec![a, b]);
        let wrap = if legacy { AngleWrap::LegacyPi } else { AngleWrap::TwoPi };
        let kin = estimate(&f, &vec![angle; n], 0.1, wrap).unwrap();

        for value in all_values(&kin) {
            prop_assert!(value.magnitude >= 0.0);
            prop_assert!(value.direction > -PI && value.direction <= PI);
        }
    }

    #[test]
    fn prop_still_marker_has_zero_velocity(
        mut a in path(),
        start in 1usize..10,
        still in 2usize..10,
    ) {
        let n = a.len();
        let end = (start + still).min(n);
        let held = a[start];
        for p in &mut a[start..end] {
            *p = held;
        }
        let f = filled(30.0, vec![a.clone(), a]);
        let kin = estimate(&f, &vec![0.0; n], 0.1, AngleWrap::TwoPi).unwrap();
        let velocity = &kin.world[&MarkerId::Light(1)].instantaneous.velocity;
        for v in &velocity[start + 1..end] {
            prop_assert_eq!(v.unwrap().magnitude, 0.0);
        }
    }
}
