mod common;

use approx::assert_abs_diff_eq;

use markertrack::{
    processing::ProcessingParams,
    track_errors::TrackError,
    trajectory::{
        gap_filler::{fill_gaps, GapKind},
        MarkerId, Position,
    },
};

use common::{trajectory, two_marker_trace, wandering_path, with_gap};

fn params() -> ProcessingParams {
    ProcessingParams::builder()
        .frame_size(640.0, 480.0)
        .build()
        .unwrap()
}

#[test]
fn test_short_gap_is_filled() {
    let gap = 400..410;
    let raw = two_marker_trace(gap.clone());
    let filled = fill_gaps(&raw, raw.estimate_sample_rate(1), &params()).unwrap();
    assert_abs_diff_eq!(filled.max_gap, 15.0, epsilon = 1e-9);

    let flags = &filled.flags[&MarkerId::Light(1)];
    let column = filled.trajectory.positions(MarkerId::Light(1)).unwrap();
    for i in gap.clone() {
        assert!(flags.lost[i]);
        assert!(flags.filled[i]);
        assert!(!flags.unfilled[i]);
        let p = column[i].valid().expect("filled sample must be valid");
        assert_eq!(p.x, p.x.round());
        assert_eq!(p.y, p.y.round());
        assert!((0.0..640.0).contains(&p.x) && (0.0..480.0).contains(&p.y));
    }

    assert_eq!(filled.gaps[&MarkerId::Light(1)].len(), 1);
    assert_eq!(filled.gaps[&MarkerId::Light(1)][0].range, gap);
    assert_eq!(filled.gaps[&MarkerId::Light(1)][0].kind, GapKind::Fillable);
    assert!(filled.gaps[&MarkerId::Light(2)].is_empty());

    // the raw trajectory is untouched
    assert!(raw.positions(MarkerId::Light(1)).unwrap()[405].is_lost());
}

#[test]
fn test_long_gap_is_reset() {
    let gap = 400..420;
    let raw = two_marker_trace(gap.clone());
    let filled = fill_gaps(&raw, 30.0, &params()).unwrap();

    let flags = &filled.flags[&MarkerId::Light(1)];
    let column = filled.trajectory.positions(MarkerId::Light(1)).unwrap();
    for i in gap.clone() {
        assert!(flags.unfilled[i]);
        assert!(!flags.filled[i]);
        assert_eq!(column[i], Position::Lost);
        assert!(filled.is_unfilled(MarkerId::Light(1), i));
    }
    assert!(!filled.is_unfilled(MarkerId::Light(1), gap.end));
    assert_eq!(filled.gaps[&MarkerId::Light(1)][0].kind, GapKind::Unfillable);
}

#[test]
fn test_gap_at_max_length_is_kept() {
    let raw = two_marker_trace(100..115);
    let filled = fill_gaps(&raw, 30.0, &params()).unwrap();
    let flags = &filled.flags[&MarkerId::Light(1)];
    assert!(flags.filled[100..115].iter().all(|f| *f));

    let raw = two_marker_trace(100..116);
    let filled = fill_gaps(&raw, 30.0, &params()).unwrap();
    let flags = &filled.flags[&MarkerId::Light(1)];
    assert!(flags.unfilled[100..116].iter().all(|f| *f));
}

#[test]
fn test_half_sample_gap_limit_at_25_hz() {
    let n = 500;
    let raw = trajectory(
        25.0,
        vec![
            with_gap(with_gap(wandering_path(n, 0.0), 100..112), 300..313),
            wandering_path(n, 0.05),
        ],
    );
    let filled = fill_gaps(&raw, 25.0, &params()).unwrap();
    assert_eq!(filled.max_gap, 12.5);

    let gaps = &filled.gaps[&MarkerId::Light(1)];
    assert_eq!(gaps.len(), 2);
    assert_eq!((gaps[0].len(), gaps[0].kind), (12, GapKind::Fillable));
    assert_eq!((gaps[1].len(), gaps[1].kind), (13, GapKind::Unfillable));

    let flags = &filled.flags[&MarkerId::Light(1)];
    assert!(flags.filled[100..112].iter().all(|f| *f));
    assert!(flags.unfilled[300..313].iter().all(|u| *u));
    let column = filled.trajectory.positions(MarkerId::Light(1)).unwrap();
    assert!(column[300..313].iter().all(Position::is_lost));
}

#[test]
fn test_flags_are_consistent() {
    let raw = trajectory(
        30.0,
        vec![
            with_gap(with_gap(wandering_path(300, 0.0), 0..4), 50..90),
            with_gap(wandering_path(300, 1.0), 290..300),
        ],
    );
    let filled = fill_gaps(&raw, 30.0, &params()).unwrap();
    for flags in filled.flags.values() {
        for i in 0..raw.len() {
            if flags.lost[i] {
                assert!(flags.filled[i] ^ flags.unfilled[i]);
            } else {
                assert!(!flags.filled[i] && !flags.unfilled[i]);
            }
        }
    }
    // leading and trailing open gaps are extrapolated
    let l1 = filled.trajectory.positions(MarkerId::Light(1)).unwrap();
    let l2 = filled.trajectory.positions(MarkerId::Light(2)).unwrap();
    assert!(l1[0..4].iter().all(|p| !p.is_lost()));
    assert!(l2[290..300].iter().all(|p| !p.is_lost()));
}

#[test]
fn test_composites_follow_unfilled_flags() {
    let raw = trajectory(
        30.0,
        vec![
            with_gap(wandering_path(200, 0.0), 20..25),
            with_gap(wandering_path(200, 0.5), 100..150),
        ],
    );
    let filled = fill_gaps(&raw, 30.0, &params()).unwrap();
    let average = filled.trajectory.positions(MarkerId::Average).unwrap();
    let mashup = filled.trajectory.positions(MarkerId::Mashup).unwrap();
    let l1 = filled.trajectory.positions(MarkerId::Light(1)).unwrap();

    // filled light 1 counts as usable
    assert!(!average[22].is_lost());
    // light 2 unfilled: only the mashup survives, on light 1
    assert!(average[120].is_lost());
    assert_eq!(mashup[120], l1[120]);
}

#[test]
fn test_marker_never_seen() {
    let raw = trajectory(
        30.0,
        vec![wandering_path(50, 0.0), vec![Position::Lost; 50]],
    );
    assert_eq!(
        fill_gaps(&raw, 30.0, &params()).unwrap_err(),
        TrackError::UnrecoverableGap {
            marker: MarkerId::Light(2)
        }
    );
}
