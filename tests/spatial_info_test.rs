use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::DMatrix;

use markertrack::spatial_info::{skaggs_information, OccupancyThreshold};

#[test]
fn test_rate_equal_to_mean_carries_no_information() {
    let mean_rate = 3.2;
    // excluded bins may hold anything
    let rate = DMatrix::from_fn(8, 8, |i, j| if (i + j) % 5 == 0 { 40.0 } else { mean_rate });
    let occupancy = DMatrix::from_fn(8, 8, |i, j| if (i + j) % 5 == 0 { 0.5 } else { 10.0 + i as f64 });

    let info =
        skaggs_information(&rate, &occupancy, mean_rate, OccupancyThreshold::AtLeast(1.0)).unwrap();
    assert_abs_diff_eq!(info.info_per_second, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(info.info_per_spike, 0.0, epsilon = 1e-12);

    let total: f64 = info.occupancy_probability.iter().filter(|p| !p.is_nan()).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    assert!(info.occupancy_probability[(0, 0)].is_nan());
}

#[test]
fn test_place_field_scores_positive() {
    // a single hot bin out of four equally visited bins
    let rate = DMatrix::from_row_slice(2, 2, &[8.0, 0.0, 0.0, 0.0]);
    let occupancy = DMatrix::from_element(2, 2, 25.0);
    let info =
        skaggs_information(&rate, &occupancy, 2.0, OccupancyThreshold::AtLeast(0.0)).unwrap();
    // 0.25 · 8 · log2(4) = 4 bits/s, 0.25 · 4 · 2 = 2 bits/spike
    assert_relative_eq!(info.info_per_second, 4.0);
    assert_relative_eq!(info.info_per_spike, 2.0);
}

#[test]
fn test_nothing_passes_threshold() {
    let rate = DMatrix::from_element(2, 2, 1.0);
    let occupancy = DMatrix::from_element(2, 2, 3.0);
    let err = skaggs_information(
        &rate,
        &occupancy,
        1.0,
        OccupancyThreshold::Band {
            low: 5.0,
            high: 10.0,
        },
    )
    .unwrap_err();
    assert!(err.is_malformed_input());
}
