use std::{collections::BTreeMap, io::Read};

use camino::Utf8Path;
use tracing::info;

use crate::{
    track_errors::TrackError,
    trajectory::{MarkerId, Position, Trajectory},
};

fn parse_field(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return Some(f64::NAN);
    }
    field.parse().ok()
}

/// A sample index must be a non-negative whole number.
fn to_sample_index(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as u64)
}

fn to_position(x: f64, y: f64, lost_sentinel: Option<f64>) -> Position {
    let is_sentinel = |v: f64| lost_sentinel.is_some_and(|s| v == s);
    if x.is_nan() || y.is_nan() || is_sentinel(x) || is_sentinel(y) {
        Position::Lost
    } else {
        Position::new(x, y)
    }
}

/// Parse a headerless trajectory table from any reader.
///
/// Arguments
/// -----------------
/// * `reader`: CSV source, rows `index, timestamp, x1, y1, …`.
/// * `source`: name used in error messages.
/// * `lost_sentinel`: optional coordinate value standing for a lost marker.
///
/// Return
/// ----------
/// * The validated [`Trajectory`], markers numbered `Light(1)…Light(N)` by column pair.
///
/// Errors
/// ----------
/// * [`TrackError::ParseError`] for a non-numeric field, or an index column that is empty,
///   negative or fractional.
/// * [`TrackError::MalformedInput`] for rows with a different column count, an odd number of
///   coordinate columns, or any violated trajectory invariant.
pub fn trajectory_from_reader<R: Read>(
    reader: R,
    source: &str,
    lost_sentinel: Option<f64>,
) -> Result<Trajectory, TrackError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut indices = Vec::new();
    let mut timestamps = Vec::new();
    let mut columns: Vec<Vec<Position>> = Vec::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(row as u64 + 1, |p| p.line());
        let values = record
            .iter()
            .map(|field| {
                parse_field(field).ok_or_else(|| TrackError::ParseError {
                    path: source.to_string(),
                    line,
                    reason: format!("'{field}' is not a number"),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        if values.len() < 4 || values.len() % 2 != 0 {
            return Err(TrackError::MalformedInput(format!(
                "{source} line {line}: expected index, timestamp and x/y pairs, got {} columns",
                values.len()
            )));
        }
        let n_markers = (values.len() - 2) / 2;
        if columns.is_empty() {
            columns = vec![Vec::new(); n_markers];
        } else if columns.len() != n_markers {
            return Err(TrackError::MalformedInput(format!(
                "{source} line {line}: {n_markers} markers, previous rows have {}",
                columns.len()
            )));
        }

        let index = to_sample_index(values[0]).ok_or_else(|| TrackError::ParseError {
            path: source.to_string(),
            line,
            reason: format!("'{}' is not a sample index", record.get(0).unwrap_or_default()),
        })?;
        indices.push(index);
        timestamps.push(values[1]);
        for (column, pair) in columns.iter_mut().zip(values[2..].chunks_exact(2)) {
            column.push(to_position(pair[0], pair[1], lost_sentinel));
        }
    }

    if columns.len() > u8::MAX as usize {
        return Err(TrackError::MalformedInput(format!(
            "{source}: {} markers exceed the supported maximum",
            columns.len()
        )));
    }
    let markers: BTreeMap<MarkerId, Vec<Position>> = columns
        .into_iter()
        .enumerate()
        .map(|(k, column)| (MarkerId::Light(k as u8 + 1), column))
        .collect();

    Trajectory::new(indices, timestamps, markers)
}

/// Read a trajectory table from disk, see [`trajectory_from_reader`].
pub fn read_trajectory(
    path: &Utf8Path,
    lost_sentinel: Option<f64>,
) -> Result<Trajectory, TrackError> {
    let file = std::fs::File::open(path)?;
    let trajectory = trajectory_from_reader(file, path.as_str(), lost_sentinel)?;
    info!(
        "Read {} samples of {} markers from {path}",
        trajectory.len(),
        trajectory.markers().len()
    );
    Ok(trajectory)
}
