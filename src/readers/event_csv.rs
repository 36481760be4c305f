use std::io::Read;

use camino::Utf8Path;
use nalgebra::Vector2;
use serde::Deserialize;
use tracing::info;

use crate::{
    constants::Second,
    events::{InnerRun, ObjectEvent, RewardEvent},
    object_frame::ObjectPose,
    track_errors::TrackError,
};

#[derive(Debug, Deserialize, PartialEq)]
struct ObjectEventRow {
    label: String,
    timestamp: f64,
    ax: f64,
    ay: f64,
    vx: f64,
    vy: f64,
    cx: f64,
    cy: f64,
}

impl From<ObjectEventRow> for ObjectEvent {
    fn from(row: ObjectEventRow) -> Self {
        ObjectEvent {
            label: row.label,
            timestamp: row.timestamp,
            pose: ObjectPose::new(
                Vector2::new(row.ax, row.ay),
                Vector2::new(row.vx, row.vy),
                Vector2::new(row.cx, row.cy),
            ),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct RewardRow {
    timestamp: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct InnerRunRow {
    start: f64,
    end: f64,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn check_finite(source: &str, line: u64, values: &[Second]) -> Result<(), TrackError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TrackError::ParseError {
            path: source.to_string(),
            line,
            reason: "timestamps and coordinates must be finite".into(),
        })
    }
}

/// Deserialize every row of a headed table, tracking the line of each row for error messages.
fn read_rows<R, T>(reader: R) -> Result<Vec<(u64, T)>, TrackError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row: T = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse an object event table (`label, timestamp, ax, ay, vx, vy, cx, cy`).
pub fn object_events_from_reader<R: Read>(
    reader: R,
    source: &str,
) -> Result<Vec<ObjectEvent>, TrackError> {
    read_rows::<R, ObjectEventRow>(reader)?
        .into_iter()
        .map(|(line, row)| {
            check_finite(
                source,
                line,
                &[row.timestamp, row.ax, row.ay, row.vx, row.vy, row.cx, row.cy],
            )?;
            Ok(row.into())
        })
        .collect()
}

/// Parse a reward table (`timestamp`). Other columns, such as reward marker coordinates,
/// are ignored.
pub fn rewards_from_reader<R: Read>(
    reader: R,
    source: &str,
) -> Result<Vec<RewardEvent>, TrackError> {
    read_rows::<R, RewardRow>(reader)?
        .into_iter()
        .map(|(line, row)| {
            check_finite(source, line, &[row.timestamp])?;
            Ok(RewardEvent::at(row.timestamp))
        })
        .collect()
}

/// Parse an inner-run table (`start, end`).
///
/// Errors
/// ----------
/// * [`TrackError::ParseError`] when a run ends before it starts.
pub fn inner_runs_from_reader<R: Read>(
    reader: R,
    source: &str,
) -> Result<Vec<InnerRun>, TrackError> {
    read_rows::<R, InnerRunRow>(reader)?
        .into_iter()
        .map(|(line, row)| {
            check_finite(source, line, &[row.start, row.end])?;
            if row.end < row.start {
                return Err(TrackError::ParseError {
                    path: source.to_string(),
                    line,
                    reason: format!("run ends at {} before it starts at {}", row.end, row.start),
                });
            }
            Ok(InnerRun::new(row.start, row.end))
        })
        .collect()
}

/// Read the object event table at `path`.
pub fn read_object_events(path: &Utf8Path) -> Result<Vec<ObjectEvent>, TrackError> {
    let events = object_events_from_reader(std::fs::File::open(path)?, path.as_str())?;
    info!("Read {} object events from {path}", events.len());
    Ok(events)
}

/// Read the reward table at `path`.
pub fn read_rewards(path: &Utf8Path) -> Result<Vec<RewardEvent>, TrackError> {
    let rewards = rewards_from_reader(std::fs::File::open(path)?, path.as_str())?;
    info!("Read {} rewards from {path}", rewards.len());
    Ok(rewards)
}

/// Read the inner-run table at `path`.
pub fn read_inner_runs(path: &Utf8Path) -> Result<Vec<InnerRun>, TrackError> {
    let runs = inner_runs_from_reader(std::fs::File::open(path)?, path.as_str())?;
    info!("Read {} inner runs from {path}", runs.len());
    Ok(runs)
}
