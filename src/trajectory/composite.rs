//! Composite head markers built from the two filled head lights.
//!
//! * **Average** – midpoint of the two head lights, `Lost` as soon as either is unfilled.
//! * **Mashup** – midpoint when both are usable, otherwise whichever single light is usable,
//!   otherwise `Lost`.
//!
//! Validity is read from the `unfilled` flags, not the `lost` flags: a head light whose gap was
//! filled counts as usable.

use std::collections::BTreeMap;

use crate::{
    track_errors::TrackError,
    trajectory::{gap_filler::TrackingFlags, MarkerId, Position},
};

fn usable(column: &[Position], flags: &TrackingFlags, i: usize) -> Option<Position> {
    if flags.unfilled[i] {
        None
    } else {
        column[i].valid().map(|p| Position::Valid(*p))
    }
}

/// Build the `Average` and `Mashup` columns from the head markers `head_a` and `head_b`.
pub(crate) fn synthesize(
    markers: &BTreeMap<MarkerId, Vec<Position>>,
    flags: &BTreeMap<MarkerId, TrackingFlags>,
    head_a: MarkerId,
    head_b: MarkerId,
) -> Result<(Vec<Position>, Vec<Position>), TrackError> {
    let lookup = |id: MarkerId| {
        markers
            .get(&id)
            .zip(flags.get(&id))
            .ok_or_else(|| TrackError::MalformedInput(format!("head marker {id} is not tracked")))
    };
    let (col_a, flags_a) = lookup(head_a)?;
    let (col_b, flags_b) = lookup(head_b)?;

    let (average, mashup) = (0..col_a.len())
        .map(|i| {
            match (usable(col_a, flags_a, i), usable(col_b, flags_b, i)) {
                (Some(Position::Valid(a)), Some(Position::Valid(b))) => {
                    let mid = Position::Valid((a + b) / 2.0);
                    (mid, mid)
                }
                (Some(single), None) | (None, Some(single)) => (Position::Lost, single),
                _ => (Position::Lost, Position::Lost),
            }
        })
        .unzip();

    Ok((average, mashup))
}
