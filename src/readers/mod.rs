//! # CSV readers
//!
//! Thin adapters turning the tables produced by the acquisition system into the in-memory
//! records consumed by the pipeline. No processing happens here beyond parsing.
//!
//! | Table          | Header | Columns                                        |
//! |----------------|--------|------------------------------------------------|
//! | trajectory     | no     | `index, timestamp, x1, y1, …, xN, yN`          |
//! | object events  | yes    | `label, timestamp, ax, ay, vx, vy, cx, cy`     |
//! | rewards        | yes    | `timestamp`                                    |
//! | inner runs     | yes    | `start, end`                                   |
//!
//! In the trajectory table a coordinate pair is `Lost` when either value is `NaN`, empty, or
//! equal to the configured lost sentinel.
pub mod event_csv;
pub mod trajectory_csv;

pub use event_csv::{read_inner_runs, read_object_events, read_rewards};
pub use trajectory_csv::read_trajectory;
