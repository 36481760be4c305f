//! markertrack CLI
//!
//! Reconstruct the trajectory of one recording and print a summary of every stage.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use markertrack::{
    conversion::AngleWrap,
    processing::{
        recording::{process_recording, RecordingInput, RecordingResult},
        ProcessingParams,
    },
    readers::{read_inner_runs, read_object_events, read_rewards, read_trajectory},
    track_errors::TrackError,
    trajectory::gap_filler::GapKind,
};

/// Marker trajectory reconstruction for one recording
#[derive(Parser, Debug)]
#[command(name = "markertrack")]
#[command(about = "Fill, align and analyse the marker trajectory of one recording", long_about = None)]
struct Args {
    /// Headerless trajectory table: index,timestamp,x1,y1,...
    #[arg(short, long)]
    trajectory: Utf8PathBuf,

    /// Object event table: label,timestamp,ax,ay,vx,vy,cx,cy
    #[arg(short, long)]
    object_events: Utf8PathBuf,

    /// Reward table: timestamp
    #[arg(short, long)]
    rewards: Utf8PathBuf,

    /// Inner run table: start,end
    #[arg(long)]
    runs: Utf8PathBuf,

    /// Coordinate value marking a lost marker (NaN is always lost)
    #[arg(long, allow_hyphen_values = true)]
    lost_sentinel: Option<f64>,

    /// Width of the smoothing window, in seconds
    #[arg(short, long, default_value = "0.1")]
    window_seconds: f64,

    /// Reduce object-relative angles modulo π like the legacy pipeline
    #[arg(long)]
    legacy_wrap: bool,

    /// Verbose output (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<RecordingResult<()>, TrackError> {
    let params = ProcessingParams::builder()
        .window_seconds(args.window_seconds)
        .angle_wrap(if args.legacy_wrap {
            AngleWrap::LegacyPi
        } else {
            AngleWrap::TwoPi
        })
        .build()?;
    debug!("Processing parameters: {params:?}");

    let input = RecordingInput {
        trajectory: read_trajectory(&args.trajectory, args.lost_sentinel)?,
        object_events: read_object_events(&args.object_events)?,
        rewards: read_rewards(&args.rewards)?,
        inner_runs: read_inner_runs(&args.runs)?,
        spikes: (),
    };
    process_recording(input, &params)
}

fn summarize(result: &RecordingResult<()>) {
    let meta = &result.metadata;
    info!(
        "{} samples at {:.3} Hz, max fillable gap {:.1} samples, smoothing window {} samples",
        meta.sample_count, meta.sample_rate, meta.max_gap, meta.window_samples
    );

    let (fillable, unfillable): (Vec<_>, Vec<_>) = result
        .filled
        .gaps
        .values()
        .flatten()
        .partition(|g| g.kind == GapKind::Fillable);
    info!(
        "Gaps: {} filled ({} samples), {} left unfilled ({} samples)",
        fillable.len(),
        fillable.iter().map(|g| g.len()).sum::<usize>(),
        unfillable.len(),
        unfillable.iter().map(|g| g.len()).sum::<usize>()
    );

    info!(
        "Events: {} rewards, {} inner runs, {} rewarded runs, {} outer runs",
        result.events.reward_indices.len(),
        result.events.inner_runs.len(),
        result.events.rewarded_runs.len(),
        result.events.outer_runs.len()
    );
    info!("Object arm length: {:.2} px", meta.arm_length);
    for phase in &result.run_phases {
        info!(
            "Run {}: reward at sample {}, approach from {}, retreat at {}",
            phase.run_id,
            phase.reward_index,
            phase.pre_reward_boundary,
            phase.post_reward_boundary
        );
    }
}

/// Log filter from `RUST_LOG`-style directives, falling back to `info` (`debug` when verbose)
/// when they are absent, blank or invalid.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, directives.as_deref()))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(result) => {
            summarize(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
