//! Headless ride driver: boards passengers, runs one lap and logs what happens.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rollercoaster::{Ride, RideCommand, RideConfig, RideState, SEAT_COUNT};

#[derive(Parser, Debug)]
#[command(name = "rollercoaster", about = "Run one roller-coaster lap without a window")]
struct Args {
    /// Ride configuration (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of passengers to board.
    #[arg(short, long, default_value_t = 3)]
    passengers: usize,

    /// Seat whose passenger gets sick halfway through the lap.
    #[arg(long)]
    sick_seat: Option<usize>,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,

    /// Simulated frame time in seconds.
    #[arg(long, default_value_t = 1.0 / 75.0)]
    frame_time: f32,

    /// Log filter, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => RideConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RideConfig::default(),
    };
    let mut ride = Ride::from_config(&config)?;

    if args.passengers > SEAT_COUNT {
        warn!(requested = args.passengers, "cart only has {SEAT_COUNT} seats");
    }
    for _ in 0..args.passengers {
        let _ = ride.apply(RideCommand::AddPassenger);
    }
    for seat in 0..SEAT_COUNT {
        let _ = ride.apply(RideCommand::Seat(seat));
    }
    if let Err(rejection) = ride.apply(RideCommand::StartRide) {
        bail!("ride did not start: {rejection}");
    }

    let mut ticks = 0u64;
    while ride.state().is_running() {
        if ticks >= args.max_ticks {
            bail!("ride still running after {ticks} ticks (t = {:.4})", ride.progress());
        }
        if let Some(seat) = args.sick_seat {
            if ride.state() == RideState::Active && ride.progress() >= 0.5 {
                let _ = ride.apply(RideCommand::Seat(seat));
            }
        }
        ride.tick(args.frame_time);
        ticks += 1;
    }
    let sick = ride.passengers().iter().filter(|p| p.is_sick()).count();
    info!(ticks, state = %ride.state(), sick, "lap finished");

    for seat in 0..SEAT_COUNT {
        let _ = ride.apply(RideCommand::Seat(seat));
    }

    println!(
        "lap finished in {ticks} ticks; state {}, {} passengers aboard, {sick} got sick",
        ride.state(),
        ride.passenger_count()
    );
    Ok(())
}
