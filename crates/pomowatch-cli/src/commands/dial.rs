use clap::{Args, ValueEnum};
use pomowatch_core::dial::{self, DialFrame, DialGeometry};
use pomowatch_core::{DisplayMode, WatchState};

use crate::render;

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Idle,
    Running,
    Paused,
    Vibrating,
    WaitingNext,
}

impl From<StateArg> for WatchState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Idle => WatchState::Idle,
            StateArg::Running => WatchState::Running,
            StateArg::Paused => WatchState::Paused,
            StateArg::Vibrating => WatchState::Vibrating,
            StateArg::WaitingNext => WatchState::WaitingNext,
        }
    }
}

#[derive(Args)]
pub struct DialArgs {
    /// Phase length in seconds
    #[arg(long)]
    total: u64,
    /// Seconds left in the phase
    #[arg(long)]
    remaining: u64,
    #[arg(long, value_enum, default_value = "running")]
    state: StateArg,
    /// Low-power display
    #[arg(long)]
    ambient: bool,
    /// Canvas width and height in pixels
    #[arg(long, default_value_t = render::CANVAS)]
    size: f64,
    /// Draw on a character grid instead of printing JSON
    #[arg(long)]
    ascii: bool,
}

pub fn run(args: DialArgs, grid_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let frame = DialFrame {
        total_secs: args.total,
        remaining_secs: args.remaining.min(args.total),
        state: args.state.into(),
        mode: if args.ambient {
            DisplayMode::Ambient
        } else {
            DisplayMode::Interactive
        },
    };

    if args.ascii {
        let primitives = dial::render(&frame, &render::canvas_geometry());
        for row in render::dial_rows(&primitives, grid_size) {
            println!("{row}");
        }
        return Ok(());
    }

    let geometry = DialGeometry::fit(args.size, args.size, args.size / 20.0);
    let primitives = dial::render(&frame, &geometry);
    println!("{}", serde_json::to_string_pretty(&primitives)?);
    Ok(())
}
